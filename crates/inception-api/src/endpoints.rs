// Controller-specific paths and credential header.
//
// Both are fixed for a given controller firmware but configurable at
// construction, so nothing in the fetch code hard-codes them.

use crate::models::ResourceKind;

/// Relative paths of the controller endpoints used by this crate.
///
/// Templates may contain `{kind}` (the lowercase resource kind) and, for
/// activity paths, `{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Prefix between the controller root and every path, e.g. `api/v1`.
    pub api_prefix: String,
    pub summary_template: String,
    pub activity_template: String,
    /// The review monitor (`LiveReviewEvents`) long-poll path.
    pub review_path: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_prefix: "api/v1".into(),
            summary_template: "control/{kind}/summary".into(),
            activity_template: "control/{kind}/{id}/activity".into(),
            review_path: "monitor-updates".into(),
        }
    }
}

impl Endpoints {
    pub fn summary_path(&self, kind: ResourceKind) -> String {
        self.summary_template.replace("{kind}", &kind.to_string())
    }

    pub fn activity_path(&self, kind: ResourceKind, id: &str) -> String {
        self.activity_template
            .replace("{kind}", &kind.to_string())
            .replace("{id}", id)
    }
}

/// How the API token is attached to each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeader {
    pub header: String,
    /// Prefix placed before the token; `None` sends the raw token.
    pub scheme: Option<String>,
}

impl Default for AuthHeader {
    fn default() -> Self {
        Self {
            header: "Authorization".into(),
            scheme: Some("APIToken".into()),
        }
    }
}

impl AuthHeader {
    pub(crate) fn value_for(&self, token: &str) -> String {
        match self.scheme.as_deref() {
            Some(scheme) if !scheme.is_empty() => format!("{scheme} {token}"),
            _ => token.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_follow_the_v1_layout() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.summary_path(ResourceKind::Door),
            "control/door/summary"
        );
        assert_eq!(
            endpoints.activity_path(ResourceKind::Output, "o-9"),
            "control/output/o-9/activity"
        );
    }

    #[test]
    fn empty_scheme_sends_raw_token() {
        let mut auth = AuthHeader::default();
        assert_eq!(auth.value_for("abc"), "APIToken abc");
        auth.scheme = Some(String::new());
        assert_eq!(auth.value_for("abc"), "abc");
        auth.scheme = None;
        assert_eq!(auth.value_for("abc"), "abc");
    }
}
