// ── Entity records ──
//
// One record per visible door, area, input, output or user. Kind-specific
// fields live in a tagged `EntityAttributes` variant and are validated when
// the raw summary is converted, never later.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::state::{InputType, PublicState};

pub use inception_api::ResourceKind as EntityKind;

/// `(kind, id)`: unique within a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityKey {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

// ── Capabilities ─────────────────────────────────────────────────────

/// Something the authenticated identity may do to an entity.
///
/// Taken verbatim from the controller's per-record `Permissions` list;
/// nothing here computes access.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    View,
    Control,
    Arm,
    Disarm,
    Isolate,
    Other(String),
}

impl FromStr for Capability {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "view" | "read" => Self::View,
            "control" => Self::Control,
            "arm" => Self::Arm,
            "disarm" => Self::Disarm,
            "isolate" => Self::Isolate,
            _ => Self::Other(s.trim().to_owned()),
        })
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::View => f.write_str("view"),
            Self::Control => f.write_str("control"),
            Self::Arm => f.write_str("arm"),
            Self::Disarm => f.write_str("disarm"),
            Self::Isolate => f.write_str("isolate"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

// ── Attributes ───────────────────────────────────────────────────────

/// Area arming timings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmInfo {
    pub entry_delay_secs: Option<u32>,
    pub exit_delay_secs: Option<u32>,
    pub defer_arm_delay_secs: Option<u32>,
    pub area_warn_time_secs: Option<u32>,
    pub multi_mode_arm_enabled: bool,
}

/// Kind-specific state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityAttributes {
    Door {
        state: PublicState,
        last_state_change: Option<u64>,
    },
    Area {
        state: PublicState,
        last_state_change: Option<u64>,
        arm_info: Option<ArmInfo>,
    },
    Input {
        state: PublicState,
        last_state_change: Option<u64>,
        input_type: InputType,
        is_custom_input: bool,
    },
    Output {
        state: PublicState,
        last_state_change: Option<u64>,
    },
    User,
}

impl EntityAttributes {
    pub fn state(&self) -> Option<PublicState> {
        match self {
            Self::Door { state, .. }
            | Self::Area { state, .. }
            | Self::Input { state, .. }
            | Self::Output { state, .. } => Some(*state),
            Self::User => None,
        }
    }

    /// Controller tick count of the last state transition.
    pub fn last_state_change(&self) -> Option<u64> {
        match self {
            Self::Door {
                last_state_change, ..
            }
            | Self::Area {
                last_state_change, ..
            }
            | Self::Input {
                last_state_change, ..
            }
            | Self::Output {
                last_state_change, ..
            } => *last_state_change,
            Self::User => None,
        }
    }
}

// ── EntityRecord ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    pub kind: EntityKind,
    pub name: String,
    pub reporting_id: Option<String>,
    pub attributes: EntityAttributes,
    pub permissions: BTreeSet<Capability>,
    /// Fields the controller sent that are not modelled above.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl EntityRecord {
    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.kind, self.id.clone())
    }

    pub fn state(&self) -> Option<PublicState> {
        self.attributes.state()
    }

    pub fn can(&self, capability: &Capability) -> bool {
        self.permissions.contains(capability)
    }

    /// Descriptions of the set state flags, empty for users.
    pub fn state_description(&self) -> Vec<&'static str> {
        self.state()
            .map(|s| s.descriptions())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_parsing_is_lenient() {
        assert_eq!("Control".parse::<Capability>(), Ok(Capability::Control));
        assert_eq!(" read ".parse::<Capability>(), Ok(Capability::View));
        assert_eq!(
            "ViewReview".parse::<Capability>(),
            Ok(Capability::Other("ViewReview".into()))
        );
    }

    #[test]
    fn keys_order_by_kind_then_id() {
        let mut keys = vec![
            EntityKey::new(EntityKind::Area, "b"),
            EntityKey::new(EntityKind::Door, "z"),
            EntityKey::new(EntityKind::Area, "a"),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["door/z", "area/a", "area/b"]);
    }
}
