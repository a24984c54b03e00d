// ── Review events and the tailer cursor ──

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::messages;

/// Classification bucket for review events, derived from the message code.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EventCategory {
    System,
    Audit,
    Access,
    Security,
    Hardware,
}

impl EventCategory {
    pub const ALL: [Self; 5] = [
        Self::System,
        Self::Audit,
        Self::Access,
        Self::Security,
        Self::Hardware,
    ];

    /// Category of a controller message code.
    ///
    /// The controller numbers its messages in blocks: system below 1500,
    /// audit up to 1999, access up to 4999, security up to 9999, hardware
    /// from 10000.
    pub fn from_code(code: u64) -> Self {
        match code {
            0..1500 => Self::System,
            1500..2000 => Self::Audit,
            2000..5000 => Self::Access,
            5000..10_000 => Self::Security,
            _ => Self::Hardware,
        }
    }
}

// ── Cursor ───────────────────────────────────────────────────────────

/// Resumable position in the review log: a controller tick count.
///
/// Sent to the controller as `referenceTime`; rendered as a decimal string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cursor(pub u64);

impl Cursor {
    pub fn ticks(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cursor {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

// ── ReviewEvent ──────────────────────────────────────────────────────

/// A classified review (audit) event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEvent {
    /// Controller-assigned id; the de-duplication key.
    pub event_id: String,
    /// Ordering key, non-decreasing within one controller.
    pub when_ticks: u64,
    /// Wall-clock time as sent by the controller. Informational only.
    pub when: Option<String>,
    pub category: EventCategory,
    pub message_value: u64,
    /// Symbolic name from the message table, when the code is known.
    pub message_key: Option<String>,
    pub message_description: String,
    /// The controller's own free-text description.
    pub description: Option<String>,
    pub who: Option<String>,
    pub who_id: Option<String>,
    pub what: Option<String>,
    pub what_id: Option<String>,
    pub r#where: Option<String>,
    pub where_id: Option<String>,
    pub reference_time: Option<String>,
}

impl ReviewEvent {
    /// Total order used for delivery: ticks first, then id.
    pub fn order_key(&self) -> (u64, &str) {
        (self.when_ticks, self.event_id.as_str())
    }

    pub fn is_known_message(&self) -> bool {
        self.message_key.is_some()
    }

    /// `when` parsed as RFC 3339, if it is.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.when
            .as_deref()
            .and_then(|w| DateTime::parse_from_rfc3339(w).ok())
    }

    /// Set the message fields from a code.
    pub(crate) fn classify(&mut self, code: u64) {
        self.message_value = code;
        self.category = EventCategory::from_code(code);
        match messages::lookup(code) {
            Some(info) => {
                self.message_key = Some(info.key.to_owned());
                self.message_description = info.description.to_owned();
            }
            None => {
                self.message_key = None;
                self.message_description = messages::UNKNOWN_EVENT.to_owned();
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_code_blocks() {
        assert_eq!(EventCategory::from_code(0), EventCategory::System);
        assert_eq!(EventCategory::from_code(1499), EventCategory::System);
        assert_eq!(EventCategory::from_code(1500), EventCategory::Audit);
        assert_eq!(EventCategory::from_code(2009), EventCategory::Access);
        assert_eq!(EventCategory::from_code(3501), EventCategory::Access);
        assert_eq!(EventCategory::from_code(5401), EventCategory::Security);
        assert_eq!(EventCategory::from_code(10_012), EventCategory::Hardware);
    }

    #[test]
    fn category_names_parse_case_insensitively() {
        assert_eq!("HARDWARE".parse::<EventCategory>().unwrap(), EventCategory::Hardware);
        assert_eq!(EventCategory::Access.to_string(), "access");
    }

    #[test]
    fn cursor_round_trips_through_strings() {
        let cursor: Cursor = " 638500000000 ".parse().unwrap();
        assert_eq!(cursor, Cursor(638_500_000_000));
        assert_eq!(cursor.to_string(), "638500000000");
        assert!("soon".parse::<Cursor>().is_err());
    }

    #[test]
    fn timestamp_is_best_effort() {
        let mut event = ReviewEvent {
            event_id: "e".into(),
            when_ticks: 1,
            when: Some("2024-05-01T10:00:00+10:00".into()),
            category: EventCategory::System,
            message_value: 0,
            message_key: None,
            message_description: String::new(),
            description: None,
            who: None,
            who_id: None,
            what: None,
            what_id: None,
            r#where: None,
            where_id: None,
            reference_time: None,
        };
        assert!(event.timestamp().is_some());
        event.when = Some("01/05/2024 10:00".into());
        assert!(event.timestamp().is_none());
    }
}
