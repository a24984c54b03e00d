// Raw wire types for the Inception REST API.
//
// These mirror the controller's PascalCase JSON and keep every field they
// do not model in an `extra` map. `inception-core` converts them into
// domain types; nothing here is meant for display.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString};

use crate::de;

// ── Resource kinds ──────────────────────────────────────────────────

/// A resource family exposed under `control/{kind}`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResourceKind {
    Door,
    Area,
    Input,
    Output,
    User,
}

impl ResourceKind {
    pub const ALL: [Self; 5] = [Self::Door, Self::Area, Self::Input, Self::Output, Self::User];

    /// The top-level key wrapping the summary map, e.g. `"Doors"`.
    pub fn collection_key(self) -> &'static str {
        match self {
            Self::Door => "Doors",
            Self::Area => "Areas",
            Self::Input => "Inputs",
            Self::Output => "Outputs",
            Self::User => "Users",
        }
    }
}

// ── Summaries ───────────────────────────────────────────────────────

/// Identity block shared by every summary entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawEntityInfo {
    #[serde(rename = "ID", alias = "Id", deserialize_with = "de::flexible_string")]
    pub id: String,

    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(
        rename = "ReportingID",
        alias = "ReportingId",
        default,
        deserialize_with = "de::flexible_opt_string"
    )]
    pub reporting_id: Option<String>,

    /// Inputs only: numeric input type.
    #[serde(rename = "InputType", default)]
    pub input_type: Option<u8>,

    /// Inputs only.
    #[serde(rename = "IsCustomInput", default)]
    pub is_custom_input: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Area arming parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawArmInfo {
    #[serde(default)]
    pub entry_delay_secs: Option<u32>,
    #[serde(default)]
    pub exit_delay_secs: Option<u32>,
    #[serde(default)]
    pub defer_arm_delay_secs: Option<u32>,
    #[serde(default)]
    pub area_warn_time_secs: Option<u32>,
    #[serde(default)]
    pub multi_mode_arm_enabled: Option<bool>,
}

/// One entry of a `control/{kind}/summary` response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSummaryEntry {
    pub entity_info: RawEntityInfo,

    /// Public state bitmask.
    #[serde(default)]
    pub current_state: Option<u32>,

    #[serde(default, deserialize_with = "de::flexible_opt_u64")]
    pub last_state_change_time: Option<u64>,

    #[serde(default)]
    pub arm_info: Option<RawArmInfo>,

    /// Capabilities the authenticated identity holds on this entity.
    #[serde(default)]
    pub permissions: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Review events ───────────────────────────────────────────────────

/// A single record from the `LiveReviewEvents` monitor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawReviewEvent {
    #[serde(rename = "ID", deserialize_with = "de::flexible_string")]
    pub id: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Numeric message code (the controller calls it a category).
    #[serde(default, deserialize_with = "de::flexible_opt_u64")]
    pub message_category: Option<u64>,

    #[serde(default, deserialize_with = "de::flexible_opt_string")]
    pub who: Option<String>,
    #[serde(rename = "WhoID", default, deserialize_with = "de::flexible_opt_string")]
    pub who_id: Option<String>,

    #[serde(default, deserialize_with = "de::flexible_opt_string")]
    pub what: Option<String>,
    #[serde(rename = "WhatID", default, deserialize_with = "de::flexible_opt_string")]
    pub what_id: Option<String>,

    #[serde(default, deserialize_with = "de::flexible_opt_string")]
    pub r#where: Option<String>,
    #[serde(rename = "WhereID", default, deserialize_with = "de::flexible_opt_string")]
    pub where_id: Option<String>,

    #[serde(default)]
    pub when: Option<String>,

    #[serde(deserialize_with = "de::flexible_u64")]
    pub when_ticks: u64,

    #[serde(default, deserialize_with = "de::flexible_opt_string")]
    pub reference_time: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Position in the review log to read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewQuery {
    /// Tick count to read after; `None` lets the controller choose.
    pub reference_time: Option<u64>,
    /// Id of the last event already seen at `reference_time`.
    pub reference_id: Option<String>,
}

// ── Commands ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum DoorControl {
    Lock,
    Unlock,
    Open,
    TimedUnlock,
    Lockout,
    Reinstate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum AreaControl {
    Arm,
    ArmStay,
    ArmSleep,
    Disarm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum InputControl {
    Isolate,
    Deisolate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum OutputControl {
    On,
    Off,
}

/// Body of `POST control/{kind}/{id}/activity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "Type")]
pub enum ActivityRequest {
    ControlDoor {
        #[serde(rename = "DoorControlType")]
        control: DoorControl,
        #[serde(rename = "TimeSecs", skip_serializing_if = "Option::is_none")]
        time_secs: Option<u32>,
    },
    ControlArea {
        #[serde(rename = "AreaControlType")]
        control: AreaControl,
    },
    ControlInput {
        #[serde(rename = "InputControlType")]
        control: InputControl,
    },
    ControlOutput {
        #[serde(rename = "OutputControlType")]
        control: OutputControl,
    },
}

impl ActivityRequest {
    /// The resource family this request must be sent to.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::ControlDoor { .. } => ResourceKind::Door,
            Self::ControlArea { .. } => ResourceKind::Area,
            Self::ControlInput { .. } => ResourceKind::Input,
            Self::ControlOutput { .. } => ResourceKind::Output,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn door_summary_entry_keeps_unknown_fields() {
        let entry: RawSummaryEntry = serde_json::from_value(json!({
            "EntityInfo": {"ID": "d-1", "Name": "Front Door", "ReportingID": 3},
            "CurrentState": 0x101,
            "LastStateChangeTime": "638412000000",
            "Firmware": "2.1"
        }))
        .unwrap();

        assert_eq!(entry.entity_info.id, "d-1");
        assert_eq!(entry.entity_info.reporting_id.as_deref(), Some("3"));
        assert_eq!(entry.current_state, Some(0x101));
        assert_eq!(entry.last_state_change_time, Some(638_412_000_000));
        assert_eq!(entry.extra["Firmware"], "2.1");
    }

    #[test]
    fn review_event_accepts_string_ticks() {
        let event: RawReviewEvent = serde_json::from_value(json!({
            "ID": "e-1",
            "Description": "Door Unlocked",
            "MessageCategory": 2000,
            "Who": "Alice",
            "WhoID": "u-7",
            "Where": "Lobby",
            "When": "2024-05-01T10:00:00+10:00",
            "WhenTicks": "638500000000000000"
        }))
        .unwrap();

        assert_eq!(event.when_ticks, 638_500_000_000_000_000);
        assert_eq!(event.message_category, Some(2000));
        assert_eq!(event.r#where.as_deref(), Some("Lobby"));
        assert!(event.what.is_none());
    }

    #[test]
    fn review_event_without_ticks_is_rejected() {
        let result = serde_json::from_value::<RawReviewEvent>(json!({"ID": "e-2"}));
        assert!(result.is_err());
    }

    #[test]
    fn timed_unlock_serializes_time() {
        let body = ActivityRequest::ControlDoor {
            control: DoorControl::TimedUnlock,
            time_secs: Some(30),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"Type": "ControlDoor", "DoorControlType": "TimedUnlock", "TimeSecs": 30})
        );
    }

    #[test]
    fn area_and_output_payloads() {
        let arm = ActivityRequest::ControlArea {
            control: AreaControl::ArmStay,
        };
        assert_eq!(
            serde_json::to_value(&arm).unwrap(),
            json!({"Type": "ControlArea", "AreaControlType": "ArmStay"})
        );
        assert_eq!(arm.kind(), ResourceKind::Area);

        let off = ActivityRequest::ControlOutput {
            control: OutputControl::Off,
        };
        assert_eq!(
            serde_json::to_value(&off).unwrap(),
            json!({"Type": "ControlOutput", "OutputControlType": "Off"})
        );
    }

    #[test]
    fn kind_names_round_trip_through_strum() {
        assert_eq!(ResourceKind::Output.to_string(), "output");
        assert_eq!("Door".parse::<ResourceKind>().unwrap(), ResourceKind::Door);
        assert_eq!(ResourceKind::Input.collection_key(), "Inputs");
    }
}
