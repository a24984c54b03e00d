// ── API-to-domain type conversions ──
//
// Bridges raw `inception_api` summary and review records into the domain
// model. Kind-specific fields are picked here, once, so downstream code
// never inspects raw JSON.

use std::collections::BTreeSet;

use inception_api::{RawArmInfo, RawReviewEvent, RawSummaryEntry};

use crate::model::{
    ArmInfo, Capability, EntityAttributes, EntityKind, EntityRecord, EventCategory, InputType,
    PublicState, ReviewEvent,
};

// ── Entities ───────────────────────────────────────────────────────

impl From<RawArmInfo> for ArmInfo {
    fn from(raw: RawArmInfo) -> Self {
        Self {
            entry_delay_secs: raw.entry_delay_secs,
            exit_delay_secs: raw.exit_delay_secs,
            defer_arm_delay_secs: raw.defer_arm_delay_secs,
            area_warn_time_secs: raw.area_warn_time_secs,
            multi_mode_arm_enabled: raw.multi_mode_arm_enabled.unwrap_or(false),
        }
    }
}

/// Presence in a summary implies `View`; anything else comes from the
/// record's own `Permissions` list.
fn permissions(raw: Option<Vec<String>>) -> BTreeSet<Capability> {
    let mut caps = BTreeSet::from([Capability::View]);
    for name in raw.into_iter().flatten() {
        if let Ok(cap) = name.parse() {
            caps.insert(cap);
        }
    }
    caps
}

/// Convert one summary entry of a known kind.
pub fn entity_from_raw(kind: EntityKind, raw: RawSummaryEntry) -> EntityRecord {
    let state = PublicState::new(kind, raw.current_state.unwrap_or(0));
    let last_state_change = raw.last_state_change_time;
    let info = raw.entity_info;

    let attributes = match kind {
        EntityKind::Door => EntityAttributes::Door {
            state,
            last_state_change,
        },
        EntityKind::Area => EntityAttributes::Area {
            state,
            last_state_change,
            arm_info: raw.arm_info.map(ArmInfo::from),
        },
        EntityKind::Input => EntityAttributes::Input {
            state,
            last_state_change,
            input_type: info.input_type.map(InputType::from).unwrap_or_default(),
            is_custom_input: info.is_custom_input.unwrap_or(false),
        },
        EntityKind::Output => EntityAttributes::Output {
            state,
            last_state_change,
        },
        EntityKind::User => EntityAttributes::User,
    };

    let mut extra = raw.extra;
    extra.extend(info.extra);

    EntityRecord {
        id: info.id,
        kind,
        name: info.name,
        reporting_id: info.reporting_id,
        attributes,
        permissions: permissions(raw.permissions),
        extra,
    }
}

// ── Review events ──────────────────────────────────────────────────

impl From<RawReviewEvent> for ReviewEvent {
    fn from(raw: RawReviewEvent) -> Self {
        let mut event = Self {
            event_id: raw.id,
            when_ticks: raw.when_ticks,
            when: raw.when,
            category: EventCategory::System,
            message_value: 0,
            message_key: None,
            message_description: String::new(),
            description: raw.description,
            who: raw.who,
            who_id: raw.who_id,
            what: raw.what,
            what_id: raw.what_id,
            r#where: raw.r#where,
            where_id: raw.where_id,
            reference_time: raw.reference_time,
        };
        event.classify(raw.message_category.unwrap_or(0));
        event
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn summary(value: serde_json::Value) -> RawSummaryEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn input_record_carries_type_and_state() {
        let record = entity_from_raw(
            EntityKind::Input,
            summary(json!({
                "EntityInfo": {"ID": "i-1", "Name": "PIR", "InputType": 5, "IsCustomInput": false},
                "CurrentState": 0x41,
                "Permissions": ["Isolate"]
            })),
        );

        assert_eq!(
            record.attributes,
            EntityAttributes::Input {
                state: PublicState::new(EntityKind::Input, 0x41),
                last_state_change: None,
                input_type: InputType::RfDevice,
                is_custom_input: false,
            }
        );
        assert!(record.can(&Capability::View));
        assert!(record.can(&Capability::Isolate));
        assert!(!record.can(&Capability::Control));
        assert_eq!(record.state_description(), vec!["Input is active/unsealed", "Input is inactive/sealed"]);
    }

    #[test]
    fn area_record_keeps_arm_info_and_extra_fields() {
        let record = entity_from_raw(
            EntityKind::Area,
            summary(json!({
                "EntityInfo": {"ID": "a-1", "Name": "Office", "ReportingID": 2, "Colour": "red"},
                "CurrentState": 0x800,
                "ArmInfo": {"EntryDelaySecs": 30, "MultiModeArmEnabled": true},
                "Schedule": "weekdays"
            })),
        );

        let EntityAttributes::Area { arm_info, .. } = &record.attributes else {
            panic!("expected area attributes");
        };
        let arm_info = arm_info.as_ref().unwrap();
        assert_eq!(arm_info.entry_delay_secs, Some(30));
        assert!(arm_info.multi_mode_arm_enabled);
        assert_eq!(record.reporting_id.as_deref(), Some("2"));
        assert_eq!(record.extra["Colour"], "red");
        assert_eq!(record.extra["Schedule"], "weekdays");
    }

    #[test]
    fn users_have_no_state() {
        let record = entity_from_raw(
            EntityKind::User,
            summary(json!({"EntityInfo": {"ID": "u-1", "Name": "Alice"}})),
        );
        assert_eq!(record.attributes, EntityAttributes::User);
        assert!(record.state().is_none());
        assert!(record.state_description().is_empty());
    }

    #[test]
    fn review_event_is_classified() {
        let raw: RawReviewEvent = serde_json::from_value(json!({
            "ID": "e-1",
            "Description": "Front door unlocked by Alice",
            "MessageCategory": 2000,
            "WhenTicks": 100
        }))
        .unwrap();
        let event = ReviewEvent::from(raw);
        assert_eq!(event.category, EventCategory::Access);
        assert_eq!(event.message_key.as_deref(), Some("Access_DoorUnlocked"));
        assert_eq!(event.message_description, "Door Unlocked");
        assert_eq!(event.description.as_deref(), Some("Front door unlocked by Alice"));
    }

    #[test]
    fn unknown_code_falls_back_without_failing() {
        let raw: RawReviewEvent =
            serde_json::from_value(json!({"ID": "e-2", "MessageCategory": 10_999, "WhenTicks": 7}))
                .unwrap();
        let event = ReviewEvent::from(raw);
        assert_eq!(event.category, EventCategory::Hardware);
        assert_eq!(event.message_description, "Unknown event");
        assert!(!event.is_known_message());
    }
}
