// ── Public state bitmasks ──
//
// Every door, area, input and output reports a `CurrentState` bitmask.
// Bit meanings differ per kind, so a `PublicState` carries its kind and
// decodes against the matching flag table.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity::EntityKind;

/// One named bit of a public state mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateFlag {
    pub name: &'static str,
    pub bit: u32,
    pub description: &'static str,
}

const fn flag(name: &'static str, bit: u32, description: &'static str) -> StateFlag {
    StateFlag {
        name,
        bit,
        description,
    }
}

pub const DOOR_FLAGS: &[StateFlag] = &[
    flag("UNLOCKED", 0x001, "Door is unlocked"),
    flag("OPEN", 0x002, "Door is open"),
    flag("LOCKED_OUT", 0x004, "Door is locked out"),
    flag("FORCED", 0x008, "Door has been forced open"),
    flag("HELD_OPEN_WARNING", 0x010, "Door has nearly been held open too long"),
    flag("HELD_OPEN_TOO_LONG", 0x020, "Door has been held open too long"),
    flag("BREAKGLASS", 0x040, "Door's breakglass detector has been triggered"),
    flag("READER_TAMPER", 0x080, "A reader connected to the door has been tampered with"),
    flag("LOCKED", 0x100, "Door is locked"),
    flag("CLOSED", 0x200, "Door is closed"),
    flag("HELD_RESPONSE_MUTED", 0x400, "Door's Held Open response has been muted by a user"),
    flag("BATTERY_LOW", 0x800, "Door Wireless Lock has Low Battery"),
    flag("LOCK_OFFLINE", 0x1000, "Door Wireless Lock Offline"),
];

pub const AREA_FLAGS: &[StateFlag] = &[
    flag("ARMED", 0x001, "Area is armed"),
    flag("ALARM", 0x002, "Area is in alarm"),
    flag("ENTRY_DELAY", 0x004, "Area is in entry delay"),
    flag("EXIT_DELAY", 0x008, "Area is in exit delay"),
    flag("ARM_WARNING", 0x010, "Area is in arm warning"),
    flag("DEFER_DISARMED", 0x020, "Area has been defer disarmed (temporarily disarmed)"),
    flag("DETECTING_ACTIVE_INPUTS", 0x040, "One or more inputs in this area are currently unsealed"),
    flag("WALK_TEST_ACTIVE", 0x080, "A walk test is currently active for this area"),
    flag("AWAY_ARM", 0x100, "Area is armed in Full mode"),
    flag("STAY_ARM", 0x200, "Area is armed in Perimeter mode"),
    flag("SLEEP_ARM", 0x400, "Area is armed in Night mode"),
    flag("DISARMED", 0x800, "Area is disarmed"),
    flag("ARM_READY", 0x1000, "Area is ready to arm (i.e. no active inputs)"),
];

pub const INPUT_FLAGS: &[StateFlag] = &[
    flag("ACTIVE", 0x001, "Input is active/unsealed"),
    flag("TAMPER", 0x002, "Input has been tampered with"),
    flag("ISOLATED", 0x004, "Input is temporarily or permanently isolated from the system (bypassed)"),
    flag("MASK", 0x008, "Input is being masked/blocked"),
    flag("LOW_BATTERY", 0x010, "Input is reporting low battery (RF detector)"),
    flag("POLL_FAILED", 0x020, "Failed to poll the input (RF detector)"),
    flag("SEALED", 0x040, "Input is inactive/sealed"),
    flag("WIRELESS_DOOR_BATTERY_LOW", 0x080, "Input is reporting low battery (Wireless Door)"),
    flag("WIRELESS_DOOR_LOCK_OFFLINE", 0x100, "Input is reporting lock offline (Wireless Door)"),
];

pub const OUTPUT_FLAGS: &[StateFlag] = &[
    flag("ON", 0x001, "Output is active"),
    flag("OFF", 0x002, "Output is inactive"),
];

/// Flag table for a kind. Users carry no state.
pub fn flags_for(kind: EntityKind) -> &'static [StateFlag] {
    match kind {
        EntityKind::Door => DOOR_FLAGS,
        EntityKind::Area => AREA_FLAGS,
        EntityKind::Input => INPUT_FLAGS,
        EntityKind::Output => OUTPUT_FLAGS,
        EntityKind::User => &[],
    }
}

/// A kind-tagged `CurrentState` bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicState {
    pub kind: EntityKind,
    pub bits: u32,
}

impl PublicState {
    pub fn new(kind: EntityKind, bits: u32) -> Self {
        Self { kind, bits }
    }

    pub fn contains(&self, name: &str) -> bool {
        flags_for(self.kind)
            .iter()
            .any(|f| f.name == name && self.bits & f.bit != 0)
    }

    /// Set flags, in table order.
    pub fn flags(&self) -> impl Iterator<Item = &'static StateFlag> + '_ {
        flags_for(self.kind)
            .iter()
            .filter(move |f| self.bits & f.bit != 0)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.flags().map(|f| f.name).collect()
    }

    /// Human descriptions of every set flag.
    pub fn descriptions(&self) -> Vec<&'static str> {
        self.flags().map(|f| f.description).collect()
    }

    /// Bits that are set but have no entry in the kind's table.
    pub fn unknown_bits(&self) -> u32 {
        let known = flags_for(self.kind).iter().fold(0, |acc, f| acc | f.bit);
        self.bits & !known
    }
}

impl fmt::Display for PublicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        if names.is_empty() {
            write!(f, "{:#x}", self.bits)
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

// ── Input types ──────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InputType {
    #[default]
    Unknown,
    Detector,
    Switch,
    Logical,
    Analog,
    RfDevice,
    WirelessDoorHealth,
}

impl From<u8> for InputType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Detector,
            2 => Self::Switch,
            3 => Self::Logical,
            4 => Self::Analog,
            5 => Self::RfDevice,
            6 => Self::WirelessDoorHealth,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn door_flags_decode_in_table_order() {
        let state = PublicState::new(EntityKind::Door, 0x201);
        assert_eq!(state.names(), vec!["UNLOCKED", "CLOSED"]);
        assert_eq!(
            state.descriptions(),
            vec!["Door is unlocked", "Door is closed"]
        );
        assert!(state.contains("CLOSED"));
        assert!(!state.contains("LOCKED"));
        assert_eq!(state.to_string(), "UNLOCKED|CLOSED");
    }

    #[test]
    fn same_bits_mean_different_things_per_kind() {
        let area = PublicState::new(EntityKind::Area, 0x800);
        let door = PublicState::new(EntityKind::Door, 0x800);
        assert_eq!(area.names(), vec!["DISARMED"]);
        assert_eq!(door.names(), vec!["BATTERY_LOW"]);
    }

    #[test]
    fn unknown_bits_are_reported() {
        let output = PublicState::new(EntityKind::Output, 0x11);
        assert_eq!(output.names(), vec!["ON"]);
        assert_eq!(output.unknown_bits(), 0x10);
        assert_eq!(PublicState::new(EntityKind::Output, 0).to_string(), "0x0");
    }

    #[test]
    fn input_type_codes() {
        assert_eq!(InputType::from(5), InputType::RfDevice);
        assert_eq!(InputType::from(42), InputType::Unknown);
        assert_eq!(InputType::WirelessDoorHealth.to_string(), "wireless_door_health");
    }
}
