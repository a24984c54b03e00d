// ── Control commands ──
//
// One flat action vocabulary across doors, areas, inputs and outputs.
// Each action maps to exactly one activity request for one kind.

use std::fmt;
use std::str::FromStr;

use inception_api::{ActivityRequest, AreaControl, DoorControl, InputControl, OutputControl};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::EntityKind;

/// Longest timed unlock the controller accepts, one second short of a day.
pub const MAX_TIMED_UNLOCK_SECS: u32 = 86_399;

/// `GrantAccess` is a short timed unlock.
pub const GRANT_ACCESS_SECS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ControlAction {
    // Doors
    Lock,
    Unlock,
    Open,
    TimedUnlock { seconds: u32 },
    Lockout,
    Reinstate,
    GrantAccess,
    // Areas
    Arm,
    ArmStay,
    ArmSleep,
    Disarm,
    // Inputs
    Isolate,
    Deisolate,
    // Outputs
    On,
    Off,
}

impl ControlAction {
    /// Action names accepted by [`FromStr`] and [`ControlAction::parse`].
    pub const NAMES: &'static [&'static str] = &[
        "lock",
        "unlock",
        "open",
        "timed-unlock",
        "lockout",
        "reinstate",
        "grant-access",
        "arm",
        "arm-stay",
        "arm-sleep",
        "disarm",
        "isolate",
        "deisolate",
        "on",
        "off",
    ];

    /// The kind this action controls.
    pub fn target_kind(self) -> EntityKind {
        match self {
            Self::Lock
            | Self::Unlock
            | Self::Open
            | Self::TimedUnlock { .. }
            | Self::Lockout
            | Self::Reinstate
            | Self::GrantAccess => EntityKind::Door,
            Self::Arm | Self::ArmStay | Self::ArmSleep | Self::Disarm => EntityKind::Area,
            Self::Isolate | Self::Deisolate => EntityKind::Input,
            Self::On | Self::Off => EntityKind::Output,
        }
    }

    /// Parse an action name, attaching `seconds` to `timed-unlock`.
    pub fn parse(name: &str, seconds: Option<u32>) -> Result<Self, CoreError> {
        let action: Self = name.parse()?;
        match (action, seconds) {
            (Self::TimedUnlock { .. }, Some(seconds)) => Ok(Self::TimedUnlock { seconds }),
            (Self::TimedUnlock { .. }, None) => Err(CoreError::ValidationFailed {
                message: "timed-unlock needs a duration in seconds".into(),
            }),
            (_, Some(_)) => Err(CoreError::ValidationFailed {
                message: format!("{name} does not take a duration"),
            }),
            (action, None) => Ok(action),
        }
    }

    /// Build the activity request for an entity of `kind`.
    pub fn to_request(self, kind: EntityKind) -> Result<ActivityRequest, CoreError> {
        if kind == EntityKind::User {
            return Err(CoreError::Unsupported {
                operation: format!("{self} on a user"),
            });
        }
        if self.target_kind() != kind {
            return Err(CoreError::ValidationFailed {
                message: format!("{self} applies to a {}, not a {kind}", self.target_kind()),
            });
        }

        let door = |control, time_secs| ActivityRequest::ControlDoor { control, time_secs };
        let request = match self {
            Self::Lock => door(DoorControl::Lock, None),
            Self::Unlock => door(DoorControl::Unlock, None),
            Self::Open => door(DoorControl::Open, None),
            Self::Lockout => door(DoorControl::Lockout, None),
            Self::Reinstate => door(DoorControl::Reinstate, None),
            Self::GrantAccess => door(DoorControl::TimedUnlock, Some(GRANT_ACCESS_SECS)),
            Self::TimedUnlock { seconds } => {
                if seconds == 0 || seconds > MAX_TIMED_UNLOCK_SECS {
                    return Err(CoreError::ValidationFailed {
                        message: format!(
                            "timed unlock must last 1..={MAX_TIMED_UNLOCK_SECS} seconds, got {seconds}"
                        ),
                    });
                }
                door(DoorControl::TimedUnlock, Some(seconds))
            }
            Self::Arm => ActivityRequest::ControlArea { control: AreaControl::Arm },
            Self::ArmStay => ActivityRequest::ControlArea { control: AreaControl::ArmStay },
            Self::ArmSleep => ActivityRequest::ControlArea { control: AreaControl::ArmSleep },
            Self::Disarm => ActivityRequest::ControlArea { control: AreaControl::Disarm },
            Self::Isolate => ActivityRequest::ControlInput { control: InputControl::Isolate },
            Self::Deisolate => ActivityRequest::ControlInput { control: InputControl::Deisolate },
            Self::On => ActivityRequest::ControlOutput { control: OutputControl::On },
            Self::Off => ActivityRequest::ControlOutput { control: OutputControl::Off },
        };
        Ok(request)
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::Open => "open",
            Self::TimedUnlock { seconds } => return write!(f, "timed-unlock ({seconds}s)"),
            Self::Lockout => "lockout",
            Self::Reinstate => "reinstate",
            Self::GrantAccess => "grant-access",
            Self::Arm => "arm",
            Self::ArmStay => "arm-stay",
            Self::ArmSleep => "arm-sleep",
            Self::Disarm => "disarm",
            Self::Isolate => "isolate",
            Self::Deisolate => "deisolate",
            Self::On => "on",
            Self::Off => "off",
        };
        f.write_str(name)
    }
}

/// Parses the kebab-case name. `timed-unlock` parses with zero seconds;
/// use [`ControlAction::parse`] to attach a duration.
impl FromStr for ControlAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let action = match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "lock" => Self::Lock,
            "unlock" => Self::Unlock,
            "open" => Self::Open,
            "timed-unlock" => Self::TimedUnlock { seconds: 0 },
            "lockout" => Self::Lockout,
            "reinstate" => Self::Reinstate,
            "grant-access" => Self::GrantAccess,
            "arm" => Self::Arm,
            "arm-stay" => Self::ArmStay,
            "arm-sleep" => Self::ArmSleep,
            "disarm" => Self::Disarm,
            "isolate" => Self::Isolate,
            "deisolate" => Self::Deisolate,
            "on" => Self::On,
            "off" => Self::Off,
            _ => {
                return Err(CoreError::ValidationFailed {
                    message: format!(
                        "unknown action {s:?} (expected one of: {})",
                        Self::NAMES.join(", ")
                    ),
                });
            }
        };
        Ok(action)
    }
}
