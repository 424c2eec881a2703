/// The six world actions a typed command can dispatch.
/// Closed set; every consumer matches exhaustively.

use serde::Deserialize;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    MoveForward,
    TurnRight,
    TurnLeft,
    PickUp,
    UnlockDoor,
    OpenDoor,
}

impl ActionKind {
    #[cfg(test)]
    pub const ALL: [ActionKind; 6] = [
        ActionKind::MoveForward,
        ActionKind::TurnRight,
        ActionKind::TurnLeft,
        ActionKind::PickUp,
        ActionKind::UnlockDoor,
        ActionKind::OpenDoor,
    ];

    /// Stable id, as written in level files.
    pub fn id(self) -> &'static str {
        match self {
            ActionKind::MoveForward => "move_forward",
            ActionKind::TurnRight => "turn_right",
            ActionKind::TurnLeft => "turn_left",
            ActionKind::PickUp => "pick_up",
            ActionKind::UnlockDoor => "unlock_door",
            ActionKind::OpenDoor => "open_door",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            ActionKind::MoveForward => "move forward",
            ActionKind::TurnRight => "turn right",
            ActionKind::TurnLeft => "turn left",
            ActionKind::PickUp => "pick up",
            ActionKind::UnlockDoor => "unlock door",
            ActionKind::OpenDoor => "open door",
        }
    }

    /// Actions whose success depends on what is under or in front of the
    /// character. Difficulty settings grey these out or hide them.
    pub fn is_contextual(self) -> bool {
        matches!(self, ActionKind::PickUp | ActionKind::UnlockDoor | ActionKind::OpenDoor)
    }
}
