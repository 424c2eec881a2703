/// Events emitted while handling player input.
/// The presentation layer consumes these for sound and status messages.

use crate::domain::action::ActionKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    KeyAccepted,
    KeyRejected,
    /// The typed word is complete; its action runs after the confirm delay.
    CommandTyped(ActionKind),
    ActionApplied(ActionKind),
    ActionRejected(ActionKind),
    LevelCleared,
    Undone,
    Redone,
    Reset,
}
