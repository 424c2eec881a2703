/// Command table: the six typed commands and when each may be chosen.

use serde::Deserialize;

use crate::domain::action::ActionKind;
use crate::sim::world::WorldState;
use crate::typing::kana::default_keys;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command {
    /// Display label (kanji).
    pub label: &'static str,
    /// Target string for the matcher.
    pub kana: &'static str,
    pub action: ActionKind,
}

impl Command {
    /// Canonical romanization, as shown in the guide.
    pub fn romaji(&self) -> String {
        default_keys(self.kana)
    }
}

pub const COMMANDS: [Command; 6] = [
    Command { label: "前に進む", kana: "まえにすすむ", action: ActionKind::MoveForward },
    Command { label: "右を向く", kana: "みぎをむく", action: ActionKind::TurnRight },
    Command { label: "左を向く", kana: "ひだりをむく", action: ActionKind::TurnLeft },
    Command { label: "拾う", kana: "ひろう", action: ActionKind::PickUp },
    Command { label: "鍵を開ける", kana: "かぎをあける", action: ActionKind::UnlockDoor },
    Command { label: "扉を開く", kana: "とびらをひらく", action: ActionKind::OpenDoor },
];

#[cfg(test)]
pub fn command_for(kind: ActionKind) -> &'static Command {
    match kind {
        ActionKind::MoveForward => &COMMANDS[0],
        ActionKind::TurnRight => &COMMANDS[1],
        ActionKind::TurnLeft => &COMMANDS[2],
        ActionKind::PickUp => &COMMANDS[3],
        ActionKind::UnlockDoor => &COMMANDS[4],
        ActionKind::OpenDoor => &COMMANDS[5],
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Contextual commands always listed, greyed out when they would fail.
    #[default]
    Easy,
    /// Contextual commands only listed when they would succeed.
    Hard,
}

impl Difficulty {
    pub fn toggled(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    Enabled,
    Disabled,
    Hidden,
}

impl Availability {
    pub fn selectable(self) -> bool {
        self == Availability::Enabled
    }
}

/// Movement and turns are always offered, even when they would bump into
/// something. Contextual commands follow the world's predicates.
pub fn availability(cmd: &Command, world: &WorldState, difficulty: Difficulty) -> Availability {
    let usable = !cmd.action.is_contextual() || world.can_apply(cmd.action);
    match (usable, difficulty) {
        (true, _) => Availability::Enabled,
        (false, Difficulty::Easy) => Availability::Disabled,
        (false, Difficulty::Hard) => Availability::Hidden,
    }
}
