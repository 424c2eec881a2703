/// GameSession: the single owner of live game state.
///
/// The world is only mutated through `init_level`, `execute_action`,
/// `undo`, `redo` and `reset`. Readers borrow `world()`.

use log::{debug, info};

use crate::domain::action::ActionKind;
use crate::sim::commands::{availability, Availability, Command, Difficulty};
use crate::sim::history::{capture_snapshot, History};
use crate::sim::level::LevelDef;
use crate::sim::world::WorldState;

#[derive(Clone, Debug, Default)]
pub struct GameSession {
    world: WorldState,
    level: Option<LevelDef>,
    history: History,
}

impl GameSession {
    /// Session with no level: the baseline board, empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `level` fresh. Clears history.
    pub fn init_level(&mut self, level: LevelDef) {
        info!("level {} ({}) loaded", level.id, level.name);
        self.world = WorldState::from_level(&level);
        self.level = Some(level);
        self.history.clear();
    }

    /// Try one action. On success the pre-action state is recorded for undo
    /// and redo is invalidated. On failure nothing changes.
    pub fn execute_action(&mut self, kind: ActionKind) -> bool {
        if !self.world.can_apply(kind) {
            debug!("{} rejected", kind.describe());
            return false;
        }
        let before = capture_snapshot(&self.world);
        let applied = self.world.apply(kind);
        debug_assert!(applied, "can_apply and apply disagree on {}", kind.id());
        self.history.record(before);
        debug!(
            "{} ok: at ({}, {}) facing {:?}",
            kind.describe(),
            self.world.character.pos.x,
            self.world.character.pos.y,
            self.world.character.direction
        );
        if self.world.cleared {
            info!("level cleared in {} moves", self.move_count());
        }
        true
    }

    pub fn undo(&mut self) -> bool {
        let ok = self.history.undo(&mut self.world);
        debug!("undo: {ok}");
        ok
    }

    pub fn redo(&mut self) -> bool {
        let ok = self.history.redo(&mut self.world);
        debug!("redo: {ok}");
        ok
    }

    /// Back to the level's starting state, or to the baseline board if no
    /// level is loaded. Both stacks are emptied.
    pub fn reset(&mut self) {
        match self.level.take() {
            Some(level) => self.init_level(level),
            None => {
                self.world = WorldState::default();
                self.history.clear();
            }
        }
        debug!("reset");
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn level(&self) -> Option<&LevelDef> {
        self.level.as_ref()
    }

    /// Successful actions since load, net of undo/redo.
    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        self.history.redo_len() > 0
    }

    pub fn availability(&self, cmd: &Command, difficulty: Difficulty) -> Availability {
        availability(cmd, &self.world, difficulty)
    }

    /// Next step of the level's suggested script, if any.
    pub fn suggested_next(&self) -> Option<ActionKind> {
        self.level.as_ref()?.suggestion(self.move_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Direction, Position};
    use crate::sim::history::Snapshot;
    use crate::sim::world::tests::{key_door_level, open_level};
    use proptest::prelude::*;

    fn session_on(level: LevelDef) -> GameSession {
        let mut s = GameSession::new();
        s.init_level(level);
        s
    }

    #[test]
    fn straight_run_clears() {
        let mut s = session_on(open_level(5, (0, 4, Direction::Right), (4, 4)));
        for _ in 0..4 {
            assert!(s.execute_action(ActionKind::MoveForward));
        }
        assert!(s.world().cleared);
        assert!(!s.execute_action(ActionKind::TurnRight));
        assert_eq!(s.move_count(), 4);
    }

    #[test]
    fn failed_action_records_nothing() {
        let mut s = session_on(open_level(5, (0, 0, Direction::Up), (4, 4)));
        assert!(!s.execute_action(ActionKind::MoveForward));
        assert_eq!(s.move_count(), 0);
        assert!(!s.can_undo());
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut s = session_on(key_door_level());
        let start = s.world().clone();
        assert!(s.execute_action(ActionKind::MoveForward));
        let after = s.world().clone();

        assert!(s.undo());
        assert_eq!(s.world(), &start);
        assert!(s.can_redo());
        assert!(s.redo());
        assert_eq!(s.world(), &after);
        assert!(!s.redo());
    }

    #[test]
    fn new_action_after_undo_drops_redo() {
        let mut s = session_on(key_door_level());
        s.execute_action(ActionKind::MoveForward);
        s.undo();
        assert!(s.can_redo());
        assert!(s.execute_action(ActionKind::TurnRight));
        assert!(!s.can_redo());
        assert!(!s.redo());
    }

    #[test]
    fn rejected_action_keeps_redo() {
        let mut s = session_on(key_door_level());
        assert!(s.execute_action(ActionKind::MoveForward));
        let after = s.world().clone();
        assert!(s.undo());

        // nothing to pick up on the start cell
        assert!(!s.execute_action(ActionKind::PickUp));
        assert_eq!(s.move_count(), 0);
        assert!(s.can_redo());
        assert!(s.redo());
        assert_eq!(s.world(), &after);
    }

    #[test]
    fn undo_restores_pickup_and_door() {
        let mut s = session_on(key_door_level());
        s.execute_action(ActionKind::MoveForward);
        s.execute_action(ActionKind::PickUp);
        s.execute_action(ActionKind::MoveForward);
        s.execute_action(ActionKind::UnlockDoor);
        assert!(s.world().doors[0].unlocked);

        assert!(s.undo());
        assert!(!s.world().doors[0].unlocked);
        assert!(s.undo());
        assert!(s.undo());
        assert!(s.world().inventory.is_empty());
        assert_eq!(s.world().items.len(), 1);
    }

    #[test]
    fn reset_reloads_level() {
        let mut s = session_on(key_door_level());
        let start = s.world().clone();
        s.execute_action(ActionKind::MoveForward);
        s.execute_action(ActionKind::PickUp);
        s.undo();
        s.reset();
        assert_eq!(s.world(), &start);
        assert!(!s.can_undo());
        assert!(!s.can_redo());
        assert!(s.level().is_some());
    }

    #[test]
    fn reset_without_level_gives_baseline() {
        let mut s = GameSession::new();
        s.reset();
        assert_eq!(s.world(), &WorldState::default());
        assert!(s.level().is_none());
    }

    #[test]
    fn suggestion_follows_move_count() {
        let mut lvl = open_level(5, (0, 4, Direction::Right), (4, 4));
        lvl.suggested_commands = Some(vec![ActionKind::TurnLeft, ActionKind::MoveForward]);
        let mut s = session_on(lvl);
        assert_eq!(s.suggested_next(), Some(ActionKind::TurnLeft));
        s.execute_action(ActionKind::TurnLeft);
        assert_eq!(s.suggested_next(), Some(ActionKind::MoveForward));
        s.undo();
        assert_eq!(s.suggested_next(), Some(ActionKind::TurnLeft));
        s.redo();
        s.execute_action(ActionKind::MoveForward);
        assert_eq!(s.suggested_next(), None);
    }

    #[test]
    fn history_holds_pre_action_state() {
        let mut s = session_on(open_level(5, (0, 0, Direction::Right), (4, 4)));
        let before: Snapshot = capture_snapshot(s.world());
        s.execute_action(ActionKind::MoveForward);
        s.undo();
        assert_eq!(capture_snapshot(s.world()), before);
        assert_eq!(s.world().character.pos, Position::new(0, 0));
    }

    fn any_action() -> impl Strategy<Value = ActionKind> {
        prop::sample::select(ActionKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn undo_after_any_success_restores_exactly(
            prefix in prop::collection::vec(any_action(), 0..12),
            last in any_action(),
        ) {
            let mut s = session_on(key_door_level());
            for kind in prefix {
                s.execute_action(kind);
            }
            let before = s.world().clone();
            let moves = s.move_count();
            if s.execute_action(last) {
                let after = s.world().clone();
                prop_assert!(s.undo());
                prop_assert_eq!(s.world(), &before);
                prop_assert_eq!(s.move_count(), moves);
                prop_assert!(s.redo());
                prop_assert_eq!(s.world(), &after);
            } else {
                prop_assert_eq!(s.world(), &before);
                prop_assert_eq!(s.move_count(), moves);
            }
        }

        #[test]
        fn inventory_never_has_duplicates(script in prop::collection::vec(any_action(), 0..24)) {
            let mut s = session_on(key_door_level());
            for kind in script {
                s.execute_action(kind);
                let inv = &s.world().inventory;
                let mut dedup = inv.clone();
                dedup.sort();
                dedup.dedup();
                prop_assert_eq!(dedup.len(), inv.len());
                for d in &s.world().doors {
                    prop_assert!(!d.open || d.unlocked);
                }
            }
        }
    }
}
