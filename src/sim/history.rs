/// Undo/redo history built from whole-state snapshots.
///
/// `past` is a stack (most recent last). `future` is a deque whose front is
/// the next state to redo. Recording a new snapshot always empties `future`.
///
/// Snapshots are deep copies: every `Vec` and `String` is cloned, so nothing
/// in history aliases live state.

use std::collections::VecDeque;

use crate::domain::entity::{Character, Door, Item, Position};
use crate::sim::world::WorldState;

/// The mutable part of a `WorldState`. Geometry is fixed per level and
/// is not captured.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub character: Character,
    pub trail: Vec<Position>,
    pub cleared: bool,
    pub pen_down: bool,
    pub items: Vec<Item>,
    pub inventory: Vec<String>,
    pub doors: Vec<Door>,
}

pub fn capture_snapshot(world: &WorldState) -> Snapshot {
    Snapshot {
        character: world.character,
        trail: world.trail.clone(),
        cleared: world.cleared,
        pen_down: world.pen_down,
        items: world.items.clone(),
        inventory: world.inventory.clone(),
        doors: world.doors.clone(),
    }
}

pub fn restore_snapshot(world: &mut WorldState, snap: Snapshot) {
    world.character = snap.character;
    world.trail = snap.trail;
    world.cleared = snap.cleared;
    world.pen_down = snap.pen_down;
    world.items = snap.items;
    world.inventory = snap.inventory;
    world.doors = snap.doors;
}

#[derive(Clone, Debug, Default)]
pub struct History {
    past: Vec<Snapshot>,
    future: VecDeque<Snapshot>,
}

impl History {
    /// Push the pre-action state. Invalidates redo.
    pub fn record(&mut self, before: Snapshot) {
        self.past.push(before);
        self.future.clear();
    }

    /// Step back one action. The pre-undo state goes to the front of
    /// `future`. Returns false if there is nothing to undo.
    pub fn undo(&mut self, live: &mut WorldState) -> bool {
        let Some(prev) = self.past.pop() else {
            return false;
        };
        self.future.push_front(capture_snapshot(live));
        restore_snapshot(live, prev);
        true
    }

    /// Re-apply the most recently undone action. The pre-redo state goes to
    /// the end of `past`. Returns false if there is nothing to redo.
    pub fn redo(&mut self, live: &mut WorldState) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        self.past.push(capture_snapshot(live));
        restore_snapshot(live, next);
        true
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Number of undoable steps.
    pub fn len(&self) -> usize {
        self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.past.is_empty()
    }

    pub fn redo_len(&self) -> usize {
        self.future.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Direction;

    #[test]
    fn snapshot_is_independent() {
        let mut w = WorldState::default();
        w.trail.push(Position::new(0, 0));
        let snap = capture_snapshot(&w);
        w.trail.push(Position::new(1, 0));
        w.inventory.push("key".into());
        assert_eq!(snap.trail, vec![Position::new(0, 0)]);
        assert!(snap.inventory.is_empty());
    }

    #[test]
    fn empty_history_is_noop() {
        let mut h = History::default();
        let mut w = WorldState::default();
        let before = w.clone();
        assert!(!h.undo(&mut w));
        assert!(!h.redo(&mut w));
        assert_eq!(w, before);
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut h = History::default();
        let mut w = WorldState::default();
        let start = w.clone();

        h.record(capture_snapshot(&w));
        w.character.direction = Direction::Down;
        let after = w.clone();

        assert!(h.undo(&mut w));
        assert_eq!(w, start);
        assert_eq!(h.len(), 0);
        assert_eq!(h.redo_len(), 1);

        assert!(h.redo(&mut w));
        assert_eq!(w, after);
        assert_eq!(h.len(), 1);
        assert_eq!(h.redo_len(), 0);
    }

    #[test]
    fn future_is_fifo_from_the_front() {
        let mut h = History::default();
        let mut w = WorldState::default();
        let states: Vec<Direction> = vec![Direction::Down, Direction::Left, Direction::Up];
        for d in &states {
            h.record(capture_snapshot(&w));
            w.character.direction = *d;
        }
        for _ in 0..3 {
            assert!(h.undo(&mut w));
        }
        assert_eq!(w.character.direction, Direction::Right);
        for d in &states {
            assert!(h.redo(&mut w));
            assert_eq!(w.character.direction, *d);
        }
    }

    #[test]
    fn record_clears_redo() {
        let mut h = History::default();
        let mut w = WorldState::default();
        h.record(capture_snapshot(&w));
        w.character.direction = Direction::Down;
        assert!(h.undo(&mut w));
        assert_eq!(h.redo_len(), 1);
        h.record(capture_snapshot(&w));
        assert_eq!(h.redo_len(), 0);
        assert!(!h.redo(&mut w));
    }
}
