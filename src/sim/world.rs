/// WorldState: geometry, pose, pickups and doors of the running level.
///
/// ## Ownership
///
/// A `WorldState` lives inside a `GameSession` and is only mutated through
/// `apply()` (one action) or by restoring a snapshot. Everyone else gets a
/// shared reference. `apply()` checks every precondition before touching
/// anything, so a failed action leaves the world byte-for-byte unchanged.
///
/// ## Cells
///
/// There is no tile grid. `tile_at()` composes a `Tile` from the entity sets
/// with precedence wall > obstacle > door > item > goal.

use crate::domain::action::ActionKind;
use crate::domain::entity::{Character, Direction, Door, Item, Position};
use crate::domain::tile::{DoorState, Tile};
use crate::sim::level::LevelDef;

/// Grid used before any level is loaded.
pub const BASELINE_GRID_SIZE: i32 = 5;

#[derive(Clone, Debug, PartialEq)]
pub struct WorldState {
    // ── Static geometry ──
    pub grid_size: i32,
    pub goal: Position,
    pub obstacles: Vec<Position>,

    // ── Character ──
    pub character: Character,
    /// Visited cells in order. Display only.
    pub trail: Vec<Position>,
    pub pen_down: bool,
    pub cleared: bool,

    // ── Pickups and doors ──
    /// Items still on the board.
    pub items: Vec<Item>,
    /// Picked-up item ids, in pickup order.
    pub inventory: Vec<String>,
    pub doors: Vec<Door>,
}

impl Default for WorldState {
    /// Empty 5×5 board, goal in the far corner, character at the origin
    /// facing right, pen up.
    fn default() -> Self {
        WorldState {
            grid_size: BASELINE_GRID_SIZE,
            goal: Position::new(BASELINE_GRID_SIZE - 1, BASELINE_GRID_SIZE - 1),
            obstacles: Vec::new(),
            character: Character::new(0, 0, Direction::Right),
            trail: Vec::new(),
            pen_down: false,
            cleared: false,
            items: Vec::new(),
            inventory: Vec::new(),
            doors: Vec::new(),
        }
    }
}

// ── Construction ──

impl WorldState {
    pub fn from_level(level: &LevelDef) -> Self {
        let character = Character::new(level.start.x, level.start.y, level.start.direction);
        WorldState {
            grid_size: level.grid_size as i32,
            goal: level.goal,
            obstacles: level.obstacles.clone(),
            character,
            trail: vec![character.pos],
            pen_down: true,
            cleared: false,
            items: level.items.clone(),
            inventory: Vec::new(),
            doors: level.doors.iter().map(Door::from_def).collect(),
        }
    }
}

// ── Queries ──

impl WorldState {
    pub fn tile_at(&self, pos: Position) -> Tile {
        if !pos.in_bounds(self.grid_size) {
            return Tile::Wall;
        }
        if self.obstacles.contains(&pos) {
            return Tile::Obstacle;
        }
        if let Some(door) = self.door_at(pos) {
            return Tile::Door(door_state(door));
        }
        if self.item_at(pos).is_some() {
            return Tile::Item;
        }
        if pos == self.goal {
            return Tile::Goal;
        }
        Tile::Empty
    }

    pub fn can_enter(&self, pos: Position) -> bool {
        self.tile_at(pos).is_passable()
    }

    pub fn item_at(&self, pos: Position) -> Option<&Item> {
        self.items.iter().find(|i| i.position == pos)
    }

    pub fn door_at(&self, pos: Position) -> Option<&Door> {
        self.doors.iter().find(|d| d.position == pos)
    }

    pub fn has_item(&self, id: &str) -> bool {
        self.inventory.iter().any(|i| i == id)
    }

    /// An item lies under the character.
    pub fn can_pick_up(&self) -> bool {
        self.item_at(self.character.pos).is_some()
    }

    /// The cell ahead holds a closed, still-locked door whose key is held.
    pub fn can_unlock_door(&self) -> bool {
        self.unlockable_door_ahead().is_some()
    }

    /// The cell ahead holds a closed door that is already unlocked.
    pub fn can_open_door(&self) -> bool {
        self.openable_door_ahead().is_some()
    }

    /// Whether `kind` would succeed right now. Matches `apply()` exactly.
    pub fn can_apply(&self, kind: ActionKind) -> bool {
        if self.cleared {
            return false;
        }
        match kind {
            ActionKind::MoveForward => self.can_enter(self.character.ahead()),
            ActionKind::TurnRight | ActionKind::TurnLeft => true,
            ActionKind::PickUp => self.can_pick_up(),
            ActionKind::UnlockDoor => self.can_unlock_door(),
            ActionKind::OpenDoor => self.can_open_door(),
        }
    }

    fn unlockable_door_ahead(&self) -> Option<usize> {
        let ahead = self.character.ahead();
        self.doors.iter().position(|d| {
            d.position == ahead
                && !d.open
                && !d.unlocked
                && d.required_item.as_deref().is_some_and(|id| self.has_item(id))
        })
    }

    fn openable_door_ahead(&self) -> Option<usize> {
        let ahead = self.character.ahead();
        self.doors
            .iter()
            .position(|d| d.position == ahead && !d.open && d.unlocked)
    }
}

fn door_state(door: &Door) -> DoorState {
    if door.open {
        DoorState::Open
    } else if door.unlocked {
        DoorState::Unlocked
    } else {
        DoorState::Locked
    }
}

// ── Mutation ──

impl WorldState {
    /// Attempt one action. Returns false, with no change, when it does not
    /// apply. Any action on a cleared level fails.
    pub(super) fn apply(&mut self, kind: ActionKind) -> bool {
        if self.cleared {
            return false;
        }
        match kind {
            ActionKind::MoveForward => {
                let target = self.character.ahead();
                if !self.can_enter(target) {
                    return false;
                }
                self.character.pos = target;
                if self.pen_down {
                    self.trail.push(target);
                }
                self.cleared = target == self.goal;
                true
            }
            ActionKind::TurnRight => {
                self.character.direction = self.character.direction.rotate_right();
                true
            }
            ActionKind::TurnLeft => {
                self.character.direction = self.character.direction.rotate_left();
                true
            }
            ActionKind::PickUp => {
                let here = self.character.pos;
                let Some(idx) = self.items.iter().position(|i| i.position == here) else {
                    return false;
                };
                let item = self.items.remove(idx);
                if !self.has_item(&item.id) {
                    self.inventory.push(item.id);
                }
                true
            }
            ActionKind::UnlockDoor => match self.unlockable_door_ahead() {
                Some(idx) => {
                    self.doors[idx].unlocked = true;
                    true
                }
                None => false,
            },
            ActionKind::OpenDoor => match self.openable_door_ahead() {
                Some(idx) => {
                    self.doors[idx].open = true;
                    true
                }
                None => false,
            },
        }
    }
}
