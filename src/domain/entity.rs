/// Entities: grid coordinates, facing, the character's pose, pickups and doors.
/// Everything here is plain data; rules live in `sim::world`.

use serde::Deserialize;

/// Integer grid coordinate. Valid cells lie in `[0, grid_size)` on both axes;
/// a stepped position may fall outside, so the fields are signed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// The neighbouring cell one step along `dir`. May be out of bounds.
    pub fn step(self, dir: Direction) -> Position {
        let (dx, dy) = dir.delta();
        Position { x: self.x + dx, y: self.y + dy }
    }

    pub fn in_bounds(self, grid_size: i32) -> bool {
        self.x >= 0 && self.x < grid_size && self.y >= 0 && self.y < grid_size
    }
}

/// Facing. `y` grows downward, so `Up` is `(0, -1)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    #[cfg(test)]
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// 90° clockwise.
    pub fn rotate_right(self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    /// 90° counterclockwise.
    pub fn rotate_left(self) -> Self {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Screen angle in radians: right = 0, down = π/2, left = π, up = −π/2.
    pub fn angle(self) -> f64 {
        use std::f64::consts::{FRAC_PI_2, PI};
        match self {
            Direction::Right => 0.0,
            Direction::Down => FRAC_PI_2,
            Direction::Left => PI,
            Direction::Up => -FRAC_PI_2,
        }
    }

    /// Direction whose angle is closest to `angle` (any winding).
    pub fn nearest(angle: f64) -> Direction {
        use std::f64::consts::{FRAC_PI_2, TAU};
        let quarter = (angle.rem_euclid(TAU) / FRAC_PI_2).round() as i32 % 4;
        match quarter {
            0 => Direction::Right,
            1 => Direction::Down,
            2 => Direction::Left,
            _ => Direction::Up,
        }
    }
}

/// The character's pose. Exactly one per session.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Character {
    pub pos: Position,
    pub direction: Direction,
}

impl Character {
    pub fn new(x: i32, y: i32, direction: Direction) -> Self {
        Character { pos: Position::new(x, y), direction }
    }

    /// The cell directly in front of the character.
    pub fn ahead(&self) -> Position {
        self.pos.step(self.direction)
    }
}

/// A collectible lying on the board until picked up.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
pub struct Item {
    pub id: String,
    pub label: String,
    pub position: Position,
}

/// A door as written in level data. Lock/open state is derived at load.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
pub struct DoorDef {
    pub id: String,
    pub position: Position,
    #[serde(default)]
    pub required_item: Option<String>,
}

/// Runtime door.
///
/// Lifecycle: locked → unlocked (explicit action, needs the item) → open.
/// A door without `required_item` starts unlocked. Once open it stays open
/// for the rest of the level, so `open` implies `unlocked`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Door {
    pub id: String,
    pub position: Position,
    pub required_item: Option<String>,
    pub unlocked: bool,
    pub open: bool,
}

impl Door {
    pub fn from_def(def: &DoorDef) -> Self {
        Door {
            id: def.id.clone(),
            position: def.position,
            required_item: def.required_item.clone(),
            unlocked: def.required_item.is_none(),
            open: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn step_moves_one_cell() {
        let p = Position::new(2, 2);
        assert_eq!(p.step(Direction::Up), Position::new(2, 1));
        assert_eq!(p.step(Direction::Down), Position::new(2, 3));
        assert_eq!(p.step(Direction::Left), Position::new(1, 2));
        assert_eq!(p.step(Direction::Right), Position::new(3, 2));
    }

    #[test]
    fn bounds() {
        assert!(Position::new(0, 0).in_bounds(5));
        assert!(Position::new(4, 4).in_bounds(5));
        assert!(Position::new(2, 3).in_bounds(5));
        assert!(!Position::new(-1, 0).in_bounds(5));
        assert!(!Position::new(0, -1).in_bounds(5));
        assert!(!Position::new(5, 0).in_bounds(5));
        assert!(!Position::new(0, 5).in_bounds(5));
    }

    #[test]
    fn rotation_tables() {
        assert_eq!(Direction::Up.rotate_right(), Direction::Right);
        assert_eq!(Direction::Right.rotate_right(), Direction::Down);
        assert_eq!(Direction::Down.rotate_right(), Direction::Left);
        assert_eq!(Direction::Left.rotate_right(), Direction::Up);

        assert_eq!(Direction::Up.rotate_left(), Direction::Left);
        assert_eq!(Direction::Left.rotate_left(), Direction::Down);
        assert_eq!(Direction::Down.rotate_left(), Direction::Right);
        assert_eq!(Direction::Right.rotate_left(), Direction::Up);
    }

    #[test]
    fn nearest_recovers_each_direction() {
        for d in Direction::ALL {
            assert_eq!(Direction::nearest(d.angle()), d);
            assert_eq!(Direction::nearest(d.angle() + std::f64::consts::TAU), d);
        }
        // -π and π are both "left"
        assert_eq!(Direction::nearest(-std::f64::consts::PI), Direction::Left);
    }

    #[test]
    fn door_state_derived_from_def() {
        let plain = Door::from_def(&DoorDef {
            id: "d".into(),
            position: Position::new(1, 1),
            required_item: None,
        });
        assert!(plain.unlocked);
        assert!(!plain.open);

        let locked = Door::from_def(&DoorDef {
            id: "d2".into(),
            position: Position::new(1, 2),
            required_item: Some("key".into()),
        });
        assert!(!locked.unlocked);
        assert!(!locked.open);
    }

    fn any_direction() -> impl Strategy<Value = Direction> {
        prop::sample::select(Direction::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn four_right_turns_are_identity(d in any_direction()) {
            prop_assert_eq!(d.rotate_right().rotate_right().rotate_right().rotate_right(), d);
        }

        #[test]
        fn four_left_turns_are_identity(d in any_direction()) {
            prop_assert_eq!(d.rotate_left().rotate_left().rotate_left().rotate_left(), d);
        }

        #[test]
        fn left_undoes_right(d in any_direction()) {
            prop_assert_eq!(d.rotate_right().rotate_left(), d);
        }
    }
}
