/// What occupies a grid cell, as seen by movement rules and the renderer.
/// Cells are composed on demand from the world's entity sets; nothing
/// stores a tile map.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DoorState {
    Locked,
    Unlocked,
    Open,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    /// Outside the grid.
    Wall,
    Obstacle,
    Goal,
    Item,
    Door(DoorState),
}

impl Tile {
    /// Can the character step onto this cell?
    pub fn is_passable(self) -> bool {
        match self {
            Tile::Empty | Tile::Goal | Tile::Item => true,
            Tile::Door(state) => state == DoorState::Open,
            Tile::Wall | Tile::Obstacle => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passability() {
        assert!(Tile::Empty.is_passable());
        assert!(Tile::Goal.is_passable());
        assert!(Tile::Item.is_passable());
        assert!(Tile::Door(DoorState::Open).is_passable());
        assert!(!Tile::Door(DoorState::Unlocked).is_passable());
        assert!(!Tile::Door(DoorState::Locked).is_passable());
        assert!(!Tile::Obstacle.is_passable());
        assert!(!Tile::Wall.is_passable());
    }

    #[test]
    fn default_is_empty() {
        assert_eq!(Tile::default(), Tile::Empty);
    }
}
