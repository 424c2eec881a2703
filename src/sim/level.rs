/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory: every `*.toml` file, sorted by file name
///   2. Built-in embedded levels
///
/// A file that fails to read, parse or validate is skipped with a warning.
/// If the directory yields nothing, the embedded set is used.
///
/// ## File format (`.toml`):
///   ```toml
///   name = "Stage 7"
///   description = "Pick up the key and open the door"
///   grid_size = 5
///   goal = { x = 4, y = 0 }
///   suggested_commands = ["move_forward", "pick_up"]
///
///   [start]
///   x = 0
///   y = 4
///   direction = "right"
///
///   [[obstacles]]
///   x = 1
///   y = 0
///
///   [[items]]
///   id = "key"
///   label = "かぎ"
///   position = { x = 3, y = 4 }
///
///   [[doors]]
///   id = "door-1"
///   position = { x = 4, y = 2 }
///   required_item = "key"
///   ```
///
/// `id` is optional and defaults to the file stem.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::config::GameConfig;
use crate::domain::action::ActionKind;
use crate::domain::entity::{Direction, DoorDef, Item, Position};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LevelDef {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub grid_size: u32,
    pub start: StartDef,
    pub goal: Position,
    #[serde(default)]
    pub obstacles: Vec<Position>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub doors: Vec<DoorDef>,
    #[serde(default)]
    pub suggested_commands: Option<Vec<ActionKind>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct StartDef {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("level {name:?} is invalid: {reason}")]
    Invalid { name: String, reason: String },
}

impl LevelDef {
    pub fn start_position(&self) -> Position {
        Position::new(self.start.x, self.start.y)
    }

    /// The command suggested as the `step`-th move, if the level has a script.
    pub fn suggestion(&self, step: usize) -> Option<ActionKind> {
        self.suggested_commands.as_ref()?.get(step).copied()
    }

    /// Reject data the engine cannot run: empty grid, anything placed
    /// off the board, duplicate ids, a start cell that is blocked, or a
    /// door keyed to an item that does not exist.
    pub fn validate(&self) -> Result<(), LevelError> {
        let invalid = |reason: String| LevelError::Invalid { name: self.name.clone(), reason };

        if self.grid_size == 0 {
            return Err(invalid("grid_size must be positive".into()));
        }
        let size = i32::try_from(self.grid_size)
            .map_err(|_| invalid(format!("grid_size {} is too large", self.grid_size)))?;

        let check = |what: &str, p: Position| {
            if p.in_bounds(size) {
                Ok(())
            } else {
                Err(invalid(format!("{what} ({}, {}) is outside the {size}×{size} grid", p.x, p.y)))
            }
        };
        check("start", self.start_position())?;
        check("goal", self.goal)?;
        for &p in &self.obstacles {
            check("obstacle", p)?;
        }
        for item in &self.items {
            check(&format!("item {:?}", item.id), item.position)?;
        }
        for door in &self.doors {
            check(&format!("door {:?}", door.id), door.position)?;
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.items.iter().find(|i| !seen.insert(i.id.as_str())) {
            return Err(invalid(format!("duplicate item id {:?}", dup.id)));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.doors.iter().find(|d| !seen.insert(d.id.as_str())) {
            return Err(invalid(format!("duplicate door id {:?}", dup.id)));
        }

        let start = self.start_position();
        if self.obstacles.contains(&start) {
            return Err(invalid("start is on an obstacle".into()));
        }
        if self.doors.iter().any(|d| d.position == start) {
            return Err(invalid("start is on a door".into()));
        }

        for door in &self.doors {
            if let Some(req) = &door.required_item {
                if !self.items.iter().any(|i| &i.id == req) {
                    return Err(invalid(format!(
                        "door {:?} needs item {req:?}, which the level does not have",
                        door.id
                    )));
                }
            }
        }
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// All playable levels: the configured directory if it yields any valid
/// file, else the embedded set.
pub fn load_levels(config: &GameConfig) -> Vec<LevelDef> {
    let dir = &config.levels_dir;
    if dir.is_dir() {
        let levels = load_from_directory(dir);
        if !levels.is_empty() {
            info!("{} level(s) loaded from {}", levels.len(), dir.display());
            return levels;
        }
        warn!("no valid level in {}, using built-in levels", dir.display());
    } else {
        debug!("{} is not a directory, using built-in levels", dir.display());
    }
    embedded_levels()
}

/// Parse and validate one level file. A missing `id` becomes the file stem.
pub fn parse_level_file(path: &Path) -> Result<LevelDef, LevelError> {
    let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut def = parse_level_str(&text).map_err(|source| LevelError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if def.id.is_empty() {
        def.id = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
    }
    def.validate()?;
    Ok(def)
}

fn parse_level_str(text: &str) -> Result<LevelDef, toml::de::Error> {
    toml::from_str(text)
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .toml files)
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<LevelDef> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!("cannot list {}: {e}", dir.display());
            return vec![];
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|e| e == "toml"))
        .collect();
    paths.sort();

    paths
        .iter()
        .filter_map(|path| match parse_level_file(path) {
            Ok(def) => Some(def),
            Err(e) => {
                warn!("skipping level: {e}");
                None
            }
        })
        .collect()
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    use ActionKind::{
        MoveForward as F, OpenDoor as O, PickUp as P, TurnLeft as L, TurnRight as R, UnlockDoor as U,
    };
    use Direction::{Right, Up};

    let key = |x, y| Item { id: "key".into(), label: "かぎ".into(), position: Position::new(x, y) };
    let locked_door = |x, y| DoorDef {
        id: "door-1".into(),
        position: Position::new(x, y),
        required_item: Some("key".into()),
    };

    vec![
        // ── Tutorials ──
        make_embedded("stage-1", "ステージ 1", "まえにすすんでゴールをめざそう！",
            5, (0, 4, Right), (4, 4), &[], vec![], vec![],
            Some(&[F, F, F, F])),
        make_embedded("stage-2", "ステージ 2", "まがってすすもう！",
            5, (0, 4, Right), (4, 0), &[], vec![], vec![],
            Some(&[F, F, F, F, L, F, F, F, F])),
        // ── Obstacles ──
        make_embedded("stage-3", "ステージ 3", "かべをさけてゴールへ！",
            5, (0, 4, Up), (4, 0), &[(0, 1), (0, 2)], vec![], vec![],
            Some(&[R, F, F, F, F, L, F, F, F, F])),
        make_embedded("stage-4", "ステージ 4", "じぶんでかんがえてゴールへすすもう！",
            5, (0, 2, Right), (2, 0), &[(2, 2), (2, 1)], vec![], vec![],
            None),
        make_embedded("stage-5", "ステージ 5", "さいごのちょうせん！",
            5, (2, 4, Up), (4, 2), &[(2, 3), (2, 2)], vec![], vec![],
            None),
        make_embedded("stage-6", "ステージ 6", "かべだらけ！じぶんでみちをさがそう！",
            5, (0, 4, Up), (4, 0),
            &[(0, 3), (0, 2), (0, 1), (1, 0), (2, 0), (3, 0)],
            vec![], vec![],
            None),
        // ── Keys and doors ──
        make_embedded("stage-7", "ステージ 7", "かぎをひろって とびらをひらこう！",
            5, (0, 4, Right), (4, 0),
            &[
                (1, 0), (2, 0), (3, 0),
                (0, 1), (1, 1), (2, 1), (3, 1),
                (0, 2), (1, 2), (2, 2), (3, 2),
                (0, 3), (1, 3), (2, 3), (3, 3),
            ],
            vec![key(3, 4)],
            vec![locked_door(4, 2)],
            Some(&[F, F, F, P, F, L, F, U, O, F, F, F])),
        make_embedded("stage-8", "ステージ 8", "むずかしいぞ！かぎをひろって とびらをひらこう！",
            6, (0, 5, Right), (5, 0),
            &[
                (0, 0), (1, 0), (2, 0), (3, 0), (4, 0),
                (0, 1), (1, 1), (2, 1), (3, 1), (4, 1),
                (0, 2), (1, 2), (2, 2), (3, 2), (4, 2),
                (0, 3), (1, 3), (2, 3),
                (0, 4), (1, 4), (2, 4), (3, 4), (4, 4),
            ],
            vec![key(3, 3)],
            vec![locked_door(5, 1)],
            Some(&[
                F, F, F, F, F, L, F, F, L, F, F, P,
                R, R, F, F, L, F, U, O, F, F,
            ])),
    ]
}

#[allow(clippy::too_many_arguments)]
fn make_embedded(
    id: &str,
    name: &str,
    description: &str,
    grid_size: u32,
    start: (i32, i32, Direction),
    goal: (i32, i32),
    obstacles: &[(i32, i32)],
    items: Vec<Item>,
    doors: Vec<DoorDef>,
    suggested: Option<&[ActionKind]>,
) -> LevelDef {
    LevelDef {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        grid_size,
        start: StartDef { x: start.0, y: start.1, direction: start.2 },
        goal: Position::new(goal.0, goal.1),
        obstacles: obstacles.iter().map(|&(x, y)| Position::new(x, y)).collect(),
        items,
        doors,
        suggested_commands: suggested.map(|s| s.to_vec()),
    }
}
