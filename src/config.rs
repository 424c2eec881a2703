/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD or the
/// data directories. Falls back to defaults if the file is missing,
/// incomplete or unparsable.

use log::{info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::sim::commands::Difficulty;

const APP_DIR: &str = "kana-grid";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub play: PlayConfig,
    pub levels_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub move_duration_ms: u64,
    pub turn_duration_ms: u64,
    /// Pause between finishing a word and running its action.
    pub confirm_delay_ms: u64,
    pub wrong_flash_ms: u64,
    pub correct_flash_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayConfig {
    pub difficulty: Difficulty,
    pub show_guide: bool,
    pub sound: bool,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    play: TomlPlay,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_move_duration")]
    move_duration_ms: u64,
    #[serde(default = "default_turn_duration")]
    turn_duration_ms: u64,
    #[serde(default = "default_confirm_delay")]
    confirm_delay_ms: u64,
    #[serde(default = "default_wrong_flash")]
    wrong_flash_ms: u64,
    #[serde(default = "default_correct_flash")]
    correct_flash_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlPlay {
    #[serde(default)]
    difficulty: Difficulty,
    #[serde(default = "default_true")]
    show_guide: bool,
    #[serde(default = "default_true")]
    sound: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }
fn default_move_duration() -> u64 { 250 }
fn default_turn_duration() -> u64 { 150 }
fn default_confirm_delay() -> u64 { 300 }
fn default_wrong_flash() -> u64 { 300 }
fn default_correct_flash() -> u64 { 150 }
fn default_true() -> bool { true }
fn default_levels_dir() -> String { "levels".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            move_duration_ms: default_move_duration(),
            turn_duration_ms: default_turn_duration(),
            confirm_delay_ms: default_confirm_delay(),
            wrong_flash_ms: default_wrong_flash(),
            correct_flash_ms: default_correct_flash(),
        }
    }
}

impl Default for TomlPlay {
    fn default() -> Self {
        TomlPlay {
            difficulty: Difficulty::default(),
            show_guide: true,
            sound: true,
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Missing file or missing keys fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, &search_dirs)
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let levels_dir = resolve_levels_dir(&toml_cfg.general.levels_dir, search_dirs);
        GameConfig {
            timing: TimingConfig {
                // a zero tick would spin the main loop
                tick_rate_ms: toml_cfg.timing.tick_rate_ms.max(1),
                move_duration_ms: toml_cfg.timing.move_duration_ms,
                turn_duration_ms: toml_cfg.timing.turn_duration_ms,
                confirm_delay_ms: toml_cfg.timing.confirm_delay_ms,
                wrong_flash_ms: toml_cfg.timing.wrong_flash_ms,
                correct_flash_ms: toml_cfg.timing.correct_flash_ms,
            },
            play: PlayConfig {
                difficulty: toml_cfg.play.difficulty,
                show_guide: toml_cfg.play.show_guide,
                sound: toml_cfg.play.sound,
            },
            levels_dir,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), &[])
    }
}

/// Absolute paths are taken as is. Relative ones resolve against the first
/// search directory that contains them, else against the CWD.
fn resolve_levels_dir(levels_dir: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = Path::new(levels_dir);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs
        .iter()
        .map(|d| d.join(path))
        .find(|p| p.is_dir())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so an installed link still finds data next to
        // the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share").join(APP_DIR);
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share").join(APP_DIR);
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    // 5. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => {
                    info!("config loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    warn!("{}: parse error, using defaults: {e}", path.display());
                    return TomlConfig::default();
                }
            },
            Err(e) => warn!("could not read {}: {e}", path.display()),
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> GameConfig {
        let cfg: TomlConfig = toml::from_str(text).unwrap();
        GameConfig::from_toml(cfg, &[])
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = parse("");
        assert_eq!(cfg.timing, GameConfig::default().timing);
        assert_eq!(cfg.timing.move_duration_ms, 250);
        assert_eq!(cfg.timing.turn_duration_ms, 150);
        assert_eq!(cfg.timing.confirm_delay_ms, 300);
        assert_eq!(cfg.play.difficulty, Difficulty::Easy);
        assert!(cfg.play.show_guide);
        assert!(cfg.play.sound);
        assert_eq!(cfg.levels_dir, PathBuf::from("levels"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = parse(
            r#"
            [timing]
            move_duration_ms = 400

            [play]
            difficulty = "hard"
            sound = false
            "#,
        );
        assert_eq!(cfg.timing.move_duration_ms, 400);
        assert_eq!(cfg.timing.turn_duration_ms, 150);
        assert_eq!(cfg.play.difficulty, Difficulty::Hard);
        assert!(!cfg.play.sound);
        assert!(cfg.play.show_guide);
    }

    #[test]
    fn zero_tick_is_clamped() {
        assert_eq!(parse("[timing]\ntick_rate_ms = 0").timing.tick_rate_ms, 1);
    }

    #[test]
    fn unknown_difficulty_is_a_parse_error() {
        assert!(toml::from_str::<TomlConfig>("[play]\ndifficulty = \"extreme\"").is_err());
    }

    #[test]
    fn absolute_levels_dir_is_kept() {
        let cfg = parse("[general]\nlevels_dir = \"/opt/kana/levels\"");
        assert_eq!(cfg.levels_dir, PathBuf::from("/opt/kana/levels"));
    }
}
