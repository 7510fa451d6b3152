/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};

use crate::sim::controller::Delays;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
    pub start_level: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub roll_ms: u64,          // busy window while a roll animates
    pub explode_delay_ms: u64, // Exploded → same level
    pub finish_delay_ms: u64,  // Finished → next level
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GamepadConfig {
    pub restart: Vec<String>,
    pub skip: Vec<String>,
    pub cancel: Vec<String>,
}

impl TimingConfig {
    pub fn delays(&self) -> Delays {
        Delays {
            explode: Duration::from_millis(self.explode_delay_ms),
            finish: Duration::from_millis(self.finish_delay_ms),
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn roll_duration(&self) -> Duration {
        Duration::from_millis(self.roll_ms)
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_roll")]
    roll_ms: u64,
    #[serde(default = "default_explode_delay")]
    explode_delay_ms: u64,
    #[serde(default = "default_finish_delay")]
    finish_delay_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_skip")]
    skip: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default)]
    start_level: usize,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }
fn default_roll() -> u64 { 180 }
fn default_explode_delay() -> u64 { 1200 }
fn default_finish_delay() -> u64 { 700 }

fn default_restart() -> Vec<String> { vec!["Start".into()] }
fn default_skip() -> Vec<String> { vec!["R1".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_levels_dir() -> String { "levels".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            roll_ms: default_roll(),
            explode_delay_ms: default_explode_delay(),
            finish_delay_ms: default_finish_delay(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            restart: default_restart(),
            skip: default_skip(),
            cancel: default_cancel(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            start_level: 0,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/blockroll`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    /// Parse config text directly (no file search).
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::resolve(toml_cfg, &[]))
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve levels directory
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if Path::new(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        let t = toml_cfg.timing;
        GameConfig {
            timing: TimingConfig {
                tick_rate_ms: t.tick_rate_ms.max(1),
                roll_ms: t.roll_ms,
                explode_delay_ms: t.explode_delay_ms,
                finish_delay_ms: t.finish_delay_ms,
            },
            gamepad: GamepadConfig {
                restart: toml_cfg.gamepad.restart,
                skip: toml_cfg.gamepad.skip,
                cancel: toml_cfg.gamepad.cancel,
            },
            levels_dir,
            start_level: toml_cfg.general.start_level,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::resolve(TomlConfig::default(), &[])
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
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

    // 3. XDG data home (~/.local/share/blockroll)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/blockroll");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        debug!("using {}", path.display());
                        return cfg;
                    }
                    Err(e) => {
                        warn!("{} parse error: {e}; using default settings", path.display());
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.timing, TimingConfig {
            tick_rate_ms: 16,
            roll_ms: 180,
            explode_delay_ms: 1200,
            finish_delay_ms: 700,
        });
        assert_eq!(cfg.levels_dir, PathBuf::from("levels"));
        assert_eq!(cfg.start_level, 0);
        assert_eq!(cfg.gamepad.skip, vec!["R1".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[timing]\nexplode_delay_ms = 2000\n[general]\nstart_level = 2\n",
        ).unwrap();
        assert_eq!(cfg.timing.explode_delay_ms, 2000);
        assert_eq!(cfg.timing.finish_delay_ms, 700);
        assert_eq!(cfg.start_level, 2);
        assert_eq!(cfg.timing.delays(), Delays {
            explode: Duration::from_millis(2000),
            finish: Duration::from_millis(700),
        });
    }

    #[test]
    fn finish_delay_is_shorter_by_default() {
        let d = GameConfig::default().timing.delays();
        assert!(d.finish < d.explode);
        assert_eq!(d, Delays::default());
    }

    #[test]
    fn zero_tick_rate_is_clamped() {
        let cfg = GameConfig::from_toml_str("[timing]\ntick_rate_ms = 0\n").unwrap();
        assert_eq!(cfg.timing.tick_rate(), Duration::from_millis(1));
    }

    #[test]
    fn bad_types_are_errors() {
        assert!(GameConfig::from_toml_str("[timing]\nroll_ms = \"fast\"\n").is_err());
    }
}
