/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, then the CWD.
/// Missing files and missing keys fall back to defaults. Problems are
/// collected in `warnings` so they can be logged once tracing is up
/// (the log file path itself comes from this config).

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::collision::Radii;
use crate::domain::outcome::FreezePolicy;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub general: GeneralConfig,
    pub tuning: Tuning,
    pub rules: Rules,
    pub audio: AudioConfig,
    pub keys: KeyConfig,
    pub gamepad: GamepadConfig,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    /// Layout file to load instead of the built-in room.
    pub scene: Option<PathBuf>,
    pub frame_ms: u64,
    pub log_file: PathBuf,
}

/// Movement speed and every interaction radius.
#[derive(Clone, Copy, Debug)]
pub struct Tuning {
    pub player_speed: f32,
    pub radii: Radii,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning { player_speed: default_player_speed(), radii: Radii::default() }
    }
}

/// Who did it, which recording gives it away, and when play stops.
#[derive(Clone, Copy, Debug)]
pub struct Rules {
    pub culprit: usize,
    pub crime_recording: usize,
    pub freeze: FreezePolicy,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            culprit: default_culprit(),
            crime_recording: default_crime_recording(),
            freeze: FreezePolicy::default(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AudioConfig {
    pub ambience_volume: f32,
    pub ambience_pitch: f32,
}

/// Key names per control, e.g. `"Left"`, `"a"`, `"Space"`.
#[derive(Clone, Debug)]
pub struct KeyConfig {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub arrest: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub arrest: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    tuning: TomlTuning,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    audio: TomlAudio,
    #[serde(default)]
    keys: TomlKeys,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    scene: Option<String>,
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_log_file")]
    log_file: String,
}

#[derive(Deserialize, Debug)]
struct TomlTuning {
    #[serde(default = "default_player_speed")]
    player_speed: f32,
    #[serde(default = "default_player_radius")]
    player_radius: f32,
    #[serde(default = "default_suspect_radius")]
    suspect_radius: f32,
    #[serde(default = "default_speak_radius")]
    suspect_speak_radius: f32,
    #[serde(default = "default_evidence_radius")]
    evidence_radius: f32,
    #[serde(default = "default_play_radius")]
    recording_play_radius: f32,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_culprit")]
    culprit: usize,
    #[serde(default = "default_crime_recording")]
    crime_recording: usize,
    #[serde(default)]
    freeze: FreezePolicy,
}

#[derive(Deserialize, Debug)]
struct TomlAudio {
    #[serde(default = "default_ambience_volume")]
    ambience_volume: f32,
    #[serde(default = "default_ambience_pitch")]
    ambience_pitch: f32,
}

#[derive(Deserialize, Debug)]
struct TomlKeys {
    #[serde(default = "default_key_left")]
    left: Vec<String>,
    #[serde(default = "default_key_right")]
    right: Vec<String>,
    #[serde(default = "default_key_up")]
    up: Vec<String>,
    #[serde(default = "default_key_down")]
    down: Vec<String>,
    #[serde(default = "default_key_arrest")]
    arrest: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_arrest")]
    arrest: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_frame_ms() -> u64 { 16 }
fn default_log_file() -> String { "whodunit.log".into() }

fn default_player_speed() -> f32 { 10.0 }
fn default_player_radius() -> f32 { 0.5 }
fn default_suspect_radius() -> f32 { 0.5 }
fn default_speak_radius() -> f32 { 1.3 }   // must exceed player + suspect radius or nobody is arrestable
fn default_evidence_radius() -> f32 { 0.25 }
fn default_play_radius() -> f32 { 1.0 }

fn default_culprit() -> usize { 2 }
fn default_crime_recording() -> usize { 4 }

fn default_ambience_volume() -> f32 { 0.4 }
fn default_ambience_pitch() -> f32 { 1.0 }

fn default_key_left() -> Vec<String> { vec!["Left".into(), "a".into()] }
fn default_key_right() -> Vec<String> { vec!["Right".into(), "d".into()] }
fn default_key_up() -> Vec<String> { vec!["Up".into(), "w".into()] }
fn default_key_down() -> Vec<String> { vec!["Down".into(), "s".into()] }
fn default_key_arrest() -> Vec<String> { vec!["Space".into()] }

fn default_pad_arrest() -> Vec<String> { vec!["A".into(), "X".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            scene: None,
            frame_ms: default_frame_ms(),
            log_file: default_log_file(),
        }
    }
}

impl Default for TomlTuning {
    fn default() -> Self {
        TomlTuning {
            player_speed: default_player_speed(),
            player_radius: default_player_radius(),
            suspect_radius: default_suspect_radius(),
            suspect_speak_radius: default_speak_radius(),
            evidence_radius: default_evidence_radius(),
            recording_play_radius: default_play_radius(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            culprit: default_culprit(),
            crime_recording: default_crime_recording(),
            freeze: FreezePolicy::default(),
        }
    }
}

impl Default for TomlAudio {
    fn default() -> Self {
        TomlAudio {
            ambience_volume: default_ambience_volume(),
            ambience_pitch: default_ambience_pitch(),
        }
    }
}

impl Default for TomlKeys {
    fn default() -> Self {
        TomlKeys {
            left: default_key_left(),
            right: default_key_right(),
            up: default_key_up(),
            down: default_key_down(),
            arrest: default_key_arrest(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            arrest: default_pad_arrest(),
            quit: default_pad_quit(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = vec![];
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        let mut cfg = GameConfig::from_toml(toml_cfg, &search_dirs);
        cfg.warnings = warnings;
        cfg
    }

    /// Parse config text directly. Errors fall back to defaults with a warning.
    pub fn parse(text: &str) -> Self {
        let mut warnings = vec![];
        let toml_cfg = parse_toml(text, Path::new("config.toml"), &mut warnings);
        let mut cfg = GameConfig::from_toml(toml_cfg, &[]);
        cfg.warnings = warnings;
        cfg
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Relative scene paths resolve against the first directory that has them.
        let scene = toml_cfg.general.scene.map(|s| {
            let path = PathBuf::from(&s);
            if path.is_absolute() {
                return path;
            }
            search_dirs.iter()
                .map(|d| d.join(&s))
                .find(|p| p.is_file())
                .unwrap_or(path)
        });

        let t = toml_cfg.tuning;
        GameConfig {
            general: GeneralConfig {
                scene,
                frame_ms: toml_cfg.general.frame_ms.max(1),
                log_file: PathBuf::from(toml_cfg.general.log_file),
            },
            tuning: Tuning {
                player_speed: t.player_speed,
                radii: Radii {
                    player: t.player_radius,
                    suspect: t.suspect_radius,
                    suspect_speak: t.suspect_speak_radius,
                    evidence: t.evidence_radius,
                    recording_play: t.recording_play_radius,
                },
            },
            rules: Rules {
                culprit: toml_cfg.rules.culprit,
                crime_recording: toml_cfg.rules.crime_recording,
                freeze: toml_cfg.rules.freeze,
            },
            audio: AudioConfig {
                ambience_volume: toml_cfg.audio.ambience_volume,
                ambience_pitch: toml_cfg.audio.ambience_pitch,
            },
            keys: KeyConfig {
                left: toml_cfg.keys.left,
                right: toml_cfg.keys.right,
                up: toml_cfg.keys.up,
                down: toml_cfg.keys.down,
                arrest: toml_cfg.keys.arrest,
            },
            gamepad: GamepadConfig {
                arrest: toml_cfg.gamepad.arrest,
                quit: toml_cfg.gamepad.quit,
            },
            warnings: vec![],
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() { continue; }
        match std::fs::read_to_string(&path) {
            Ok(text) => return parse_toml(&text, &path, warnings),
            Err(e) => warnings.push(format!("could not read {}: {e}", path.display())),
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str, path: &Path, warnings: &mut Vec<String>) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warnings.push(format!("{} parse error, using defaults: {e}", path.display()));
            TomlConfig::default()
        }
    }
}
