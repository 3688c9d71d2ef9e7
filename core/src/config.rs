//! Explorer configuration (config.toml)
//!
//! Every field has a serde default, so a partial file (or none at all)
//! yields a working configuration. The default probe map targets the
//! Pitfall! cartridge on an Atari 2600.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::command::CommandKind;

/// Explorer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExplorerConfig {
    /// Search loop settings
    #[serde(default)]
    pub explore: ExploreConfig,
    /// Next-command probabilities
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Command duration table (machine cycles)
    #[serde(default)]
    pub durations: DurationTable,
    /// Memory probe addresses
    #[serde(default)]
    pub probes: ProbeMap,
    /// Session persistence
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploreConfig {
    /// Fixed RNG seed (random when unset)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Save and restore checkpoints at area transitions (default: true)
    #[serde(default = "default_true")]
    pub checkpoints: bool,
    /// Restarts without progress before the prune widens (default: 20)
    #[serde(default = "default_escalation_threshold")]
    pub escalation_threshold: u32,
    /// Score shown right after power-on (default: 2000)
    #[serde(default = "default_initial_score")]
    pub initial_score: u32,
    /// Position units per area (default: 10)
    #[serde(default = "default_area_span")]
    pub area_span: u32,
    /// Cycle of the seed move-start command (default: 500000)
    #[serde(default = "default_seed_cycle")]
    pub seed_cycle: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Probability of a no-op decision (default: 0.1)
    #[serde(default = "default_noop_chance")]
    pub noop: f64,
    /// Probability of starting to move when standing (default: 0.5)
    #[serde(default = "default_move_start_chance")]
    pub move_start: f64,
    /// Probability of stopping when moving (default: 0.1)
    #[serde(default = "default_move_stop_chance")]
    pub move_stop: f64,
}

/// Closed range `[min, min + span]` of machine cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRange {
    pub min: u64,
    pub span: u64,
}

impl DurationRange {
    pub const fn new(min: u64, span: u64) -> Self {
        Self { min, span }
    }

    /// Fixed duration with no random span.
    pub const fn fixed(cycles: u64) -> Self {
        Self::new(cycles, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationTable {
    /// Decision gap after move-start
    #[serde(default = "default_move_start")]
    pub move_start: DurationRange,
    /// Decision gap after move-stop
    #[serde(default = "default_move_stop")]
    pub move_stop: DurationRange,
    /// Decision gap after descend-start
    #[serde(default = "default_descend_start")]
    pub descend_start: DurationRange,
    /// Decision gap after ascend-start
    #[serde(default = "default_ascend_start")]
    pub ascend_start: DurationRange,
    /// Decision gap after a no-op
    #[serde(default = "default_noop")]
    pub noop: DurationRange,
    /// Delay before letting go of a rope
    #[serde(default = "default_rope_release")]
    pub rope_release: DurationRange,
    /// Extra delay before the first decision after a restart
    #[serde(default = "default_restart_jitter")]
    pub restart_jitter: DurationRange,
    /// How long ascend/descend presses are held before the forced release
    #[serde(default = "default_hold")]
    pub hold: u64,
}

impl DurationTable {
    /// Decision gap drawn after scheduling `kind`. Releases have none.
    pub fn for_kind(&self, kind: CommandKind) -> Option<DurationRange> {
        match kind {
            CommandKind::MoveStart => Some(self.move_start),
            CommandKind::MoveStop => Some(self.move_stop),
            CommandKind::DescendStart => Some(self.descend_start),
            CommandKind::AscendStart => Some(self.ascend_start),
            CommandKind::Noop => Some(self.noop),
            CommandKind::AscendEnd | CommandKind::DescendEnd => None,
        }
    }
}

/// Memory addresses the progress tracker reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeMap {
    /// Packed-BCD thousands/hundreds digits of the score
    #[serde(default = "default_score_high")]
    pub score_high: u16,
    /// Packed-BCD tens/units digits of the score
    #[serde(default = "default_score_low")]
    pub score_low: u16,
    /// Horizontal slice of the player inside the current screen
    #[serde(default = "default_offset")]
    pub offset: u16,
    /// Screen identifier; a change means an area transition
    #[serde(default = "default_screen")]
    pub screen: u16,
    /// Vertical player coordinate (larger is lower)
    #[serde(default = "default_vertical")]
    pub vertical: u16,
    /// Vertical value of the ground line; anything below is a fall
    #[serde(default = "default_ground_level")]
    pub ground_level: u8,
    /// Set to 1 while the player hangs from a rope
    #[serde(default = "default_rope_flag")]
    pub rope_flag: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Key the session record is stored under
    #[serde(default = "default_session_key")]
    pub session_key: String,
    /// Directory for the file store (platform data dir when unset)
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Directory the file store should use.
    pub fn resolve_dir(&self) -> Option<PathBuf> {
        self.dir.clone().or_else(|| data_dir().map(|d| d.join("sessions")))
    }
}

fn default_true() -> bool {
    true
}
fn default_escalation_threshold() -> u32 {
    20
}
fn default_initial_score() -> u32 {
    2000
}
fn default_area_span() -> u32 {
    10
}
fn default_seed_cycle() -> u64 {
    500_000
}

fn default_noop_chance() -> f64 {
    0.1
}
fn default_move_start_chance() -> f64 {
    0.5
}
fn default_move_stop_chance() -> f64 {
    0.1
}

fn default_move_start() -> DurationRange {
    DurationRange::new(50_000, 300_000)
}
fn default_move_stop() -> DurationRange {
    DurationRange::new(200_000, 1_000_000)
}
fn default_descend_start() -> DurationRange {
    DurationRange::new(200_000, 300_000)
}
fn default_ascend_start() -> DurationRange {
    DurationRange::new(700_000, 200_000)
}
fn default_noop() -> DurationRange {
    DurationRange::new(200_000, 3_000_000)
}
fn default_rope_release() -> DurationRange {
    DurationRange::new(200_000, 10_000_000)
}
fn default_restart_jitter() -> DurationRange {
    DurationRange::new(0, 500)
}
fn default_hold() -> u64 {
    50_000
}

fn default_score_high() -> u16 {
    0xd6
}
fn default_score_low() -> u16 {
    0xd7
}
fn default_offset() -> u16 {
    0x98
}
fn default_screen() -> u16 {
    0x81
}
fn default_vertical() -> u16 {
    0xe9
}
fn default_ground_level() -> u8 {
    32
}
fn default_rope_flag() -> u16 {
    0xea
}

fn default_session_key() -> String {
    "trailblazer-session".to_string()
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            seed: None,
            checkpoints: default_true(),
            escalation_threshold: default_escalation_threshold(),
            initial_score: default_initial_score(),
            area_span: default_area_span(),
            seed_cycle: default_seed_cycle(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            noop: default_noop_chance(),
            move_start: default_move_start_chance(),
            move_stop: default_move_stop_chance(),
        }
    }
}

impl Default for DurationTable {
    fn default() -> Self {
        Self {
            move_start: default_move_start(),
            move_stop: default_move_stop(),
            descend_start: default_descend_start(),
            ascend_start: default_ascend_start(),
            noop: default_noop(),
            rope_release: default_rope_release(),
            restart_jitter: default_restart_jitter(),
            hold: default_hold(),
        }
    }
}

impl Default for ProbeMap {
    fn default() -> Self {
        Self {
            score_high: default_score_high(),
            score_low: default_score_low(),
            offset: default_offset(),
            screen: default_screen(),
            vertical: default_vertical(),
            ground_level: default_ground_level(),
            rope_flag: default_rope_flag(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            session_key: default_session_key(),
            dir: None,
        }
    }
}

/// Error reading an explicit configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Returns the platform-specific configuration directory.
///
/// On Linux: `~/.config/Trailblazer`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.trailblazer", "", "Trailblazer")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory.
///
/// On Linux: `~/.local/share/Trailblazer`
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.trailblazer", "", "Trailblazer")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Loads `config.toml` from the platform config directory.
///
/// Returns defaults if the file doesn't exist or cannot be parsed.
pub fn load() -> ExplorerConfig {
    let Some(path) = config_dir().map(|dir| dir.join("config.toml")) else {
        return ExplorerConfig::default();
    };
    if !path.exists() {
        return ExplorerConfig::default();
    }
    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{}; using default configuration", e);
            ExplorerConfig::default()
        }
    }
}

/// Loads a configuration file from an explicit path.
pub fn load_from(path: &Path) -> Result<ExplorerConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Saves the configuration to the platform config directory.
pub fn save(config: &ExplorerConfig) -> std::io::Result<()> {
    if let Some(dir) = config_dir() {
        std::fs::create_dir_all(&dir)?;
        let content = toml::to_string_pretty(config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(dir.join("config.toml"), content)?;
    }
    Ok(())
}
