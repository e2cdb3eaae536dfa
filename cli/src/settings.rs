use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tilematch_core::EngineTiming;

/// Host settings: built-in defaults, then the TOML file, then command-line flags.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Grid definition to play
    pub grid: PathBuf,
    /// Where the leaderboard and result log are kept
    pub data_dir: PathBuf,
    pub settle_ms: u64,
    pub cooldown_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid: PathBuf::from("GameConfig.json"),
            data_dir: PathBuf::from("."),
            settle_ms: EngineTiming::DEFAULT_SETTLE.as_millis() as u64,
            cooldown_ms: EngineTiming::DEFAULT_COOLDOWN.as_millis() as u64,
        }
    }
}

/// Flags that win over the settings file.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct Overrides {
    /// Grid definition to use
    #[arg(long, global = true)]
    pub grid: Option<PathBuf>,

    /// Directory holding the leaderboard and result log
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// How long a revealed pair stays up before it is resolved
    #[arg(long, global = true, value_name = "MS")]
    pub settle_ms: Option<u64>,

    /// Pause after a resolution before the next selection
    #[arg(long, global = true, value_name = "MS")]
    pub cooldown_ms: Option<u64>,
}

impl Settings {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Defaults, or the given file on top of them.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings = Self::from_toml(&text)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        log::debug!("settings loaded from {}", path.display());
        Ok(settings)
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(grid) = &overrides.grid {
            self.grid = grid.clone();
        }
        if let Some(data_dir) = &overrides.data_dir {
            self.data_dir = data_dir.clone();
        }
        if let Some(settle_ms) = overrides.settle_ms {
            self.settle_ms = settle_ms;
        }
        if let Some(cooldown_ms) = overrides.cooldown_ms {
            self.cooldown_ms = cooldown_ms;
        }
    }

    pub fn timing(&self) -> EngineTiming {
        EngineTiming::new(
            Duration::from_millis(self.settle_ms),
            Duration::from_millis(self.cooldown_ms),
        )
    }
}
