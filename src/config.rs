use crate::app_dirs::AppDirs;
use crate::language::{Difficulty, Language};
use crate::session::{SessionConfig, TestMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Test durations offered in the settings page, in seconds
pub const DURATION_PRESETS: [u64; 5] = [15, 30, 60, 120, 300];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub language: Language,
    pub difficulty: Difficulty,
    pub timed: bool,
    pub duration_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: Language::English,
            difficulty: Difficulty::Medium,
            timed: true,
            duration_secs: 60,
        }
    }
}

impl Config {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            mode: if self.timed {
                TestMode::Timed {
                    duration_secs: self.duration_secs,
                }
            } else {
                TestMode::Free
            },
            language: self.language,
            difficulty: self.difficulty,
        }
    }

    /// Durations outside the presets fall back to the default.
    fn sanitized(mut self) -> Self {
        if !DURATION_PRESETS.contains(&self.duration_secs) {
            log::warn!("ignoring unsupported duration {}s", self.duration_secs);
            self.duration_secs = Config::default().duration_secs;
        }
        self
    }

    pub fn next_duration(&self) -> u64 {
        step_preset(self.duration_secs, 1)
    }

    pub fn previous_duration(&self) -> u64 {
        step_preset(self.duration_secs, DURATION_PRESETS.len() - 1)
    }
}

fn step_preset(current: u64, by: usize) -> u64 {
    let idx = DURATION_PRESETS
        .iter()
        .position(|d| *d == current)
        .unwrap_or(2);
    DURATION_PRESETS[(idx + by) % DURATION_PRESETS.len()]
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> crate::error::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("keyrate_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg.sanitized(),
            Err(e) => {
                log::warn!("ignoring unreadable config {}: {e}", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> crate::error::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
