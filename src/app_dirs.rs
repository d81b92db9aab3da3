use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "keyrate";

/// Where keyrate keeps its files
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    /// `config.json` in the platform config directory
    pub fn config_path() -> Option<PathBuf> {
        Self::project().map(|pd| pd.config_dir().join("config.json"))
    }

    /// `~/.local/state/keyrate/keyrate.log`, or the local data dir without `$HOME`
    pub fn log_path() -> Option<PathBuf> {
        let log_file = format!("{APP_NAME}.log");
        match std::env::var_os("HOME") {
            Some(home) => Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME)
                    .join(log_file),
            ),
            None => Self::project().map(|pd| pd.data_local_dir().join(log_file)),
        }
    }
}
