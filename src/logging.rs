use crate::error::Result;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Route `log` output to `path`. The terminal is in raw mode on the alternate
/// screen, so nothing may go to stderr.
///
/// Defaults to `warn`; `RUST_LOG` overrides.
pub fn init(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .target(Target::Pipe(Box::new(file)));

    if builder.try_init().is_err() {
        log::debug!("logger already initialised");
    }
    Ok(())
}
