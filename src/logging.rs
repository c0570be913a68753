//! Logger setup.
//!
//! Standard output may carry the extracted timestamps, so logs go to stderr
//! and, optionally, to a file.

use anyhow::{Context, Result};
use log::LevelFilter;

use crate::configuration::AppConfig;

/// Installs the global logger according to the app's config. Can only be
/// called once per process.
pub fn setup_logger(config: &AppConfig) -> Result<()> {
    let level: LevelFilter = config.log_level.into();
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());
    if let Some(log_file) = &config.log_file {
        let file = fern::log_file(log_file)
            .with_context(|| format!("Failed to open log file {}", log_file.display()))?;
        dispatch = dispatch.chain(file);
    }
    dispatch
        .apply()
        .context("A logger was already installed")?;
    Ok(())
}
