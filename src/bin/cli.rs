use std::env;
use std::ffi::OsString;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

#[macro_use]
extern crate log;

use anyhow::{bail, Context, Result};

use libpt2times::configuration::AppConfig;
use libpt2times::logging::setup_logger;
use libpt2times::{extract_file, extract_timestamps, ExtractConfig};

/// Asserts that the argument list to our software was given according to the
/// usage: either nothing, or a single path to a PT2 file.
fn validate_and_parse_args(args: &[OsString]) -> Result<Option<PathBuf>> {
    match args {
        [] => Ok(None),
        [path] => {
            let path = PathBuf::from(path);
            if !path.is_file() {
                bail!("Given file not found: {}", path.display());
            }
            Ok(Some(path))
        }
        _ => bail!("Usage: pt2times [FILE.pt2] (got {} arguments)", args.len()),
    }
}

/// Converts the given file into `<file>.times`, or stdin into stdout if no
/// file was given
fn main() -> Result<()> {
    let app_config = AppConfig::load()?;
    setup_logger(&app_config)?;
    info!("Logger initialized successfully, starting pt2times");
    let args: Vec<OsString> = env::args_os().skip(1).collect();
    let input = validate_and_parse_args(&args)?;
    let extract_config = ExtractConfig::default();
    match input {
        Some(path) => {
            let (output, summary) = extract_file(&path, &extract_config)
                .with_context(|| format!("Failed to convert {}", path.display()))?;
            info!("Done writing {}: {:?}", output.display(), summary);
        }
        None => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            let summary = extract_timestamps(
                BufReader::new(stdin.lock()),
                BufWriter::new(stdout.lock()),
                &extract_config,
            )
            .context("Failed to convert the standard input")?;
            info!("Done: {:?}", summary);
        }
    }
    Ok(())
}
