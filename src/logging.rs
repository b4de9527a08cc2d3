//! Logger setup and debug-build-only tracing macros.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

/// Default filter for `-v` count. `RUST_LOG` still overrides it.
#[must_use]
pub fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Install the global logger, appending to `log_file` when one is given.
pub fn init(verbose: u8, log_file: Option<&Path>) -> io::Result<()> {
    let mut builder = Builder::new();
    builder.filter_level(level_for(verbose)).parse_default_env();

    if let Some(path) = log_file {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    // A second init (tests) keeps the first logger.
    let _ = builder.try_init();
    Ok(())
}

// Conditional logging macros - only active in debug builds

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0), LevelFilter::Warn);
        assert_eq!(level_for(1), LevelFilter::Info);
        assert_eq!(level_for(5), LevelFilter::Debug);
    }

    #[test]
    fn test_init_creates_log_file() {
        let dir = std::env::temp_dir().join(format!("wordle-client-log-{}", std::process::id()));
        let path = dir.join("nested").join("client.log");
        init(1, Some(&path)).unwrap();
        assert!(path.exists());
    }
}
