//! Application context that holds resolved configuration
//!
//! The context is built following the precedence order:
//! 1. Default values
//! 2. Config file values
//! 3. Environment variables
//! 4. CLI flags
//!
//! Once built, the context is passed as read-only throughout the application.

use libscanner::config::ColorChoice;
use libscanner::{Config, Result};
use log::LevelFilter;
use std::env;
use std::path::Path;

/// Environment variable overriding the configured color choice
pub const COLOR_ENV: &str = "UBLUE_SCANNER_COLOR";

/// How chatty the CLI is, from the number of `-v` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    #[default]
    Normal,
    Verbose,
    VeryVerbose,
    Trace,
}

impl VerbosityLevel {
    /// Maps a `-v` count to a level
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::VeryVerbose,
            _ => Self::Trace,
        }
    }

    /// Log level used when `RUST_LOG` is not set
    pub fn log_level(self) -> LevelFilter {
        match self {
            Self::Normal => LevelFilter::Warn,
            Self::Verbose => LevelFilter::Info,
            Self::VeryVerbose => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

/// Application context with resolved configuration and runtime state
#[derive(Debug)]
pub struct AppContext {
    /// Resolved configuration
    pub config: Config,
    /// Effective color choice
    pub color: ColorChoice,
    /// Effective verbosity
    pub verbosity: VerbosityLevel,
}

impl AppContext {
    /// Build context with precedence: defaults > config file > env vars > CLI flags
    ///
    /// Fails if the config file is missing or unreadable.
    pub fn build(
        cli_color: Option<ColorChoice>,
        verbosity: VerbosityLevel,
        config_path: Option<&Path>,
    ) -> Result<Self> {
        // 1 and 2. Defaults merged with the config file, if any
        let config = Config::load(config_path)?;

        Ok(Self::from_config(config, cli_color, verbosity))
    }

    /// Applies environment and CLI overrides to an already loaded config
    pub fn from_config(
        config: Config,
        cli_color: Option<ColorChoice>,
        verbosity: VerbosityLevel,
    ) -> Self {
        let mut color = config.output.color;

        // 3. Environment variable overrides
        if let Ok(value) = env::var(COLOR_ENV) {
            color = ColorChoice::from(value.as_str());
        }

        // 4. CLI flag overrides (highest priority)
        if let Some(choice) = cli_color {
            color = choice;
        }

        Self {
            config,
            color,
            verbosity,
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
