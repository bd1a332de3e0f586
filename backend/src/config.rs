//! Runtime configuration.
//!
//! Read from the environment (a `.env` file is loaded by the binary first).
//! CLI flags override what is read here.

use std::env;

use crate::source::TextSource;
use crate::transform::pipeline::NormalizeOptions;

/// Port the HTTP server listens on when nothing else is configured.
pub const DEFAULT_PORT: u16 = 3000;

pub const PORT_VAR: &str = "PULSEBOARD_PORT";
pub const SOURCE_VAR: &str = "PULSEBOARD_SOURCE";
pub const SEED_VAR: &str = "PULSEBOARD_SEED";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    /// Loaded at startup and on every reload. `None` keeps the built-in set.
    pub source: Option<TextSource>,
    /// Seed for synthesized trend points of custom loads.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            source: None,
            seed: None,
        }
    }
}

impl Config {
    /// Read the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            port: value(PORT_VAR)
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            source: value(SOURCE_VAR).map(|v| TextSource::parse(&v)),
            seed: value(SEED_VAR).and_then(|v| v.parse().ok()),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_source(mut self, source: TextSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            seed: self.seed,
            ..NormalizeOptions::default()
        }
    }
}
