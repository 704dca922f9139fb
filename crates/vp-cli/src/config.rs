//! Configuration loading and management.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Duration;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use vp_core::{PipelineConfig, ReconstructConfig, UserId};

/// Author id of the relay bot whose messages mirror voice activity.
pub const DEFAULT_RELAY_AUTHOR_ID: u64 = 641_596_449_355_726_858;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Only messages posted by this author are classified.
    pub relay_author_id: u64,

    /// Intervals must last strictly longer than this many seconds.
    pub min_duration_secs: i64,

    /// Joins open for longer than this at window end are discarded.
    pub stale_after_hours: i64,

    /// Display names for the timeline, keyed by user id.
    #[serde(default)]
    pub names: BTreeMap<String, String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("relay_author_id", &self.relay_author_id)
            .field("min_duration_secs", &self.min_duration_secs)
            .field("stale_after_hours", &self.stale_after_hours)
            .field("names", &self.names.len())
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relay_author_id: DEFAULT_RELAY_AUTHOR_ID,
            min_duration_secs: 600,
            stale_after_hours: 12,
            names: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations, then optionally from a
    /// specific file, then the environment.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (VP_*)
        figment = figment.merge(Env::prefixed("VP_"));

        figment.extract()
    }

    /// Builds the pipeline configuration, with an optional override of the
    /// minimum duration in seconds.
    pub fn pipeline(&self, min_duration_secs: Option<i64>) -> Result<PipelineConfig> {
        let min_secs = min_duration_secs.unwrap_or(self.min_duration_secs);
        let min_duration = Duration::try_seconds(min_secs)
            .with_context(|| format!("minimum duration out of range: {min_secs}s"))?;
        let stale_after = Duration::try_hours(self.stale_after_hours).with_context(|| {
            format!("stale_after_hours out of range: {}h", self.stale_after_hours)
        })?;

        Ok(PipelineConfig {
            min_duration,
            reconstruct: ReconstructConfig { stale_after },
        })
    }

    /// Looks up the display name configured for `who`.
    pub fn display_name(&self, who: UserId) -> Option<&str> {
        self.names.get(&who.to_string()).map(String::as_str)
    }
}

/// Returns the platform-specific config directory for vp.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("vp"))
}
