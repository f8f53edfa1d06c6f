//! # Application Configuration
//!
//! TOML configuration loaded once at startup: which texture groups
//! exist, how their pools are sized, and how hard the demo churns them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stampede_core::{GroupConfig, LifetimeRange, SchedulerConfig};

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One texture group in the config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Display name, used in logs only.
    pub name: String,
    /// Backend texture id the group binds.
    pub texture: u32,
    /// Atlas grid columns.
    #[serde(default = "one")]
    pub cols: u32,
    /// Atlas grid rows.
    #[serde(default = "one")]
    pub rows: u32,
    /// Pool sizing and lifetime policy.
    #[serde(flatten)]
    pub pool: GroupConfig,
    /// Bodies spawned up front.
    #[serde(default)]
    pub initial_burst: usize,
    /// Bodies spawned and despawned per frame to keep churn going.
    #[serde(default)]
    pub churn_per_frame: usize,
    /// Whether spawned bodies play the default flipbook clip.
    #[serde(default)]
    pub animated: bool,
}

const fn one() -> u32 {
    1
}

/// Top-level demo configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StampedeConfig {
    /// Seed for all deterministic rngs.
    #[serde(default)]
    pub seed: u64,
    /// Frames the demo runs.
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Fixed timestep in seconds.
    #[serde(default = "default_dt")]
    pub dt: f32,
    /// Scheduler tunables.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// The texture groups.
    pub groups: Vec<GroupSpec>,
}

const fn default_frames() -> u32 {
    600
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

impl StampedeConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// `ConfigError` if the file cannot be read or parsed.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

impl Default for StampedeConfig {
    /// Two groups in the spirit of the classic demo scene: one immortal
    /// group under steady churn and one short-lived animated group.
    fn default() -> Self {
        Self {
            seed: 0,
            frames: default_frames(),
            dt: default_dt(),
            scheduler: SchedulerConfig::default(),
            groups: vec![
                GroupSpec {
                    name: "crowd".to_string(),
                    texture: 0,
                    cols: 4,
                    rows: 4,
                    pool: GroupConfig::default(),
                    initial_burst: 1000,
                    churn_per_frame: 25,
                    animated: false,
                },
                GroupSpec {
                    name: "sparks".to_string(),
                    texture: 1,
                    cols: 4,
                    rows: 1,
                    pool: GroupConfig {
                        initial_capacity: 1024,
                        lifetime: Some(LifetimeRange::new(1.0, 3.0)),
                    },
                    initial_burst: 200,
                    churn_per_frame: 40,
                    animated: true,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_round_trip() {
        let toml_text = r#"
            [[groups]]
            name = "crowd"
            texture = 3
            cols = 2
            rows = 2
            initial_capacity = 64
            initial_burst = 10
        "#;
        let config: StampedeConfig = toml::from_str(toml_text).unwrap();
        assert_eq!(config.frames, 600);
        assert_eq!(config.groups.len(), 1);
        let group = &config.groups[0];
        assert_eq!(group.texture, 3);
        assert_eq!(group.pool.initial_capacity, 64);
        assert_eq!(group.pool.lifetime, None);
        assert_eq!(group.churn_per_frame, 0);
    }

    #[test]
    fn test_lifetime_range_in_toml() {
        let toml_text = r#"
            [[groups]]
            name = "sparks"
            texture = 0
            [groups.lifetime]
            min_secs = 1.0
            max_secs = 15.0
        "#;
        let config: StampedeConfig = toml::from_str(toml_text).unwrap();
        assert_eq!(
            config.groups[0].pool.lifetime,
            Some(LifetimeRange::new(1.0, 15.0))
        );
    }

    #[test]
    fn test_default_config_is_usable() {
        let config = StampedeConfig::default();
        assert_eq!(config.groups.len(), 2);
        assert!(config.groups.iter().any(|g| g.pool.lifetime.is_some()));
    }
}
