//! Client configuration and validation.
//!
//! [`ClientConfig`] is plain data with sensible defaults.
//! [`validate()`](ClientConfig::validate) checks it once, when a
//! [`GribJump`](crate::GribJump) handle is constructed.

use thiserror::Error;

/// Coarsest axes specificity level.
pub const MIN_AXES_LEVEL: u32 = 1;

/// Finest axes specificity level.
pub const MAX_AXES_LEVEL: u32 = 3;

/// Environment variable that disables grid-hash checks when truthy.
pub const ENV_IGNORE_GRID: &str = "GRIBJUMP_IGNORE_GRID";

/// Environment variable overriding the default axes level.
pub const ENV_AXES_LEVEL: &str = "GRIBJUMP_AXES_LEVEL";

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while loading or validating a [`ClientConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Axes level outside `1..=3`.
    #[error("axes level {level} outside 1..=3")]
    AxesLevelOutOfRange {
        /// The configured level.
        level: u32,
    },
    /// The context source label is empty.
    #[error("context source must not be empty")]
    EmptyContextSource,
    /// An environment variable held a value that could not be parsed.
    #[error("environment variable {name}='{value}' is not valid")]
    InvalidEnvValue {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },
}

// ── ClientConfig ───────────────────────────────────────────────────

/// Configuration for a [`GribJump`](crate::GribJump) handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Axes level used when a call does not name one. Default: 3.
    pub default_axes_level: u32,
    /// Value of the `source` entry in every request context.
    /// Default: `"gribjump-rs"`.
    pub context_source: String,
    /// Strip grid hashes from requests before submission. Default: false.
    pub ignore_grid_hash: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_axes_level: MAX_AXES_LEVEL,
            context_source: "gribjump-rs".into(),
            ignore_grid_hash: false,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

impl ClientConfig {
    /// Defaults overlaid with `GRIBJUMP_IGNORE_GRID` and
    /// `GRIBJUMP_AXES_LEVEL` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    ///
    /// [`from_env`](Self::from_env) with an injectable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_IGNORE_GRID) {
            config.ignore_grid_hash =
                parse_flag(&value).ok_or(ConfigError::InvalidEnvValue {
                    name: ENV_IGNORE_GRID,
                    value: value.clone(),
                })?;
        }
        if let Some(value) = lookup(ENV_AXES_LEVEL) {
            config.default_axes_level =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnvValue {
                        name: ENV_AXES_LEVEL,
                        value: value.clone(),
                    })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_axes_level(self.default_axes_level)?;
        if self.context_source.trim().is_empty() {
            return Err(ConfigError::EmptyContextSource);
        }
        Ok(())
    }
}

/// Reject levels outside `1..=3`.
pub fn validate_axes_level(level: u32) -> Result<(), ConfigError> {
    if (MIN_AXES_LEVEL..=MAX_AXES_LEVEL).contains(&level) {
        Ok(())
    } else {
        Err(ConfigError::AxesLevelOutOfRange { level })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        assert_eq!(config.default_axes_level, 3);
        assert!(!config.ignore_grid_hash);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn axes_level_bounds() {
        for level in [0, 4, 100] {
            let config = ClientConfig {
                default_axes_level: level,
                ..Default::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::AxesLevelOutOfRange { level })
            );
        }
        assert!(validate_axes_level(1).is_ok());
    }

    #[test]
    fn empty_source_rejected() {
        let config = ClientConfig {
            context_source: "  ".into(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyContextSource));
    }

    #[test]
    fn env_overlay() {
        let config =
            ClientConfig::from_lookup(lookup(&[(ENV_IGNORE_GRID, "1"), (ENV_AXES_LEVEL, "2")]))
                .unwrap();
        assert!(config.ignore_grid_hash);
        assert_eq!(config.default_axes_level, 2);

        let config = ClientConfig::from_lookup(lookup(&[(ENV_IGNORE_GRID, "off")])).unwrap();
        assert!(!config.ignore_grid_hash);
    }

    #[test]
    fn env_overlay_rejects_garbage() {
        assert_eq!(
            ClientConfig::from_lookup(lookup(&[(ENV_IGNORE_GRID, "maybe")])),
            Err(ConfigError::InvalidEnvValue {
                name: ENV_IGNORE_GRID,
                value: "maybe".into()
            })
        );
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(ENV_AXES_LEVEL, "9")])),
            Err(ConfigError::AxesLevelOutOfRange { level: 9 })
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(ENV_AXES_LEVEL, "x")])),
            Err(ConfigError::InvalidEnvValue { .. })
        ));
    }
}
