//! Video configuration
//!
//! Loaded from JSON or from the process environment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the preferred driver
pub const ENV_VIDEODRIVER: &str = "SDL_VIDEODRIVER";

/// Environment variable overriding screensaver suppression
pub const ENV_ALLOW_SCREENSAVER: &str = "SDL_VIDEO_ALLOW_SCREENSAVER";

/// Environment variable carrying a foreign window handle
pub const ENV_WINDOWID: &str = "SDL_WINDOWID";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid video config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Video subsystem configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Preferred driver name; first available driver when unset
    pub driver: Option<String>,
    /// Device index passed to the driver
    pub device_index: usize,
    /// Screensaver override; `None` keeps the driver default
    pub allow_screensaver: Option<bool>,
    /// Handle of an existing window to render into
    pub window_id: Option<String>,
}

impl VideoConfig {
    /// Parses a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads the process environment
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Reads settings from `(name, value)` pairs
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                ENV_VIDEODRIVER if !value.is_empty() => config.driver = Some(value.to_string()),
                ENV_ALLOW_SCREENSAVER => config.allow_screensaver = Some(parse_flag(value)),
                ENV_WINDOWID if !value.is_empty() => config.window_id = Some(value.to_string()),
                _ => {}
            }
        }
        config
    }

    /// Whether rendering goes into a window the application did not create
    pub fn uses_foreign_window(&self) -> bool {
        self.window_id.is_some()
    }
}

/// Leading-integer parse, nonzero is true
fn parse_flag(value: &str) -> bool {
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u64>().map(|n| n != 0).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars() {
        let config = VideoConfig::from_vars([
            ("SDL_VIDEODRIVER", "vga"),
            ("SDL_VIDEO_ALLOW_SCREENSAVER", "1"),
            ("PATH", "/bin"),
        ]);
        assert_eq!(config.driver.as_deref(), Some("vga"));
        assert_eq!(config.allow_screensaver, Some(true));
        assert!(!config.uses_foreign_window());
    }

    #[test]
    fn test_from_vars_ignores_empty() {
        let config = VideoConfig::from_vars([("SDL_VIDEODRIVER", ""), ("SDL_WINDOWID", "")]);
        assert_eq!(config, VideoConfig::default());
    }

    #[test]
    fn test_screensaver_flag_parsing() {
        assert!(!parse_flag("0"));
        assert!(parse_flag("2"));
        assert!(parse_flag(" 10x"));
        assert!(!parse_flag("yes"));
    }

    #[test]
    fn test_json_round_trip() {
        let config = VideoConfig {
            driver: Some("nds".to_string()),
            device_index: 1,
            allow_screensaver: Some(false),
            window_id: Some("0x1234".to_string()),
        };
        let json = config.to_json().unwrap();
        assert_eq!(VideoConfig::from_json(&json).unwrap(), config);
        assert!(config.uses_foreign_window());
    }

    #[test]
    fn test_json_defaults() {
        let config = VideoConfig::from_json(r#"{"driver":"wing"}"#).unwrap();
        assert_eq!(config.driver.as_deref(), Some("wing"));
        assert_eq!(config.device_index, 0);
        assert!(VideoConfig::from_json("not json").is_err());
    }
}
