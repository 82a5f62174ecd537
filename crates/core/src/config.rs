use serde::Deserialize;

use crate::error::{PixelError, PixelResult};
use crate::types::Currency;

/// Root application configuration. Loaded from environment variables
/// with the prefix `PIXEL_DEMO__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pixel: PixelConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub readiness: ReadinessConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
}

/// Vendor account settings. Immutable once handed to the adapter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PixelConfig {
    /// Vendor-issued account identifier.
    #[serde(default)]
    pub pixel_id: String,
    /// Turns on the vendor's debug mode.
    #[serde(default)]
    pub test_mode: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadinessConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_script_url")]
    pub script_url: String,
    /// Library tag appended as `lib=` and used as the vendor object name.
    #[serde(default = "default_library_tag")]
    pub library_tag: String,
}

fn default_currency() -> String {
    "USD".to_string()
}
fn default_max_attempts() -> u32 {
    50
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_script_url() -> String {
    "https://analytics.tiktok.com/i18n/pixel/events.js".to_string()
}
fn default_library_tag() -> String {
    "ttq".to_string()
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
        }
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            script_url: default_script_url(),
            library_tag: default_library_tag(),
        }
    }
}

impl PixelConfig {
    pub fn new(pixel_id: impl Into<String>, test_mode: bool) -> Self {
        Self {
            pixel_id: pixel_id.into(),
            test_mode,
        }
    }

    /// Vendor account ids are opaque alphanumeric tokens.
    pub fn validate(&self) -> PixelResult<()> {
        if self.pixel_id.is_empty() {
            return Err(PixelError::Config("pixel_id must not be empty".into()));
        }
        if !self.pixel_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PixelError::Config(format!(
                "pixel_id must be alphanumeric, got '{}'",
                self.pixel_id
            )));
        }
        Ok(())
    }
}

impl TrackingConfig {
    pub fn currency(&self) -> PixelResult<Currency> {
        Currency::parse(&self.default_currency)
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("PIXEL_DEMO")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.pixel.pixel_id.is_empty());
        assert!(!config.pixel.test_mode);
        assert_eq!(config.tracking.default_currency, "USD");
        assert_eq!(config.readiness.max_attempts, 50);
        assert_eq!(config.readiness.poll_interval_ms, 100);
        assert_eq!(config.loader.library_tag, "ttq");
        assert!(config.loader.script_url.starts_with("https://"));
    }

    #[test]
    fn test_validate_pixel_config() {
        assert!(PixelConfig::new("D4JHOSBC77UBCCH9DR1G", false)
            .validate()
            .is_ok());
        assert!(PixelConfig::new("", false).validate().is_err());
        assert!(PixelConfig::new("abc&lib=evil", true).validate().is_err());
    }

    #[test]
    fn test_tracking_currency() {
        let tracking = TrackingConfig::default();
        assert_eq!(tracking.currency().unwrap().as_str(), "USD");

        let bad = TrackingConfig {
            default_currency: "dollars".into(),
        };
        assert!(bad.currency().is_err());
    }
}
