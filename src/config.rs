//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub receiver: ReceiverConfig,

    #[serde(default)]
    pub vtx: VtxConfig,

    #[serde(default)]
    pub tuner: TunerConfig,
}

/// RC receiver serial line configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ReceiverConfig {
    #[serde(default = "default_receiver_port")]
    pub port: String,

    #[serde(default = "default_receiver_baud_rate")]
    pub baud_rate: u32,
}

/// VTX control line configuration
#[derive(Debug, Deserialize, Clone)]
pub struct VtxConfig {
    #[serde(default = "default_vtx_port")]
    pub port: String,

    #[serde(default = "default_vtx_baud_rate")]
    pub baud_rate: u32,
}

/// Retune timing configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TunerConfig {
    /// Minimum interval between mapping evaluations (the rate gate)
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,

    /// How many times each command frame is written
    #[serde(default = "default_resend_count")]
    pub resend_count: u32,

    /// Delay between consecutive writes of one frame
    #[serde(default = "default_resend_spacing_ms")]
    pub resend_spacing_ms: u64,
}

// Default value functions
fn default_receiver_port() -> String {
    "/dev/ttyUSB0".to_string()
}
fn default_receiver_baud_rate() -> u32 {
    420_000
}

fn default_vtx_port() -> String {
    "/dev/ttyUSB1".to_string()
}
fn default_vtx_baud_rate() -> u32 {
    115_200
}

fn default_update_interval_ms() -> u64 {
    500
}
fn default_resend_count() -> u32 {
    5
}
fn default_resend_spacing_ms() -> u64 {
    1
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            port: default_receiver_port(),
            baud_rate: default_receiver_baud_rate(),
        }
    }
}

impl Default for VtxConfig {
    fn default() -> Self {
        Self {
            port: default_vtx_port(),
            baud_rate: default_vtx_baud_rate(),
        }
    }
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: default_update_interval_ms(),
            resend_count: default_resend_count(),
            resend_spacing_ms: default_resend_spacing_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vtx_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, or fall back to defaults when
    /// the file does not exist
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.receiver.port.is_empty() {
            return Err(crate::error::VtxBridgeError::Config(
                toml::de::Error::custom("receiver port cannot be empty"),
            ));
        }

        if self.vtx.port.is_empty() {
            return Err(crate::error::VtxBridgeError::Config(
                toml::de::Error::custom("vtx port cannot be empty"),
            ));
        }

        if self.receiver.port == self.vtx.port {
            return Err(crate::error::VtxBridgeError::Config(
                toml::de::Error::custom("receiver and vtx must use different ports"),
            ));
        }

        // CRSF link speeds
        if ![115_200, 400_000, 420_000, 921_600].contains(&self.receiver.baud_rate) {
            return Err(crate::error::VtxBridgeError::Config(toml::de::Error::custom(
                "receiver baud_rate must be one of: 115200, 400000, 420000, 921600",
            )));
        }

        // SteadyView X control line speeds
        if ![9_600, 19_200, 57_600, 115_200].contains(&self.vtx.baud_rate) {
            return Err(crate::error::VtxBridgeError::Config(toml::de::Error::custom(
                "vtx baud_rate must be one of: 9600, 19200, 57600, 115200",
            )));
        }

        if self.tuner.update_interval_ms == 0 || self.tuner.update_interval_ms > 60_000 {
            return Err(crate::error::VtxBridgeError::Config(toml::de::Error::custom(
                "update_interval_ms must be between 1 and 60000",
            )));
        }

        if self.tuner.resend_count == 0 || self.tuner.resend_count > 10 {
            return Err(crate::error::VtxBridgeError::Config(toml::de::Error::custom(
                "resend_count must be between 1 and 10",
            )));
        }

        if self.tuner.resend_spacing_ms > 100 {
            return Err(crate::error::VtxBridgeError::Config(toml::de::Error::custom(
                "resend_spacing_ms must be at most 100",
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.receiver.port, "/dev/ttyUSB0");
        assert_eq!(config.receiver.baud_rate, 420_000);
        assert_eq!(config.vtx.port, "/dev/ttyUSB1");
        assert_eq!(config.vtx.baud_rate, 115_200);
        assert_eq!(config.tuner.update_interval_ms, 500);
        assert_eq!(config.tuner.resend_count, 5);
        assert_eq!(config.tuner.resend_spacing_ms, 1);
    }

    #[test]
    fn test_empty_receiver_port() {
        let mut config = Config::default();
        config.receiver.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_vtx_port() {
        let mut config = Config::default();
        config.vtx.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_same_port_for_both_lines() {
        let mut config = Config::default();
        config.vtx.port = config.receiver.port.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_receiver_baud_rate() {
        let mut config = Config::default();
        config.receiver.baud_rate = 9_600;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_receiver_baud_rates() {
        for &baud in &[115_200, 400_000, 420_000, 921_600] {
            let mut config = Config::default();
            config.receiver.baud_rate = baud;
            assert!(config.validate().is_ok(), "Baud rate {} should be valid", baud);
        }
    }

    #[test]
    fn test_invalid_vtx_baud_rate() {
        let mut config = Config::default();
        config.vtx.baud_rate = 420_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_vtx_baud_rates() {
        for &baud in &[9_600, 19_200, 57_600, 115_200] {
            let mut config = Config::default();
            config.vtx.baud_rate = baud;
            assert!(config.validate().is_ok(), "Baud rate {} should be valid", baud);
        }
    }

    #[test]
    fn test_update_interval_zero() {
        let mut config = Config::default();
        config.tuner.update_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_update_interval_too_high() {
        let mut config = Config::default();
        config.tuner.update_interval_ms = 60_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resend_count_zero() {
        let mut config = Config::default();
        config.tuner.resend_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resend_count_too_high() {
        let mut config = Config::default();
        config.tuner.resend_count = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resend_spacing_zero_is_allowed() {
        let mut config = Config::default();
        config.tuner.resend_spacing_ms = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resend_spacing_too_high() {
        let mut config = Config::default();
        config.tuner.resend_spacing_ms = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[receiver]
port = "/dev/ttyACM0"

[vtx]
port = "/dev/ttyACM1"
baud_rate = 57600

[tuner]
update_interval_ms = 250
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.receiver.port, "/dev/ttyACM0");
        assert_eq!(config.receiver.baud_rate, 420_000); // default kept
        assert_eq!(config.vtx.baud_rate, 57_600);
        assert_eq!(config.tuner.update_interval_ms, 250);
        assert_eq!(config.tuner.resend_count, 5); // default kept
    }

    #[test]
    fn test_load_invalid_config_fails_validation() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[tuner]
resend_count = 0
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        assert!(Config::load(temp_file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_with_missing_file() {
        let config = Config::load_or_default("/nonexistent/vtx-bridge.toml").unwrap();
        assert_eq!(config.tuner.update_interval_ms, 500);
    }
}
