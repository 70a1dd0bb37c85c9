//! Configuration file support for the transceiver
//!
//! Sizes the partner table and the queue capacity ceiling from TOML/YAML
//! instead of hardcoded constants. File format is auto-detected.

use crate::error::{FrtError, FrtResult};
use crate::rtos::MAX_QUEUE_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of partner slots
pub const DEFAULT_MAX_PARTNERS: u8 = 8;

/// Transceiver sizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransceiverConfig {
    /// Size of the partner table, fixed for the transceiver's lifetime
    #[serde(default = "default_max_partners")]
    pub max_partners: u8,

    /// Largest queue length a partner may declare
    #[serde(default = "default_max_queue_capacity")]
    pub max_queue_capacity: u8,
}

fn default_max_partners() -> u8 {
    DEFAULT_MAX_PARTNERS
}

fn default_max_queue_capacity() -> u8 {
    MAX_QUEUE_CAPACITY
}

impl Default for TransceiverConfig {
    fn default() -> Self {
        Self {
            max_partners: DEFAULT_MAX_PARTNERS,
            max_queue_capacity: MAX_QUEUE_CAPACITY,
        }
    }
}

impl TransceiverConfig {
    /// Default sizing with a custom partner table size
    pub fn with_max_partners(max_partners: u8) -> Self {
        Self {
            max_partners,
            ..Self::default()
        }
    }

    /// Check that the sizing is usable
    pub fn validate(&self) -> FrtResult<()> {
        if self.max_partners == 0 {
            return Err(FrtError::config("max_partners must be at least 1"));
        }
        if self.max_queue_capacity == 0 || self.max_queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(FrtError::config(format!(
                "max_queue_capacity must be within 1..={}, got {}",
                MAX_QUEUE_CAPACITY, self.max_queue_capacity
            )));
        }
        Ok(())
    }

    /// Load config from a file (auto-detect format)
    pub fn from_file<P: AsRef<Path>>(path: P) -> FrtResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            _ => Self::from_toml(&contents).or_else(|_| Self::from_yaml(&contents)),
        }
    }

    /// Parse and validate config from a TOML string
    pub fn from_toml(contents: &str) -> FrtResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a YAML string
    pub fn from_yaml(contents: &str) -> FrtResult<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = TransceiverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_partners, DEFAULT_MAX_PARTNERS);
        assert_eq!(TransceiverConfig::with_max_partners(3).max_partners, 3);
    }

    #[test]
    fn test_parse_toml() {
        let config = TransceiverConfig::from_toml("max_partners = 4\nmax_queue_capacity = 6\n").unwrap();
        assert_eq!(config.max_partners, 4);
        assert_eq!(config.max_queue_capacity, 6);

        // Missing keys fall back to defaults
        let config = TransceiverConfig::from_toml("max_partners = 2\n").unwrap();
        assert_eq!(config.max_queue_capacity, MAX_QUEUE_CAPACITY);
    }

    #[test]
    fn test_parse_yaml() {
        let config = TransceiverConfig::from_yaml("max_partners: 5\n").unwrap();
        assert_eq!(config.max_partners, 5);
    }

    #[test]
    fn test_rejects_invalid_sizing() {
        assert!(matches!(
            TransceiverConfig::from_toml("max_partners = 0\n"),
            Err(FrtError::Config(_))
        ));
        assert!(TransceiverConfig::from_yaml("max_queue_capacity: 0\n").is_err());
        assert!(TransceiverConfig::from_toml("max_partners = \"many\"\n").is_err());
    }

    #[test]
    fn test_from_file_detects_format() {
        let mut toml_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(toml_file, "max_partners = 7").unwrap();
        assert_eq!(TransceiverConfig::from_file(toml_file.path()).unwrap().max_partners, 7);

        let mut unknown = tempfile::NamedTempFile::new().unwrap();
        writeln!(unknown, "max_partners: 9").unwrap();
        assert_eq!(TransceiverConfig::from_file(unknown.path()).unwrap().max_partners, 9);

        assert!(matches!(
            TransceiverConfig::from_file("/nonexistent/frt.toml"),
            Err(FrtError::Io(_))
        ));
    }
}
