//! Configuration for storage instances
//!
//! A `Storage` is constructed with a fixed base path; all logical paths are
//! interpreted relative to it for the instance's lifetime. Options can be
//! built directly or loaded from `storage.toml` with environment overrides.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Options for constructing a [`crate::Storage`].
#[derive(Debug, Deserialize, Clone)]
pub struct StorageOptions {
    /// Root directory for all logical paths (no runtime reconfiguration).
    pub base_path: PathBuf,
}

impl StorageOptions {
    /// Build options from a base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load options from `storage.toml` with `STORAGE_*` environment overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("storage"))
            .add_source(Environment::with_prefix("STORAGE"))
            .build()?;

        let options: StorageOptions = settings.try_deserialize()?;
        options.validate()?;
        Ok(options)
    }

    /// Validation for all option values.
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.base_path.as_os_str().is_empty() {
            return Err(config::ConfigError::Message(
                "base_path cannot be empty".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_base_path() {
        let options = StorageOptions::new("/srv/files");
        assert_eq!(options.base_path, PathBuf::from("/srv/files"));
    }

    #[test]
    fn test_validate_rejects_empty_base_path() {
        let options = StorageOptions::new("");
        assert!(options.validate().is_err());
    }
}
