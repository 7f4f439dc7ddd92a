use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::read_to_string,
    path::{Path, PathBuf},
};

use crate::{error::DidactError, validate::ValidationMode};

/// Options governing a registry build. Loadable from a `[registry]` table in
/// a TOML config file so CI and embedding applications share one knob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryOptions {
    #[serde(default)]
    pub mode: ValidationMode,
}

impl RegistryOptions {
    pub fn lenient() -> Self {
        RegistryOptions {
            mode: ValidationMode::Lenient,
        }
    }

    pub fn strict() -> Self {
        RegistryOptions {
            mode: ValidationMode::Strict,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TomlOptionsProvider {
    path: PathBuf,
}

impl TomlOptionsProvider {
    pub fn new(path: PathBuf) -> Self {
        TomlOptionsProvider { path }
    }

    pub fn get_options(&self) -> Result<RegistryOptions, DidactError> {
        tracing::debug!("Attempting to read registry options from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Config file not found, using default options.");
            return Ok(RegistryOptions::default());
        }
        let content = read_to_string(&self.path)?;
        let config: BTreeMap<String, RegistryOptions> = toml::from_str(&content)?;
        config
            .get("registry")
            .copied()
            .ok_or_else(|| DidactError::NotFound("registry table not found in config".to_string()))
    }

    pub fn set_options(&self, options: RegistryOptions) -> Result<(), DidactError> {
        tracing::debug!("Attempting to write registry options to: {:?}", &self.path);
        let mut config = BTreeMap::new();
        config.insert("registry".to_string(), options);
        let toml_string = toml::to_string(&config)?;
        std::fs::write(&self.path, toml_string)?;
        Ok(())
    }
}

pub fn get_content<P: AsRef<Path>>(path: P) -> Result<String, DidactError> {
    tracing::debug!("Reading {:?}", path.as_ref());
    Ok(read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_options_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("didact.toml");
        let provider = TomlOptionsProvider::new(path);

        // Missing file falls back to defaults
        assert_eq!(provider.get_options().unwrap(), RegistryOptions::default());

        provider.set_options(RegistryOptions::strict()).unwrap();
        assert_eq!(
            provider.get_options().unwrap().mode,
            ValidationMode::Strict
        );
    }
}
