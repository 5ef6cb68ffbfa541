use crate::config::toml_config::substitute_env_vars;
use crate::core::{ModuleConfig, ModuleConfigLoader};
use crate::utils::error::{DispatchError, Result};
use crate::utils::validation::validate_module_name;
use std::fs;
use std::path::PathBuf;

pub const MODULE_CONFIG_FILE: &str = "cfg.toml";

/// 從 `<root>/<module>/cfg.toml` 載入模組設定
#[derive(Debug, Clone)]
pub struct TomlModuleLoader {
    root: PathBuf,
}

impl TomlModuleLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn config_path(&self, module: &str) -> PathBuf {
        self.root.join(module).join(MODULE_CONFIG_FILE)
    }
}

impl ModuleConfigLoader for TomlModuleLoader {
    fn load(&self, module: &str) -> Result<Option<ModuleConfig>> {
        validate_module_name(module)?;

        let path = self.config_path(module);
        if !path.is_file() {
            tracing::debug!("No configuration for module '{}' at {}", module, path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let settings: toml::Table =
            toml::from_str(&substitute_env_vars(&content)).map_err(|e| DispatchError::ModuleConfigError {
                module: module.to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        tracing::debug!("📦 Loaded configuration for module '{}'", module);
        Ok(Some(ModuleConfig::new(module, settings)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_loads_module_config() {
        let temp_dir = TempDir::new().unwrap();
        let module_dir = temp_dir.path().join("user");
        fs::create_dir_all(&module_dir).unwrap();
        fs::write(module_dir.join(MODULE_CONFIG_FILE), "greeting = \"hey\"\n[db]\nport = 5432\n").unwrap();

        let loader = TomlModuleLoader::new(temp_dir.path());
        let config = loader.load("user").unwrap().unwrap();

        assert_eq!(config.module, "user");
        assert_eq!(config.get_str("greeting"), Some("hey"));
        assert_eq!(config.get("db").and_then(|db| db.get("port")).and_then(|p| p.as_integer()), Some(5432));
    }

    #[test]
    fn test_missing_config_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let loader = TomlModuleLoader::new(temp_dir.path());
        assert!(loader.load("order").unwrap().is_none());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let module_dir = temp_dir.path().join("user");
        fs::create_dir_all(&module_dir).unwrap();
        fs::write(module_dir.join(MODULE_CONFIG_FILE), "greeting = ").unwrap();

        let loader = TomlModuleLoader::new(temp_dir.path());
        let err = loader.load("user").unwrap_err();
        assert!(matches!(err, DispatchError::ModuleConfigError { .. }));
    }

    #[test]
    fn test_rejects_path_escape() {
        let loader = TomlModuleLoader::new("/tmp");
        assert!(loader.load("..").is_err());
    }
}
