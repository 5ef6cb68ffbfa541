use crate::adapters::module_loader::TomlModuleLoader;
use crate::core::caller::CallMode;
use crate::core::dispatcher::Dispatcher;
use crate::core::{CapabilityResolver, OutputFormat};
use crate::utils::error::{DispatchError, Result};
use crate::utils::validation::{validate_directory, validate_one_of, Validate};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub dispatch: DispatchSection,
    pub modules: Option<ModulesSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSection {
    #[serde(default = "default_secure_api")]
    pub secure_api: bool,
    pub default_format: Option<String>,
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            secure_api: default_secure_api(),
            default_format: None,
        }
    }
}

fn default_secure_api() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModulesSection {
    /// 每個模組的設定位於 `<root>/<module>/cfg.toml`
    pub root: String,
}

impl DispatchConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DispatchError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DispatchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn call_mode(&self) -> CallMode {
        if self.dispatch.secure_api {
            CallMode::Secure
        } else {
            CallMode::Insecure
        }
    }

    pub fn default_format(&self) -> OutputFormat {
        self.dispatch
            .default_format
            .as_deref()
            .and_then(OutputFormat::parse)
            .unwrap_or_default()
    }

    pub fn module_root(&self) -> Option<&str> {
        self.modules.as_ref().map(|m| m.root.as_str())
    }

    /// 依配置建立調度器，設定了 `modules.root` 才會讀取模組設定檔
    pub fn build_dispatcher(&self, resolver: impl CapabilityResolver + 'static) -> Dispatcher {
        let dispatcher = Dispatcher::new(resolver)
            .with_mode(self.call_mode())
            .with_default_format(self.default_format());
        match self.module_root() {
            Some(root) => dispatcher.with_loader(TomlModuleLoader::new(root)),
            None => dispatcher,
        }
    }
}

impl Validate for DispatchConfig {
    fn validate(&self) -> Result<()> {
        if let Some(format) = &self.dispatch.default_format {
            validate_one_of("dispatch.default_format", format, &OutputFormat::NAMES)?;
        }
        if let Some(root) = self.module_root() {
            validate_directory("modules.root", root)?;
        }
        Ok(())
    }
}

/// 替換環境變數 (例如 ${API_KEY})，未設定的變數保持原樣
pub fn substitute_env_vars(content: &str) -> String {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

    re.replace_all(content, |caps: &Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatchConfig::from_toml_str("").unwrap();
        assert_eq!(config.call_mode(), CallMode::Secure);
        assert_eq!(config.default_format(), OutputFormat::Structured);
        assert!(config.module_root().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config() {
        let config = DispatchConfig::from_toml_str(
            r#"
[dispatch]
secure_api = false
default_format = "raw"

[modules]
root = "./modules"
"#,
        )
        .unwrap();
        assert_eq!(config.call_mode(), CallMode::Insecure);
        assert_eq!(config.default_format(), OutputFormat::Raw);
        assert_eq!(config.module_root(), Some("./modules"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_format_fails_validation() {
        let config = DispatchConfig::from_toml_str("[dispatch]\ndefault_format = \"xml\"\n").unwrap();
        assert!(config.validate().is_err());
        assert_eq!(config.default_format(), OutputFormat::Structured);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("DISPATCH_POOL_TEST_ROOT", "/srv/modules");
        let config = DispatchConfig::from_toml_str("[modules]\nroot = \"${DISPATCH_POOL_TEST_ROOT}\"\n").unwrap();
        assert_eq!(config.module_root(), Some("/srv/modules"));
        assert_eq!(substitute_env_vars("${DISPATCH_POOL_UNSET_VAR}"), "${DISPATCH_POOL_UNSET_VAR}");
    }

    #[test]
    fn test_build_dispatcher() {
        use crate::core::capability::CapabilityRegistry;

        let config = DispatchConfig::from_toml_str("[dispatch]\nsecure_api = false\n").unwrap();
        let dispatcher = config.build_dispatcher(CapabilityRegistry::new());
        assert_eq!(dispatcher.mode(), CallMode::Insecure);
        assert!(!format!("{:?}", dispatcher).contains("has_loader: true"));

        let config = DispatchConfig::from_toml_str("[modules]\nroot = \"./modules\"\n").unwrap();
        let dispatcher = config.build_dispatcher(CapabilityRegistry::new());
        assert_eq!(dispatcher.mode(), CallMode::Secure);
        assert!(format!("{:?}", dispatcher).contains("has_loader: true"));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(DispatchConfig::from_toml_str("[dispatch").is_err());
    }
}
