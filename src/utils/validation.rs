use crate::utils::error::{DispatchError, Result};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 目錄可以尚未建立，但若已存在就必須是目錄
pub fn validate_directory(field_name: &str, dir: &str) -> Result<()> {
    let reason = if dir.trim().is_empty() {
        Some("Directory cannot be empty")
    } else if dir.contains('\0') {
        Some("Directory contains null bytes")
    } else if Path::new(dir).exists() && !Path::new(dir).is_dir() {
        Some("Path exists but is not a directory")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DispatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: dir.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(DispatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Allowed values: {}", allowed.join(", ")),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DispatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 模組名稱只能是單一路徑片段
pub fn validate_module_name(module: &str) -> Result<()> {
    validate_non_empty_string("module", module)?;
    if module == ".." || module == "." || module.contains(['/', '\\', '\0']) {
        return Err(DispatchError::ModuleConfigError {
            module: module.to_string(),
            message: "module name must be a single path segment".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let file = temp_dir.path().join("cfg.toml");
        std::fs::write(&file, "").unwrap();

        assert!(validate_directory("modules.root", temp_dir.path().to_str().unwrap()).is_ok());
        assert!(validate_directory("modules.root", "./not-created-yet").is_ok());
        assert!(validate_directory("modules.root", " ").is_err());
        assert!(validate_directory("modules.root", "a\0b").is_err());

        let err = validate_directory("modules.root", file.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_validate_one_of() {
        assert!(validate_one_of("format", "raw", &["raw", "structured"]).is_ok());
        assert!(validate_one_of("format", "json", &["raw", "structured"]).is_err());
    }

    #[test]
    fn test_validate_module_name() {
        assert!(validate_module_name("user").is_ok());
        assert!(validate_module_name("..").is_err());
        assert!(validate_module_name("a/b").is_err());
        assert!(validate_module_name("  ").is_err());
    }
}
