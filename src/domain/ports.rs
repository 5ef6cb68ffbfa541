use crate::domain::model::{CallRequest, ModuleConfig, SafeZone};
use crate::utils::error::Result;
use serde_json::Value;
use std::sync::Arc;

/// A group of invocable methods registered under one target.
pub trait Capability: Send + Sync {
    /// Exported method names.
    fn methods(&self) -> &[&str];

    /// 未宣告時為空
    fn safe_zone(&self) -> SafeZone {
        SafeZone::default()
    }

    /// Returning `Value::Null` means "no result".
    fn call(&self, method: &str, request: &CallRequest<'_>) -> anyhow::Result<Value>;
}

pub trait CapabilityResolver: Send + Sync {
    fn resolve(&self, target: &str) -> Option<Arc<dyn Capability>>;
}

pub trait ModuleConfigLoader: Send + Sync {
    /// `Ok(None)` when the module ships no configuration.
    fn load(&self, module: &str) -> Result<Option<ModuleConfig>>;
}
