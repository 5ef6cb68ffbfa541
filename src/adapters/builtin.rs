use crate::core::capability::CapabilityRegistry;
use crate::core::{CallRequest, Capability, SafeZone};
use anyhow::bail;
use serde_json::{Map, Value};

pub const DATA_TARGET: &str = "sys/data";

/// 內建能力：檢視目前請求欄位
#[derive(Debug, Default, Clone, Copy)]
pub struct DataCapability;

impl Capability for DataCapability {
    fn methods(&self) -> &[&str] {
        &["echo", "keys", "pick"]
    }

    fn safe_zone(&self) -> SafeZone {
        SafeZone::new()
            .allow("echo", &[])
            .allow("keys", &[])
            .allow("pick", &["list"])
    }

    fn call(&self, method: &str, request: &CallRequest<'_>) -> anyhow::Result<Value> {
        match method {
            "echo" => Ok(request.fields.to_value()),
            "keys" => {
                let mut names: Vec<&String> = request.fields.names().collect();
                names.sort();
                Ok(Value::from(names.into_iter().cloned().collect::<Vec<_>>()))
            }
            "pick" => pick(request),
            other => bail!("unknown method '{}'", other),
        }
    }
}

/// Fields named by `list`, in list order, skipping absent ones.
fn pick(request: &CallRequest<'_>) -> anyhow::Result<Value> {
    let names: Vec<String> = match request.fields.get("list") {
        Some(Value::String(list)) => list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => bail!("'list' must be a string or an array of names"),
    };

    let mut picked = Map::new();
    for name in names {
        if let Some(value) = request.fields.get(&name) {
            picked.insert(name, value.clone());
        }
    }
    Ok(Value::Object(picked))
}

/// 註冊所有內建能力
pub fn register_builtins(registry: &mut CapabilityRegistry) {
    registry.register(DATA_TARGET, std::sync::Arc::new(DataCapability));
}
