use crate::core::keymap::Keymap;
use crate::core::parser::{parse_cmd, parse_map};
use crate::core::pool::{project_for, ResultPool};
use crate::core::registry::TargetRegistry;
use crate::core::structure::DataStruct;
use crate::domain::model::{CallOutcome, ModuleConfig, OutputFormat, RequestFields};
use crate::domain::ports::ModuleConfigLoader;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Directive fields consumed by the cycle and never visible to capabilities.
pub const DIRECTIVE_FIELDS: [&str; 3] = ["cmd", "map", "format"];

/// 單一週期的全部狀態。每個週期建立新的實例，週期結束即丟棄。
#[derive(Debug, Default)]
pub struct CycleContext {
    pub fields: RequestFields,
    pub registry: TargetRegistry,
    pub keymap: Keymap,
    pub structure: DataStruct,
    pub pool: ResultPool,
    pub format: OutputFormat,
    module_configs: HashMap<String, Option<ModuleConfig>>,
    invoked: HashSet<String>,
}

impl CycleContext {
    /// Pulls `cmd`, `map` and `format` out of the request and parses them.
    pub fn from_request(mut fields: RequestFields, default_format: OutputFormat) -> Self {
        let directives: Vec<Option<Value>> = DIRECTIVE_FIELDS
            .iter()
            .map(|name| fields.remove(name))
            .collect();
        let directive_str = |index: usize| directives[index].as_ref().and_then(Value::as_str);

        let registry = TargetRegistry::from_tokens(directive_str(0).map(parse_cmd).unwrap_or_default());
        let keymap = Keymap::build(
            &directive_str(1).map(parse_map).unwrap_or_default(),
            &registry,
        );
        let format = directive_str(2)
            .and_then(OutputFormat::parse)
            .unwrap_or(default_format);

        tracing::debug!(
            "📝 Parsed request: {} targets, {} methods, {} map rules, format {}",
            registry.target_count(),
            registry.methods().len(),
            keymap.len(),
            format.as_str()
        );

        Self {
            fields,
            registry,
            keymap,
            format,
            ..Self::default()
        }
    }

    /// 空請求不做任何事：沒有目標，或沒有指定方法且沒有欄位
    pub fn is_empty_request(&self) -> bool {
        !self.registry.has_targets()
            || (self.registry.methods().is_empty() && self.fields.is_empty())
    }

    pub fn rebuild_struct(&mut self) {
        self.structure.rebuild(&self.fields);
    }

    /// Loads a module's configuration at most once per cycle. Failures are
    /// logged and treated as "no configuration".
    pub fn load_module(&mut self, module: &str, loader: &dyn ModuleConfigLoader) {
        if self.module_configs.contains_key(module) {
            return;
        }
        let config = match loader.load(module) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("⚠️ Module '{}' configuration not loaded: {}", module, e);
                None
            }
        };
        self.module_configs.insert(module.to_string(), config);
    }

    pub fn module_config(&self, module: &str) -> Option<&ModuleConfig> {
        self.module_configs.get(module).and_then(Option::as_ref)
    }

    pub fn is_module_loaded(&self, module: &str) -> bool {
        self.module_configs.contains_key(module)
    }

    /// Marks `key` as invoked. Returns false when it already ran this cycle.
    pub fn begin_invocation(&mut self, key: &str) -> bool {
        self.invoked.insert(key.to_string())
    }

    /// 儲存結果；成功時依 keymap 投射並重建 struct
    pub fn record(&mut self, key: &str, outcome: CallOutcome, failure_marker: &str) {
        match outcome {
            CallOutcome::Returned(value) => {
                if project_for(key, &value, &self.keymap, &mut self.fields) {
                    self.structure.rebuild(&self.fields);
                }
                self.pool.store(key, value);
            }
            CallOutcome::Failed(message) => {
                tracing::warn!("❌ {} failed: {}", key, message);
                self.pool
                    .store(key, Value::String(format!("{}{}", failure_marker, message)));
            }
            CallOutcome::Empty => tracing::debug!("{} returned no result", key),
        }
    }

    pub fn into_output(self) -> CycleOutput {
        CycleOutput {
            pool: self.pool,
            format: self.format,
        }
    }
}

/// 週期輸出，交給外部序列化
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleOutput {
    pub pool: ResultPool,
    pub format: OutputFormat,
}
