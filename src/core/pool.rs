use crate::core::keymap::{Keymap, MappingRule};
use crate::domain::model::RequestFields;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 結果池："target/method" -> 回傳值或失敗訊息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultPool {
    entries: Map<String, Value>,
}

impl ResultPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Walks `path` into `value`. A missing key or a `null` at any step is a miss.
/// Scalars are returned whole.
pub fn extract(value: &Value, path: &[String]) -> Option<Value> {
    let mut current = value;
    if !path.is_empty() && (current.is_object() || current.is_array()) {
        for key in path {
            current = match current {
                Value::Object(map) => map.get(key)?,
                Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
                _ => return None,
            };
            if current.is_null() {
                return None;
            }
        }
    }
    if current.is_null() {
        None
    } else {
        Some(current.clone())
    }
}

/// 將結果依規則寫入欄位，回傳實際寫入的欄位數
pub fn project(result: &Value, rules: &[MappingRule], fields: &mut RequestFields) -> usize {
    let mut written = 0;
    for rule in rules {
        match extract(result, &rule.path) {
            Some(value) => {
                if fields.insert(rule.destination.clone(), value).is_some() {
                    tracing::debug!("Field '{}' overwritten by projection", rule.destination);
                }
                written += 1;
            }
            None => tracing::debug!(
                "Projection {}/{} {:?} -> {} missed",
                rule.source_target,
                rule.source_method,
                rule.path,
                rule.destination
            ),
        }
    }
    written
}

/// Looks up the rules tied to `key` and projects. Returns true when any field was written.
pub fn project_for(key: &str, result: &Value, keymap: &Keymap, fields: &mut RequestFields) -> bool {
    let rules = keymap.rules_for(key);
    !rules.is_empty() && project(result, rules, fields) > 0
}
