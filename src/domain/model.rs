use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// 請求欄位：外部收集的欄位與投射產生的欄位的聯集
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestFields {
    data: HashMap<String, Value>,
}

impl RequestFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last writer wins.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.insert(name.into(), value.into())
    }

    /// 上傳檔案以巢狀結構併入欄位，覆蓋同名欄位
    pub fn insert_file(&mut self, name: impl Into<String>, file: &UploadedFile) -> Option<Value> {
        let value = serde_json::to_value(file).unwrap_or(Value::Null);
        self.data.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.data.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone().into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RequestFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 上傳檔案描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub tmp_path: String,
    pub size: u64,
    pub error: i32,
}

/// 結果輸出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Raw,
    #[default]
    Structured,
}

impl OutputFormat {
    pub const NAMES: [&'static str; 2] = ["raw", "structured"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "raw" => Some(OutputFormat::Raw),
            "structured" => Some(OutputFormat::Structured),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Raw => "raw",
            OutputFormat::Structured => "structured",
        }
    }
}

/// 模組設定，每個週期最多載入一次
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleConfig {
    pub module: String,
    pub settings: toml::Table,
}

impl ModuleConfig {
    pub fn new(module: impl Into<String>, settings: toml::Table) -> Self {
        Self {
            module: module.into(),
            settings,
        }
    }

    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.settings.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(toml::Value::as_str)
    }
}

/// Safe zone: declared method name -> required field names, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafeZone {
    entries: Vec<(String, Vec<String>)>,
}

impl SafeZone {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redeclaring a method replaces its requirement list.
    pub fn allow(mut self, method: &str, required: &[&str]) -> Self {
        let required: Vec<String> = required.iter().map(|s| s.to_string()).collect();
        match self.entries.iter_mut().find(|(m, _)| m == method) {
            Some(entry) => entry.1 = required,
            None => self.entries.push((method.to_string(), required)),
        }
        self
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(m, _)| m.as_str())
    }

    pub fn required(&self, method: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, fields)| fields.as_slice())
    }

    pub fn declares(&self, method: &str) -> bool {
        self.entries.iter().any(|(m, _)| m == method)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 傳給能力實作的呼叫上下文
#[derive(Debug, Clone, Copy)]
pub struct CallRequest<'a> {
    pub target: &'a str,
    pub method: &'a str,
    pub fields: &'a RequestFields,
    pub config: Option<&'a ModuleConfig>,
}

/// Outcome of one wrapped invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Returned(Value),
    /// The method returned null; nothing is stored.
    Empty,
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_fields_last_writer_wins() {
        let mut fields = RequestFields::new();
        fields.insert("session", "a");
        let previous = fields.insert("session", "b");
        assert_eq!(previous, Some(json!("a")));
        assert_eq!(fields.get_str("session"), Some("b"));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_insert_file_is_nested() {
        let mut fields: RequestFields = [("avatar", "old")].into_iter().collect();
        let file = UploadedFile {
            name: "me.png".to_string(),
            mime_type: "image/png".to_string(),
            tmp_path: "/tmp/php123".to_string(),
            size: 42,
            error: 0,
        };
        fields.insert_file("avatar", &file);
        let avatar = fields.get("avatar").unwrap();
        assert_eq!(avatar["name"], json!("me.png"));
        assert_eq!(avatar["type"], json!("image/png"));
        assert_eq!(avatar["size"], json!(42));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("raw"), Some(OutputFormat::Raw));
        assert_eq!(OutputFormat::parse("structured"), Some(OutputFormat::Structured));
        assert_eq!(OutputFormat::parse("json"), None);
        assert_eq!(OutputFormat::default(), OutputFormat::Structured);
    }

    #[test]
    fn test_safe_zone_keeps_declaration_order() {
        let zone = SafeZone::new()
            .allow("logout", &[])
            .allow("login", &["name", "pass"])
            .allow("logout", &["token"]);
        assert_eq!(zone.methods().collect::<Vec<_>>(), vec!["logout", "login"]);
        assert_eq!(zone.required("logout").unwrap(), &["token".to_string()]);
        assert!(zone.declares("login"));
        assert!(zone.required("missing").is_none());
    }
}
