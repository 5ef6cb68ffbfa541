use crate::domain::model::RequestFields;

/// Snapshot of the currently known field names. Always fully recomputed.
#[derive(Debug, Clone, Default)]
pub struct DataStruct {
    names: Vec<String>,
}

impl DataStruct {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild(&mut self, fields: &RequestFields) {
        self.names = fields.names().cloned().collect();
        tracing::debug!("🧱 Struct rebuilt with {} fields", self.names.len());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// 缺少的必要欄位
    pub fn missing<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        required
            .iter()
            .filter(|name| !self.contains(name))
            .map(String::as_str)
            .collect()
    }

    pub fn satisfies(&self, required: &[String]) -> bool {
        required.iter().all(|name| self.contains(name))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
