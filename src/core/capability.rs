use crate::core::parser::normalize_target;
use crate::domain::ports::{Capability, CapabilityResolver};
use std::collections::HashMap;
use std::sync::Arc;

/// 能力註冊表：啟動時建立 target -> 實作 的對應
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering the same target twice replaces the earlier capability.
    pub fn register(&mut self, target: &str, capability: Arc<dyn Capability>) {
        self.capabilities
            .insert(normalize_target(target).to_string(), capability);
    }

    pub fn with(mut self, target: &str, capability: impl Capability + 'static) -> Self {
        self.register(target, Arc::new(capability));
        self
    }

    pub fn get(&self, target: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(normalize_target(target)).cloned()
    }

    pub fn registered_targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self.capabilities.keys().cloned().collect();
        targets.sort();
        targets
    }
}

impl CapabilityResolver for CapabilityRegistry {
    fn resolve(&self, target: &str) -> Option<Arc<dyn Capability>> {
        self.get(target)
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("targets", &self.registered_targets())
            .finish()
    }
}
