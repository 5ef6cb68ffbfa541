use crate::core::parser::CmdToken;

/// 請求的模組、目標與方法，皆保留首次出現順序
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    modules: Vec<(String, Vec<String>)>,
    methods: Vec<String>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: impl IntoIterator<Item = CmdToken>) -> Self {
        let mut registry = Self::new();
        for token in tokens {
            match token {
                CmdToken::Target { module, target } => registry.add_target(&module, &target),
                CmdToken::Method(method) => registry.add_method(&method),
            }
        }
        registry
    }

    /// Idempotent.
    pub fn add_target(&mut self, module: &str, target: &str) {
        let index = match self.modules.iter().position(|(m, _)| m == module) {
            Some(index) => index,
            None => {
                self.modules.push((module.to_string(), Vec::new()));
                self.modules.len() - 1
            }
        };
        let targets = &mut self.modules[index].1;
        if !targets.iter().any(|t| t == target) {
            targets.push(target.to_string());
        }
    }

    /// Idempotent.
    pub fn add_method(&mut self, method: &str) {
        if !self.methods.iter().any(|m| m == method) {
            self.methods.push(method.to_string());
        }
    }

    pub fn modules(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.modules
            .iter()
            .map(|(module, targets)| (module.as_str(), targets.as_slice()))
    }

    pub fn targets_of(&self, module: &str) -> &[String] {
        self.modules
            .iter()
            .find(|(m, _)| m == module)
            .map(|(_, targets)| targets.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_target(&self, module: &str, target: &str) -> bool {
        self.targets_of(module).iter().any(|t| t == target)
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn has_targets(&self) -> bool {
        self.modules.iter().any(|(_, targets)| !targets.is_empty())
    }

    pub fn target_count(&self) -> usize {
        self.modules.iter().map(|(_, targets)| targets.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::parse_cmd;

    #[test]
    fn test_registration_is_idempotent() {
        let registry = TargetRegistry::from_tokens(parse_cmd(
            "user/login-user/logout-user/login-login-order/list-login",
        ));

        let modules: Vec<_> = registry.modules().map(|(m, _)| m).collect();
        assert_eq!(modules, vec!["user", "order"]);
        assert_eq!(
            registry.targets_of("user"),
            &["user/login".to_string(), "user/logout".to_string()]
        );
        assert_eq!(registry.methods(), &["login".to_string()]);
        assert_eq!(registry.target_count(), 3);
    }

    #[test]
    fn test_manual_add_keeps_first_seen_order() {
        let mut registry = TargetRegistry::new();
        registry.add_target("b", "b/x");
        registry.add_target("a", "a/y");
        registry.add_target("b", "b/z");
        registry.add_target("b", "b/x");

        let modules: Vec<_> = registry.modules().collect();
        assert_eq!(modules[0].0, "b");
        assert_eq!(modules[0].1, &["b/x".to_string(), "b/z".to_string()]);
        assert_eq!(modules[1].0, "a");
        assert!(registry.has_target("a", "a/y"));
        assert!(!registry.has_target("a", "b/x"));
        assert!(registry.targets_of("missing").is_empty());
    }

    #[test]
    fn test_empty_registry() {
        let registry = TargetRegistry::new();
        assert!(!registry.has_targets());
        assert!(registry.methods().is_empty());
    }
}
