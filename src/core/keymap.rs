use crate::core::parser::MapDirective;
use crate::core::registry::TargetRegistry;
use std::collections::HashMap;

/// 從某次呼叫結果擷取值並寫入欄位的規則
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRule {
    pub source_target: String,
    pub source_method: String,
    /// Outer-to-inner keys walked into the result.
    pub path: Vec<String>,
    pub destination: String,
}

/// "target/method" -> rules, in directive order.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    rules: HashMap<String, Vec<MappingRule>>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves each directive by longest-suffix matching against the
    /// registered targets of its module. Unresolvable directives are dropped.
    pub fn build(directives: &[MapDirective], registry: &TargetRegistry) -> Self {
        let mut keymap = Self::new();
        for directive in directives {
            match resolve(directive, registry) {
                Some(rule) => {
                    tracing::debug!(
                        "🗺️ Map rule {}/{} {:?} -> {}",
                        rule.source_target,
                        rule.source_method,
                        rule.path,
                        rule.destination
                    );
                    keymap.add(rule);
                }
                None => tracing::debug!("Map path '{}' matches no registered target", directive.path),
            }
        }
        keymap
    }

    pub fn add(&mut self, rule: MappingRule) {
        let key = format!("{}/{}", rule.source_target, rule.source_method);
        self.rules.entry(key).or_default().push(rule);
    }

    pub fn rules_for(&self, key: &str) -> &[MappingRule] {
        self.rules.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// 從右側逐段縮短路徑，直到剩餘部分為同模組下已註冊的目標
fn resolve(directive: &MapDirective, registry: &TargetRegistry) -> Option<MappingRule> {
    let mut keys: Vec<&str> = directive.path.split('/').collect();
    // popped segments, inner-most first
    let mut depth: Vec<&str> = Vec::new();

    while !keys.is_empty() {
        let candidate = keys.join("/");
        if registry.has_target(&directive.module, &candidate) {
            let method = depth.pop()?;
            depth.reverse();
            return Some(MappingRule {
                source_target: candidate,
                source_method: method.to_string(),
                path: depth.into_iter().map(str::to_string).collect(),
                destination: directive.destination.clone(),
            });
        }
        if let Some(segment) = keys.pop() {
            depth.push(segment);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::{parse_cmd, parse_map};

    fn keymap_for(cmd: &str, map: &str) -> Keymap {
        let registry = TargetRegistry::from_tokens(parse_cmd(cmd));
        Keymap::build(&parse_map(map), &registry)
    }

    #[test]
    fn test_resolves_method_and_empty_path() {
        let keymap = keymap_for("user/login", "user/login/token:session");
        let rules = keymap.rules_for("user/login/token");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].source_target, "user/login");
        assert_eq!(rules[0].source_method, "token");
        assert!(rules[0].path.is_empty());
        assert_eq!(rules[0].destination, "session");
    }

    #[test]
    fn test_resolves_nested_extraction_path() {
        let keymap = keymap_for("user/ctrl/auth", "user/ctrl/auth/login/data/token:session");
        let rules = keymap.rules_for("user/ctrl/auth/login");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].path, vec!["data".to_string(), "token".to_string()]);
    }

    #[test]
    fn test_prefers_longest_registered_target() {
        let keymap = keymap_for("user/a-user/a/b", "user/a/b/run/x:dest");
        assert!(keymap.rules_for("user/a/b/run").len() == 1);
        assert!(keymap.rules_for("user/a/b").is_empty());
    }

    #[test]
    fn test_unresolvable_rule_is_dropped() {
        let keymap = keymap_for("user/login", "order/list/items:items-user/profile/name:n");
        assert!(keymap.is_empty());
    }

    #[test]
    fn test_path_equal_to_target_has_no_method() {
        let keymap = keymap_for("user/login", "user/login:session");
        assert!(keymap.is_empty());
    }

    #[test]
    fn test_multiple_rules_share_a_source() {
        let keymap = keymap_for("user/login", "user/login/run/a:x-user/login/run/b:y");
        let rules = keymap.rules_for("user/login/run");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].destination, "x");
        assert_eq!(rules[1].destination, "y");
        assert_eq!(keymap.len(), 2);
    }
}
