//! Directive parsing for the `cmd` and `map` request fields.
//!
//! `cmd` is a `-`-separated list of tokens. A token containing `/` names a
//! target (`module/path`), anything else is a bare method name. `map` is a
//! `-`-separated list of `path:destination` rules.

/// 以 `-` 拆分指令，去除空字串並去重，保留首次出現順序
pub fn split_directive(directive: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in directive.split('-') {
        if token.is_empty() || tokens.iter().any(|t| t == token) {
            continue;
        }
        tokens.push(token.to_string());
    }
    tokens
}

/// Target identity with surrounding `\` and `/` trimmed.
pub fn normalize_target(token: &str) -> &str {
    token.trim_matches(|c| c == '\\' || c == '/')
}

/// 取得模組名稱：第一個 `/` 之前的片段，沒有 `/` 則為 None
pub fn module_of(token: &str) -> Option<&str> {
    let trimmed = normalize_target(token);
    trimmed
        .find('/')
        .map(|pos| &trimmed[..pos])
        .filter(|module| !module.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdToken {
    Target { module: String, target: String },
    Method(String),
}

pub fn parse_cmd(directive: &str) -> Vec<CmdToken> {
    let mut parsed: Vec<CmdToken> = Vec::new();
    for token in split_directive(directive) {
        let entry = match module_of(&token) {
            Some(module) => CmdToken::Target {
                module: module.to_string(),
                target: normalize_target(&token).to_string(),
            },
            None => {
                let method = normalize_target(&token);
                if method.is_empty() {
                    continue;
                }
                CmdToken::Method(method.to_string())
            }
        };
        // 正規化後可能重複
        if !parsed.contains(&entry) {
            parsed.push(entry);
        }
    }
    parsed
}

/// One raw `path:destination` rule, not yet resolved against targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDirective {
    pub module: String,
    pub path: String,
    pub destination: String,
}

/// Tokens without both `/` and `:`, without a module or with an empty
/// destination are dropped.
pub fn parse_map(directive: &str) -> Vec<MapDirective> {
    split_directive(directive)
        .into_iter()
        .filter_map(|token| {
            let position = token.find(':')?;
            if !token.contains('/') {
                return None;
            }
            let path = normalize_target(&token[..position]);
            let destination = &token[position + 1..];
            if destination.is_empty() {
                return None;
            }
            let module = module_of(path)?;
            Some(MapDirective {
                module: module.to_string(),
                path: path.to_string(),
                destination: destination.to_string(),
            })
        })
        .collect()
}
