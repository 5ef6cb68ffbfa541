use crate::core::RequestFields;
use crate::domain::model::UploadedFile;
use crate::utils::error::{DispatchError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// 解析 `key=value`；值若是合法 JSON 則保留結構，否則視為字串
pub fn parse_field(input: &str) -> Result<(String, Value)> {
    let (key, raw) = input.split_once('=').ok_or_else(|| DispatchError::FieldParseError {
        input: input.to_string(),
        reason: "expected key=value".to_string(),
    })?;
    if key.trim().is_empty() {
        return Err(DispatchError::FieldParseError {
            input: input.to_string(),
            reason: "field name cannot be empty".to_string(),
        });
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.trim().to_string(), value))
}

/// Builds a file descriptor field from `name=path`.
pub fn parse_file(input: &str) -> Result<(String, UploadedFile)> {
    let (name, path) = input.split_once('=').ok_or_else(|| DispatchError::FieldParseError {
        input: input.to_string(),
        reason: "expected name=path".to_string(),
    })?;

    let metadata = fs::metadata(path)?;
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string();

    Ok((
        name.trim().to_string(),
        UploadedFile {
            name: file_name,
            mime_type: "application/octet-stream".to_string(),
            tmp_path: path.to_string(),
            size: metadata.len(),
            error: 0,
        },
    ))
}

/// 收集欄位；檔案最後併入，覆蓋同名欄位
pub fn collect_fields(
    cmd: Option<&str>,
    map: Option<&str>,
    format: Option<&str>,
    fields: &[String],
    files: &[String],
) -> Result<RequestFields> {
    let mut request = RequestFields::new();
    for input in fields {
        let (key, value) = parse_field(input)?;
        request.insert(key, value);
    }
    for (name, directive) in [("cmd", cmd), ("map", map), ("format", format)] {
        if let Some(directive) = directive {
            request.insert(name, directive);
        }
    }
    for input in files {
        let (name, file) = parse_file(input)?;
        request.insert_file(name, &file);
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field("name=alice").unwrap(), ("name".to_string(), json!("alice")));
        assert_eq!(parse_field("n=42").unwrap(), ("n".to_string(), json!(42)));
        assert_eq!(
            parse_field("user={\"id\":1}").unwrap(),
            ("user".to_string(), json!({"id": 1}))
        );
        assert_eq!(parse_field("eq=a=b").unwrap().1, json!("a=b"));
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }

    #[test]
    fn test_collect_fields_with_file() {
        let mut file = NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"hello").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let request = collect_fields(
            Some("sys/data"),
            None,
            Some("raw"),
            &["doc=placeholder".to_string()],
            &[format!("doc={}", path)],
        )
        .unwrap();

        assert_eq!(request.get_str("cmd"), Some("sys/data"));
        assert_eq!(request.get_str("format"), Some("raw"));
        assert!(!request.contains("map"));
        let doc = request.get("doc").unwrap();
        assert_eq!(doc["size"], json!(5));
        assert_eq!(doc["tmp_path"], json!(path));
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(parse_file("doc=/definitely/not/here.bin").is_err());
    }
}
