use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::ExtractedEndpoint;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Not a parseable document: {0}")]
    Parse(String),
    #[error("Document has no recognizable endpoint shape")]
    UnrecognizedShape,
}

/// What a structured document yielded. `api_description` marks the batch for
/// later deep analysis; the caller keeps the raw text around when it is set.
#[derive(Debug)]
pub struct DocumentExtraction {
    pub endpoints: Vec<ExtractedEndpoint>,
    pub api_description: bool,
}

/// Minimal typed view of an OpenAPI/Swagger-style document. Only the fields
/// the pipeline and the outline analyzer read are declared; everything else
/// is ignored by serde, and non-verb path-item keys (`parameters`, vendor
/// extensions) can never be mistaken for methods.
#[derive(Debug, Deserialize)]
pub struct RawApiDocument {
    #[serde(default)]
    pub openapi: Option<String>,
    #[serde(default)]
    pub swagger: Option<String>,
    #[serde(default)]
    pub info: Option<RawInfo>,
    #[serde(default)]
    pub servers: Vec<RawServer>,
    #[serde(default)]
    pub paths: Option<BTreeMap<String, RawPathItem>>,
}

#[derive(Debug, Deserialize)]
pub struct RawInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawServer {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPathItem {
    #[serde(default)]
    pub get: Option<RawOperation>,
    #[serde(default)]
    pub post: Option<RawOperation>,
    #[serde(default)]
    pub put: Option<RawOperation>,
    #[serde(default)]
    pub delete: Option<RawOperation>,
    #[serde(default)]
    pub patch: Option<RawOperation>,
    #[serde(default)]
    pub head: Option<RawOperation>,
    #[serde(default)]
    pub options: Option<RawOperation>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawOperation {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RawOperation {
    /// Summary when present, longer description otherwise.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.summary.as_deref().or(self.description.as_deref())
    }
}

impl RawPathItem {
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &RawOperation)> + '_ {
        [
            ("GET", self.get.as_ref()),
            ("POST", self.post.as_ref()),
            ("PUT", self.put.as_ref()),
            ("DELETE", self.delete.as_ref()),
            ("PATCH", self.patch.as_ref()),
            ("HEAD", self.head.as_ref()),
            ("OPTIONS", self.options.as_ref()),
        ]
        .into_iter()
        .filter_map(|(verb, op)| op.map(|op| (verb, op)))
    }
}

impl RawApiDocument {
    /// Parse raw text as an API description, JSON first then YAML.
    pub fn from_text(content: &str) -> Result<Self, DocumentError> {
        let value = parse_value(content)?;
        if !is_api_description(&value) {
            return Err(DocumentError::UnrecognizedShape);
        }
        serde_json::from_value(value).map_err(|e| DocumentError::Parse(e.to_string()))
    }

    /// First declared server base with any trailing slash trimmed.
    #[must_use]
    pub fn server_base(&self) -> Option<&str> {
        self.servers
            .first()
            .and_then(|s| s.url.as_deref())
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }
}

/// Parse structured content into endpoints. Recognized shapes: an API
/// description (a `paths` collection or an `openapi`/`swagger` marker) whose
/// path × method pairs resolve against the first server base, or a flat array
/// of URL strings / objects with a `url` field.
pub fn extract_document(content: &str) -> Result<DocumentExtraction, DocumentError> {
    let value = parse_value(content)?;

    if is_api_description(&value) {
        let doc: RawApiDocument =
            serde_json::from_value(value).map_err(|e| DocumentError::Parse(e.to_string()))?;
        return Ok(DocumentExtraction {
            endpoints: extract_api_description(&doc),
            api_description: true,
        });
    }

    if let Value::Array(items) = value {
        return Ok(DocumentExtraction {
            endpoints: extract_flat_list(&items),
            api_description: false,
        });
    }

    Err(DocumentError::UnrecognizedShape)
}

fn parse_value(content: &str) -> Result<Value, DocumentError> {
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str(content).map_err(|yaml_err: serde_yaml::Error| {
            // Report the error for the syntax the content most resembles.
            if content.trim_start().starts_with(['{', '[']) {
                DocumentError::Parse(json_err.to_string())
            } else {
                DocumentError::Parse(yaml_err.to_string())
            }
        }),
    }
}

fn is_api_description(value: &Value) -> bool {
    value.as_object().is_some_and(|obj| {
        obj.contains_key("paths") || obj.contains_key("openapi") || obj.contains_key("swagger")
    })
}

fn extract_api_description(doc: &RawApiDocument) -> Vec<ExtractedEndpoint> {
    let base = doc.server_base().unwrap_or_default();
    let mut endpoints = Vec::new();

    if let Some(paths) = &doc.paths {
        for (path, item) in paths {
            for (verb, _op) in item.operations() {
                let url = if base.is_empty() {
                    path.clone()
                } else {
                    format!("{base}{path}")
                };
                endpoints.push(ExtractedEndpoint::new(url).with_method(verb.to_string()));
            }
        }
    }

    endpoints
}

fn extract_flat_list(items: &[Value]) -> Vec<ExtractedEndpoint> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => {
                Some(ExtractedEndpoint::new(s.trim().to_string()))
            }
            Value::Object(obj) => {
                let url = obj.get("url").and_then(Value::as_str)?.trim();
                if url.is_empty() {
                    return None;
                }
                Some(ExtractedEndpoint {
                    url: url.to_string(),
                    method: obj.get("method").and_then(Value::as_str).map(String::from),
                })
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_description_paths_times_methods() {
        let content = r#"{
            "openapi": "3.0.0",
            "servers": [{"url": "https://api.example.com/"}],
            "paths": {
                "/users": {"get": {}, "post": {}},
                "/items": {"get": {}, "delete": {}}
            }
        }"#;

        let extraction = extract_document(content).unwrap();
        assert!(extraction.api_description);
        assert_eq!(extraction.endpoints.len(), 4);

        let urls: Vec<&str> = extraction.endpoints.iter().map(|e| e.url.as_str()).collect();
        assert!(urls.contains(&"https://api.example.com/users"));
        assert!(urls.contains(&"https://api.example.com/items"));
    }

    #[test]
    fn test_bare_paths_without_server() {
        let content = r#"{"paths": {"/health": {"get": {}}}}"#;

        let extraction = extract_document(content).unwrap();
        assert_eq!(extraction.endpoints.len(), 1);
        assert_eq!(extraction.endpoints[0].url, "/health");
        assert_eq!(extraction.endpoints[0].method.as_deref(), Some("GET"));
    }

    #[test]
    fn test_non_verb_keys_ignored() {
        let content = r#"{"paths": {"/users": {"parameters": [], "get": {"summary": "list"}}}}"#;

        let extraction = extract_document(content).unwrap();
        assert_eq!(extraction.endpoints.len(), 1);
        assert_eq!(extraction.endpoints[0].method.as_deref(), Some("GET"));
    }

    #[test]
    fn test_yaml_api_description() {
        let content = "openapi: 3.0.0\nservers:\n  - url: https://y.example.com\npaths:\n  /ping:\n    get: {}\n";

        let extraction = extract_document(content).unwrap();
        assert!(extraction.api_description);
        assert_eq!(extraction.endpoints[0].url, "https://y.example.com/ping");
    }

    #[test]
    fn test_marker_without_paths_still_flags() {
        let extraction = extract_document(r#"{"swagger": "2.0"}"#).unwrap();
        assert!(extraction.api_description);
        assert!(extraction.endpoints.is_empty());
    }

    #[test]
    fn test_flat_string_list() {
        let extraction = extract_document(r#"["https://a.com", "https://b.com/x", ""]"#).unwrap();

        assert!(!extraction.api_description);
        assert_eq!(extraction.endpoints.len(), 2);
        assert_eq!(extraction.endpoints[0].method, None);
    }

    #[test]
    fn test_flat_object_list() {
        let content = r#"[
            {"url": "https://a.com/users", "method": "post"},
            {"name": "no url here"},
            {"url": "https://b.com"}
        ]"#;

        let extraction = extract_document(content).unwrap();
        assert_eq!(extraction.endpoints.len(), 2);
        assert_eq!(extraction.endpoints[0].method.as_deref(), Some("post"));
        assert_eq!(extraction.endpoints[1].method, None);
    }

    #[test]
    fn test_parse_failure() {
        let result = extract_document("{not json at all");
        assert!(matches!(result, Err(DocumentError::Parse(_))));
    }

    #[test]
    fn test_unrecognized_shape() {
        let result = extract_document(r#"{"hello": "world"}"#);
        assert!(matches!(result, Err(DocumentError::UnrecognizedShape)));
    }

    #[test]
    fn test_from_text_outline_fields() {
        let content = r#"{
            "openapi": "3.1.0",
            "info": {"title": "Billing API", "version": "2.4"},
            "paths": {"/invoices": {"get": {"summary": "List invoices"}}}
        }"#;

        let doc = RawApiDocument::from_text(content).unwrap();
        assert_eq!(doc.info.as_ref().unwrap().title.as_deref(), Some("Billing API"));
        let paths = doc.paths.as_ref().unwrap();
        let (verb, op) = paths["/invoices"].operations().next().unwrap();
        assert_eq!(verb, "GET");
        assert_eq!(op.summary.as_deref(), Some("List invoices"));
    }
}
