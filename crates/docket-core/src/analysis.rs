use serde::{Deserialize, Serialize};

use crate::ingest::RawApiDocument;

/// One documented path/method pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub path: String,
    pub method: String,
    pub summary: Option<String>,
}

/// Identity and surface of an ingested API description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiOutline {
    pub title: String,
    pub version: String,
    pub entries: Vec<OutlineEntry>,
}

impl ApiOutline {
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait::async_trait]
pub trait ApiDescriptionAnalyzer: Send + Sync {
    async fn analyze(&self, content: &str) -> crate::Result<ApiOutline>;
}

/// Default analyzer: outlines the description without leaving the process.
/// Accepts the same documents ingestion accepts, so a batch flagged as an API
/// description always has an outline.
#[derive(Debug, Default)]
pub struct OutlineAnalyzer;

impl OutlineAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ApiDescriptionAnalyzer for OutlineAnalyzer {
    async fn analyze(&self, content: &str) -> crate::Result<ApiOutline> {
        let doc = RawApiDocument::from_text(content)
            .map_err(|e| crate::Error::Collaborator(e.to_string()))?;
        Ok(outline(&doc))
    }
}

fn outline(doc: &RawApiDocument) -> ApiOutline {
    let info = doc.info.as_ref();
    let title = info
        .and_then(|i| i.title.clone())
        .unwrap_or_else(|| "Unknown API".to_string());
    let version = info
        .and_then(|i| i.version.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    let mut entries = Vec::new();
    if let Some(paths) = &doc.paths {
        for (path, item) in paths {
            for (verb, op) in item.operations() {
                entries.push(OutlineEntry {
                    path: path.clone(),
                    method: verb.to_string(),
                    summary: op.label().map(str::to_string),
                });
            }
        }
    }

    ApiOutline {
        title,
        version,
        entries,
    }
}
