use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::asset::{CandidateAsset, ExistingAssetIndex};
use crate::policy::ImportPolicy;

use super::document::{extract_document, DocumentError};
use super::format::{detect_format, looks_binary, InputFormat};
use super::sheet::{sheet_to_rows, SheetError};
use super::table::{extract_rows, extract_table};
use super::text::TextExtractor;
use super::validate::{dedup_status, validate_endpoint};
use super::ExtractedEndpoint;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{0} appears to be a binary file")]
    BinaryInput(String),
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
    #[error("Spreadsheet error: {0}")]
    Sheet(#[from] SheetError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type IngestResult<T> = Result<T, IngestError>;

/// Whether a batch contained an API-description document. When it did, the
/// raw text is retained for the deep-analysis collaborator.
#[derive(Debug, Clone, Default)]
pub enum BatchKind {
    #[default]
    Plain,
    ApiDescription {
        raw_text: String,
    },
}

impl BatchKind {
    #[must_use]
    pub fn is_api_description(&self) -> bool {
        matches!(self, Self::ApiDescription { .. })
    }

    #[must_use]
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Self::Plain => None,
            Self::ApiDescription { raw_text } => Some(raw_text),
        }
    }
}

/// Candidates from one input item.
#[derive(Debug)]
pub struct FileOutcome {
    pub candidates: Vec<CandidateAsset>,
    pub kind: BatchKind,
}

/// Accumulated result of a multi-item ingestion call. Per-file failures are
/// carried here (origin label + error) instead of aborting the batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub candidates: Vec<CandidateAsset>,
    pub failures: Vec<(String, IngestError)>,
    pub kind: BatchKind,
}

impl BatchOutcome {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn absorb(&mut self, outcome: FileOutcome) {
        self.candidates.extend(outcome.candidates);
        if outcome.kind.is_api_description() {
            self.kind = outcome.kind;
        }
    }

    fn add_failure(&mut self, origin: String, error: IngestError) {
        self.failures.push((origin, error));
    }

    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// The full ingestion path: classify, guard, extract, validate, dedup.
/// Stateless between calls apart from the configured policy; every call gets
/// the caller's current view of existing assets.
pub struct IngestPipeline {
    policy: ImportPolicy,
    text: TextExtractor,
}

impl IngestPipeline {
    #[must_use]
    pub fn new(policy: ImportPolicy) -> Self {
        Self {
            policy,
            text: TextExtractor::new(),
        }
    }

    /// Run one named blob through the pipeline. The name picks the format
    /// and doubles as the provenance label.
    pub fn process_content(
        &self,
        name: &str,
        content: &[u8],
        index: &ExistingAssetIndex,
    ) -> IngestResult<FileOutcome> {
        let format = detect_format(name);
        tracing::debug!("Classified {} as {}", name, format.as_str());

        if format == InputFormat::Spreadsheet {
            let rows = sheet_to_rows(content)?;
            return Ok(self.finish(extract_rows(&rows), Some(name), index, BatchKind::Plain));
        }

        let text = String::from_utf8_lossy(content);
        if looks_binary(&text) {
            return Err(IngestError::BinaryInput(name.to_string()));
        }

        let (endpoints, kind) = match format {
            InputFormat::Document => {
                let extraction = extract_document(&text)?;
                let kind = if extraction.api_description {
                    BatchKind::ApiDescription {
                        raw_text: text.into_owned(),
                    }
                } else {
                    BatchKind::Plain
                };
                (extraction.endpoints, kind)
            }
            InputFormat::Table => (extract_table(&text), BatchKind::Plain),
            _ => (self.text.extract(&text), BatchKind::Plain),
        };

        Ok(self.finish(endpoints, Some(name), index, kind))
    }

    /// Pasted text skips format sniffing; it is text by construction.
    #[must_use]
    pub fn process_paste(&self, text: &str, index: &ExistingAssetIndex) -> FileOutcome {
        self.finish(self.text.extract(text), Some("Paste"), index, BatchKind::Plain)
    }

    pub async fn process_file(
        &self,
        path: &Path,
        index: &ExistingAssetIndex,
    ) -> IngestResult<FileOutcome> {
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy());

        self.process_content(&name, &content, index)
    }

    /// Process items strictly one at a time (await-then-next) so a large
    /// spreadsheet never has to share peak memory with a neighbor. A failed
    /// item is recorded and the rest of the batch continues.
    pub async fn process_files(
        &self,
        paths: &[PathBuf],
        index: &ExistingAssetIndex,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::new();

        for path in paths {
            let origin = path.to_string_lossy().to_string();

            match self.process_file(path, index).await {
                Ok(file) => outcome.absorb(file),
                Err(e) => {
                    tracing::warn!("Failed to ingest {}: {}", origin, e);
                    outcome.add_failure(origin, e);
                }
            }
        }

        outcome
    }

    fn finish(
        &self,
        raw: Vec<ExtractedEndpoint>,
        origin: Option<&str>,
        index: &ExistingAssetIndex,
        kind: BatchKind,
    ) -> FileOutcome {
        let candidates = raw
            .into_iter()
            .filter_map(|endpoint| validate_endpoint(endpoint, origin, &self.policy))
            .map(|asset| {
                let status = dedup_status(&asset.url, asset.method, index);
                asset.with_status(status)
            })
            .collect();

        FileOutcome { candidates, kind }
    }
}

impl Default for IngestPipeline {
    fn default() -> Self {
        Self::new(ImportPolicy::default())
    }
}
