mod document;
mod format;
mod pipeline;
mod sheet;
mod table;
mod text;
mod validate;

pub use document::{extract_document, DocumentError, DocumentExtraction, RawApiDocument};
pub use format::{detect_format, looks_binary, InputFormat};
pub use pipeline::{
    BatchKind, BatchOutcome, FileOutcome, IngestError, IngestPipeline, IngestResult,
};
pub use sheet::{sheet_to_rows, SheetError};
pub use table::{extract_rows, extract_table};
pub use text::TextExtractor;
pub use validate::{dedup_status, validate_endpoint, MIN_URL_LEN};

/// A raw (url, method) pair as an extractor saw it, before validation. The
/// method stays a loose string here; coercion into the verb enum happens in
/// one place, the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEndpoint {
    pub url: String,
    pub method: Option<String>,
}

impl ExtractedEndpoint {
    #[must_use]
    pub fn new(url: String) -> Self {
        Self { url, method: None }
    }

    #[must_use]
    pub fn with_method(mut self, method: String) -> Self {
        self.method = Some(method);
        self
    }
}
