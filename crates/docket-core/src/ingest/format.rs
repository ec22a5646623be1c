use serde::{Deserialize, Serialize};

/// How many leading characters the binary guard inspects.
const GUARD_WINDOW: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    Text,
    Table,
    Document,
    Spreadsheet,
}

impl InputFormat {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Table => "table",
            Self::Document => "document",
            Self::Spreadsheet => "spreadsheet",
        }
    }
}

/// Classify by file name alone. Spreadsheet extensions win regardless of
/// content because their bytes are never valid text; everything unrecognized
/// falls back to plain text.
#[must_use]
pub fn detect_format(name: &str) -> InputFormat {
    let ext = name
        .rsplit('.')
        .next()
        .filter(|ext| ext.len() < name.len())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xls" | "xlsb" | "ods" => InputFormat::Spreadsheet,
        "json" | "yaml" | "yml" => InputFormat::Document,
        "csv" | "tsv" => InputFormat::Table,
        _ => InputFormat::Text,
    }
}

/// Scan the first 1000 characters for control bytes that never occur in
/// text (anything below 0x20 except `\t \n \x0b \x0c \r`). Catches binaries
/// that slipped past the extension check before an extractor mangles them.
#[must_use]
pub fn looks_binary(text: &str) -> bool {
    text.chars()
        .take(GUARD_WINDOW)
        .any(|c| matches!(c, '\u{0}'..='\u{8}' | '\u{e}'..='\u{1f}'))
}
