use crate::asset::HttpMethod;

use super::ExtractedEndpoint;

const URL_HEADER_NAMES: [&str; 3] = ["url", "path", "endpoint"];
const METHOD_HEADER_NAMES: [&str; 2] = ["method", "verb"];

/// Parse delimited text into endpoint pairs. The delimiter is sniffed from
/// the first line; header mode runs first and the whole table falls back to
/// positional mode when no header column resolves to anything usable.
#[must_use]
pub fn extract_table(content: &str) -> Vec<ExtractedEndpoint> {
    let delimiter = sniff_delimiter(content.lines().next().unwrap_or_default());
    extract_rows(&parse_rows(content, delimiter))
}

/// Row-level extraction shared by the delimited-text and spreadsheet paths.
///
/// Header mode: the first row names columns; the URL column must match a
/// synonym (`url`, `path`, `endpoint`, or containing `address`/`asset`) and
/// the method column likewise (`method`, `verb`, containing `http_method`),
/// with a per-row verb-cell scan when no method column is named. Positional
/// mode treats every row as data: URL is the first cell starting with `http`
/// or `/`, method the first cell holding a verb token. Rows with no usable
/// URL drop silently either way.
#[must_use]
pub fn extract_rows(rows: &[Vec<String>]) -> Vec<ExtractedEndpoint> {
    let Some(header) = rows.first() else {
        return Vec::new();
    };

    if let Some(url_col) = resolve_url_column(header) {
        let method_col = resolve_method_column(header);
        let found: Vec<ExtractedEndpoint> = rows[1..]
            .iter()
            .filter_map(|row| header_row_endpoint(row, url_col, method_col))
            .collect();

        if !found.is_empty() {
            return found;
        }
    }

    rows.iter().filter_map(|row| positional_row_endpoint(row)).collect()
}

fn sniff_delimiter(first_line: &str) -> u8 {
    // Reverse priority so a tie lands on the earlier candidate (comma first).
    [b'|', b'\t', b';', b',']
        .into_iter()
        .map(|d| (d, first_line.matches(d as char).count()))
        .filter(|(_, count)| *count > 0)
        .max_by_key(|(_, count)| *count)
        .map_or(b',', |(d, _)| d)
}

fn parse_rows(content: &str, delimiter: u8) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    reader
        .records()
        .filter_map(std::result::Result::ok)
        .map(|record| record.iter().map(str::to_string).collect())
        .collect()
}

fn resolve_url_column(header: &[String]) -> Option<usize> {
    header.iter().position(|name| {
        let name = name.trim().to_lowercase();
        URL_HEADER_NAMES.contains(&name.as_str())
            || name.contains("address")
            || name.contains("asset")
    })
}

fn resolve_method_column(header: &[String]) -> Option<usize> {
    header.iter().position(|name| {
        let name = name.trim().to_lowercase();
        METHOD_HEADER_NAMES.contains(&name.as_str()) || name.contains("http_method")
    })
}

fn header_row_endpoint(
    row: &[String],
    url_col: usize,
    method_col: Option<usize>,
) -> Option<ExtractedEndpoint> {
    let url = row
        .get(url_col)
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())?
        .to_string();

    let method = method_col
        .and_then(|col| row.get(col))
        .map(|cell| cell.trim().to_string())
        .filter(|cell| HttpMethod::from_token(cell).is_some())
        .or_else(|| find_verb_cell(row));

    Some(ExtractedEndpoint { url, method })
}

fn positional_row_endpoint(row: &[String]) -> Option<ExtractedEndpoint> {
    let url = row
        .iter()
        .map(|cell| cell.trim())
        .find(|cell| cell.starts_with("http") || cell.starts_with('/'))?
        .to_string();

    Some(ExtractedEndpoint {
        url,
        method: find_verb_cell(row),
    })
}

fn find_verb_cell(row: &[String]) -> Option<String> {
    row.iter()
        .map(|cell| cell.trim().to_string())
        .find(|cell| HttpMethod::from_token(cell).is_some())
}
