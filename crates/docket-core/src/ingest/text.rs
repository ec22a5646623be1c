use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::ExtractedEndpoint;

static METHOD_PREFIXED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(get|post|put|delete|patch|head|options)\s+(https?://[^\s<>"{}|\\^`\[\]]+)"#)
        .expect("valid regex")
});

static BARE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("valid regex")
});

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b([A-Za-z0-9][A-Za-z0-9-]*(?:\.[A-Za-z0-9][A-Za-z0-9-]*)+)((?:/[^\s<>"{}|\\^`\[\]]*)?)"#,
    )
    .expect("valid regex")
});

/// Pulls endpoints out of free-form text with three rules in strict
/// precedence order, sharing one seen set so the same literal URL is never
/// extracted twice:
///
/// 1. verb + absolute URL ("POST https://api.example.com/users")
/// 2. remaining absolute URLs, defaulting to GET
/// 3. schemeless domain-with-path fallback ("api.example.com/v1"),
///    prefixed with https://
pub struct TextExtractor;

impl TextExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn extract(&self, content: &str) -> Vec<ExtractedEndpoint> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        apply_method_prefixed(content, &mut seen, &mut found);
        apply_bare_urls(content, &mut seen, &mut found);

        // Rule 3 runs on a copy with absolute URLs blanked out so hosts
        // inside an already-captured URL never match again.
        let scrubbed = BARE_URL_RE.replace_all(content, " ");
        apply_domain_fallback(&scrubbed, &mut seen, &mut found);

        found
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_method_prefixed(
    content: &str,
    seen: &mut HashSet<String>,
    found: &mut Vec<ExtractedEndpoint>,
) {
    for caps in METHOD_PREFIXED_RE.captures_iter(content) {
        let method = caps[1].to_uppercase();
        let url = trim_url(&caps[2]);
        seen.insert(url.to_string());
        found.push(ExtractedEndpoint::new(url.to_string()).with_method(method));
    }
}

fn apply_bare_urls(content: &str, seen: &mut HashSet<String>, found: &mut Vec<ExtractedEndpoint>) {
    for m in BARE_URL_RE.find_iter(content) {
        let url = trim_url(m.as_str());
        if seen.insert(url.to_string()) {
            found.push(ExtractedEndpoint::new(url.to_string()));
        }
    }
}

fn apply_domain_fallback(
    content: &str,
    seen: &mut HashSet<String>,
    found: &mut Vec<ExtractedEndpoint>,
) {
    for caps in DOMAIN_RE.captures_iter(content) {
        let host = &caps[1];
        if !domain_plausible(host) {
            continue;
        }

        let url = format!("https://{}{}", host, trim_url(&caps[2]));
        if seen.insert(url.clone()) {
            found.push(ExtractedEndpoint::new(url));
        }
    }
}

/// A dotted token counts as a domain when it has at least one letter, or
/// enough dots to look like an IPv4 literal. Keeps version strings like
/// "1.2.3" and abbreviations like "e.g" out.
fn domain_plausible(host: &str) -> bool {
    let has_letters = host.chars().any(|c| c.is_ascii_alphabetic());
    let dots = host.chars().filter(|c| *c == '.').count();
    if !has_letters && dots < 3 {
        return false;
    }

    let last_label = host.rsplit('.').next().unwrap_or_default();
    last_label.len() >= 2 || dots >= 3
}

/// Strip trailing punctuation that sentence context glues onto a URL.
fn trim_url(url: &str) -> &str {
    url.trim_end_matches(['.', ',', ';', ':', ')', '\''])
}
