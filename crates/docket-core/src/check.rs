use url::Url;

#[derive(Debug, Clone)]
pub struct UrlCheckResult {
    pub url: String,
    pub is_valid: bool,
    pub message: String,
}

impl UrlCheckResult {
    #[must_use]
    pub fn valid(url: &str, message: &str) -> Self {
        Self {
            url: url.to_string(),
            is_valid: true,
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn invalid(url: &str, message: String) -> Self {
        Self {
            url: url.to_string(),
            is_valid: false,
            message,
        }
    }
}

/// Reachability-check collaborator. Runs before a commit when validation is
/// enabled; a negative result blocks the commit and marks the staged record
/// invalid.
#[async_trait::async_trait]
pub trait UrlChecker: Send + Sync {
    async fn check(&self, urls: &[String]) -> crate::Result<Vec<UrlCheckResult>>;
}

/// Offline checker: pure syntax, no network traffic. Absolute URLs must
/// parse and carry a domain, a leading slash is an acceptable path, and a
/// dotted schemeless value passes because commit prefixes https://.
pub struct SyntaxChecker;

impl SyntaxChecker {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for SyntaxChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UrlChecker for SyntaxChecker {
    async fn check(&self, urls: &[String]) -> crate::Result<Vec<UrlCheckResult>> {
        Ok(urls.iter().map(|url| check_syntax(url)).collect())
    }
}

#[must_use]
pub fn check_syntax(url: &str) -> UrlCheckResult {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return UrlCheckResult::invalid(url, "Empty URL".to_string());
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return match Url::parse(trimmed) {
            Ok(parsed) if parsed.domain().is_some() => UrlCheckResult::valid(url, "Valid URL"),
            Ok(_) => UrlCheckResult::invalid(url, "URL has no usable domain".to_string()),
            Err(e) => UrlCheckResult::invalid(url, format!("Unparseable URL: {e}")),
        };
    }

    if trimmed.starts_with('/') {
        UrlCheckResult::valid(url, "Valid path")
    } else if trimmed.contains('.') {
        UrlCheckResult::valid(url, "Missing scheme, will use https")
    } else {
        UrlCheckResult::invalid(
            url,
            "Expected a full URL, an absolute path, or a dotted domain".to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_urls() {
        assert!(check_syntax("https://example.com/api").is_valid);
        assert!(check_syntax("http://example.com").is_valid);
        assert!(!check_syntax("https://").is_valid);
    }

    #[test]
    fn test_paths_and_bare_domains() {
        assert!(check_syntax("/api/v1/users").is_valid);
        assert!(check_syntax("api.example.com").is_valid);
    }

    #[test]
    fn test_rejects_junk() {
        assert!(!check_syntax("").is_valid);
        assert!(!check_syntax("   ").is_valid);
        assert!(!check_syntax("not a url").is_valid);
    }

    #[tokio::test]
    async fn test_checker_preserves_order() {
        let checker = SyntaxChecker::new();
        let urls = vec!["https://a.com".to_string(), "junk".to_string()];

        let results = checker.check(&urls).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_valid);
        assert!(!results[1].is_valid);
        assert_eq!(results[1].url, "junk");
    }
}
