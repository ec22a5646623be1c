use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provenance label applied when an extractor supplies none.
pub const FALLBACK_SOURCE: &str = "Import";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// Lenient parse used when coercing loose input: trims whitespace and
    /// ignores case. Unknown tokens yield `None` rather than an error.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "PATCH" => Some(Self::Patch),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }

    #[must_use]
    pub fn all() -> [Self; 7] {
        [
            Self::Get,
            Self::Post,
            Self::Put,
            Self::Delete,
            Self::Patch,
            Self::Head,
            Self::Options,
        ]
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| crate::Error::InvalidMethod(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Valid,
    Invalid,
    Duplicate,
    Pending,
}

impl AssetStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Duplicate => "duplicate",
            Self::Pending => "pending",
        }
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssetStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "valid" => Ok(Self::Valid),
            "invalid" => Ok(Self::Invalid),
            "duplicate" => Ok(Self::Duplicate),
            "pending" => Ok(Self::Pending),
            _ => Err(crate::Error::InvalidStatus(s.to_string())),
        }
    }
}

/// An endpoint record staged for review. The id is transient: it identifies
/// the record within one staging session and is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateAsset {
    pub id: Uuid,
    pub url: String,
    pub method: HttpMethod,
    pub source: String,
    pub recursive: bool,
    pub selected: bool,
    pub status: AssetStatus,
    pub error: Option<String>,
}

impl CandidateAsset {
    #[must_use]
    pub fn new(url: String, method: HttpMethod) -> Self {
        Self {
            id: Uuid::now_v7(),
            url,
            method,
            source: FALLBACK_SOURCE.to_string(),
            recursive: false,
            selected: true,
            status: AssetStatus::Valid,
            error: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: String) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: AssetStatus) -> Self {
        self.status = status;
        self
    }

    pub fn mark_invalid(&mut self, message: String) {
        self.status = AssetStatus::Invalid;
        self.error = Some(message);
    }

    #[must_use]
    pub fn composite_key(&self) -> String {
        composite_key(&self.url, self.method)
    }
}

/// The duplicate key is the (url, method) pair; two records sharing a URL but
/// not a method are independent.
#[must_use]
pub fn composite_key(url: &str, method: HttpMethod) -> String {
    format!("{} {}", url, method.as_str())
}

/// Membership index over already-known (url, method) pairs. Supplied by the
/// caller and only ever read by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ExistingAssetIndex {
    keys: HashSet<String>,
}

impl ExistingAssetIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: &str, method: HttpMethod) {
        self.keys.insert(composite_key(url, method));
    }

    #[must_use]
    pub fn contains(&self, url: &str, method: HttpMethod) -> bool {
        self.keys.contains(&composite_key(url, method))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<(String, HttpMethod)> for ExistingAssetIndex {
    fn from_iter<I: IntoIterator<Item = (String, HttpMethod)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (url, method) in iter {
            index.insert(&url, method);
        }
        index
    }
}
