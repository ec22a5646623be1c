use serde::{Deserialize, Serialize};

use crate::asset::{CandidateAsset, HttpMethod};
use crate::policy::Destination;

/// The projection of a staged candidate that actually gets persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub url: String,
    pub method: HttpMethod,
    pub recursive: bool,
    pub source: String,
}

impl From<&CandidateAsset> for CommitRecord {
    fn from(asset: &CandidateAsset) -> Self {
        Self {
            url: asset.url.clone(),
            method: asset.method,
            recursive: asset.recursive,
            source: asset.source.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitOptions {
    pub skip_duplicates: bool,
    pub validate_before_commit: bool,
    pub batch_size: usize,
    pub rate_limit_ms: u64,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            skip_duplicates: true,
            validate_before_commit: false,
            batch_size: 50,
            rate_limit_ms: 10,
        }
    }
}

impl CommitOptions {
    #[must_use]
    pub fn with_skip_duplicates(mut self, skip: bool) -> Self {
        self.skip_duplicates = skip;
        self
    }

    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_before_commit = validate;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn with_rate_limit_ms(mut self, rate_limit_ms: u64) -> Self {
        self.rate_limit_ms = rate_limit_ms;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitReport {
    pub successful: u32,
    pub failed: u32,
    pub duplicates: u32,
    pub errors: Vec<String>,
}

impl CommitReport {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.successful + self.failed + self.duplicates
    }
}

/// Persistence collaborator. Receives the filtered, projected records in one
/// call; partial failures are reported in the returned counts, a returned
/// error means the whole batch must be retried.
#[async_trait::async_trait]
pub trait AssetSink: Send + Sync {
    async fn commit(
        &self,
        records: &[CommitRecord],
        destination: Destination,
        options: &CommitOptions,
    ) -> crate::Result<CommitReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_projection() {
        let asset = CandidateAsset::new("https://a.com".into(), HttpMethod::Post)
            .with_source("feed.csv".into())
            .with_recursive(true);

        let record = CommitRecord::from(&asset);
        assert_eq!(record.url, "https://a.com");
        assert_eq!(record.method, HttpMethod::Post);
        assert!(record.recursive);
        assert_eq!(record.source, "feed.csv");
    }

    #[test]
    fn test_options_defaults() {
        let options = CommitOptions::default();
        assert!(options.skip_duplicates);
        assert!(!options.validate_before_commit);
        assert_eq!(options.batch_size, 50);
    }

    #[test]
    fn test_batch_size_floor() {
        let options = CommitOptions::default().with_batch_size(0);
        assert_eq!(options.batch_size, 1);
    }
}
