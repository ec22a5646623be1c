use crate::asset::{AssetStatus, CandidateAsset, ExistingAssetIndex, HttpMethod, FALLBACK_SOURCE};
use crate::policy::ImportPolicy;

use super::ExtractedEndpoint;

pub const MIN_URL_LEN: usize = 3;

/// Turn a raw extracted pair into a staged candidate, or drop it. Dropping
/// is per-record and logged only; it never fails a batch. Method strings are
/// coerced leniently and default to GET, provenance falls back to "Import",
/// and `recursive` comes from the import policy (the destination may force
/// it).
pub fn validate_endpoint(
    raw: ExtractedEndpoint,
    origin: Option<&str>,
    policy: &ImportPolicy,
) -> Option<CandidateAsset> {
    let url = raw.url.trim().to_string();
    if url.len() < MIN_URL_LEN {
        tracing::warn!("Skipping candidate with unusable url: {url:?}");
        return None;
    }

    let method = raw
        .method
        .as_deref()
        .and_then(HttpMethod::from_token)
        .unwrap_or_default();

    let source = origin
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map_or_else(|| FALLBACK_SOURCE.to_string(), ToString::to_string);

    Some(
        CandidateAsset::new(url, method)
            .with_source(source)
            .with_recursive(policy.effective_recursive()),
    )
}

/// Duplicate detection happens once, at creation time, against the composite
/// (url, method) key. Later index changes never retag staged records.
#[must_use]
pub fn dedup_status(url: &str, method: HttpMethod, index: &ExistingAssetIndex) -> AssetStatus {
    if index.contains(url, method) {
        AssetStatus::Duplicate
    } else {
        AssetStatus::Valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Destination;

    #[test]
    fn test_short_url_dropped() {
        let policy = ImportPolicy::default();
        assert!(validate_endpoint(ExtractedEndpoint::new("ab".into()), None, &policy).is_none());
        assert!(validate_endpoint(ExtractedEndpoint::new("  x ".into()), None, &policy).is_none());
    }

    #[test]
    fn test_method_coercion() {
        let policy = ImportPolicy::default();

        let asset = validate_endpoint(
            ExtractedEndpoint::new("https://a.com".into()).with_method(" post ".into()),
            None,
            &policy,
        )
        .unwrap();
        assert_eq!(asset.method, HttpMethod::Post);

        let asset = validate_endpoint(
            ExtractedEndpoint::new("https://a.com".into()).with_method("FETCH".into()),
            None,
            &policy,
        )
        .unwrap();
        assert_eq!(asset.method, HttpMethod::Get);
    }

    #[test]
    fn test_source_defaults() {
        let policy = ImportPolicy::default();

        let asset = validate_endpoint(
            ExtractedEndpoint::new("https://a.com".into()),
            Some("endpoints.csv"),
            &policy,
        )
        .unwrap();
        assert_eq!(asset.source, "endpoints.csv");

        let asset =
            validate_endpoint(ExtractedEndpoint::new("https://a.com".into()), None, &policy)
                .unwrap();
        assert_eq!(asset.source, FALLBACK_SOURCE);
    }

    #[test]
    fn test_recursive_follows_policy() {
        let inventory = ImportPolicy::new(Destination::Inventory);
        let asset = validate_endpoint(
            ExtractedEndpoint::new("https://a.com".into()),
            None,
            &inventory,
        )
        .unwrap();
        assert!(asset.recursive);

        let session = ImportPolicy::new(Destination::Session);
        let asset =
            validate_endpoint(ExtractedEndpoint::new("https://a.com".into()), None, &session)
                .unwrap();
        assert!(!asset.recursive);
    }

    #[test]
    fn test_dedup_status() {
        let mut index = ExistingAssetIndex::new();
        index.insert("https://a.com", HttpMethod::Get);

        assert_eq!(
            dedup_status("https://a.com", HttpMethod::Get, &index),
            AssetStatus::Duplicate
        );
        assert_eq!(
            dedup_status("https://a.com", HttpMethod::Post, &index),
            AssetStatus::Valid
        );
    }
}
