use thiserror::Error;
use uuid::Uuid;

use crate::asset::{AssetStatus, CandidateAsset};
use crate::check::UrlChecker;
use crate::policy::Destination;
use crate::sink::{AssetSink, CommitOptions, CommitRecord, CommitReport};

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("{failed} of {checked} selected URLs failed validation")]
    ValidationBlocked { failed: usize, checked: usize },
    #[error(transparent)]
    Collaborator(#[from] crate::Error),
}

/// Ordered collection of candidates awaiting disposition. Owned by exactly
/// one caller; every mutation goes through an explicit operation here, so a
/// record can never change under a concurrent writer.
pub struct StagingStore {
    assets: Vec<CandidateAsset>,
    destination: Destination,
}

impl StagingStore {
    #[must_use]
    pub fn new(destination: Destination) -> Self {
        Self {
            assets: Vec::new(),
            destination,
        }
    }

    #[must_use]
    pub fn destination(&self) -> Destination {
        self.destination
    }

    #[must_use]
    pub fn assets(&self) -> &[CandidateAsset] {
        &self.assets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&CandidateAsset> {
        self.assets.iter().find(|asset| asset.id == id)
    }

    /// New ingestion results land at the end; nothing already staged moves.
    pub fn append(&mut self, candidates: Vec<CandidateAsset>) {
        self.assets.extend(candidates);
    }

    /// Flip one record's selection, returning the new value.
    pub fn toggle_selected(&mut self, id: Uuid) -> crate::Result<bool> {
        let asset = self.get_mut(id)?;
        asset.selected = !asset.selected;
        Ok(asset.selected)
    }

    pub fn set_all_selected(&mut self, selected: bool) {
        for asset in &mut self.assets {
            asset.selected = selected;
        }
    }

    /// Flip one record's recursive flag. A no-op returning the current value
    /// when the destination forces it.
    pub fn toggle_recursive(&mut self, id: Uuid) -> crate::Result<bool> {
        let forced = self.destination.forces_recursive();
        let asset = self.get_mut(id)?;

        if !forced {
            asset.recursive = !asset.recursive;
        }
        Ok(asset.recursive)
    }

    pub fn mark_invalid(&mut self, id: Uuid, message: String) -> crate::Result<()> {
        self.get_mut(id)?.mark_invalid(message);
        Ok(())
    }

    pub fn remove(&mut self, id: Uuid) -> crate::Result<CandidateAsset> {
        let position = self
            .assets
            .iter()
            .position(|asset| asset.id == id)
            .ok_or(crate::Error::AssetNotFound(id))?;

        Ok(self.assets.remove(position))
    }

    pub fn clear(&mut self) {
        self.assets.clear();
    }

    /// Records eligible for commit: selected and not marked invalid.
    #[must_use]
    pub fn eligible(&self) -> Vec<&CandidateAsset> {
        self.assets
            .iter()
            .filter(|asset| asset.selected && asset.status != AssetStatus::Invalid)
            .collect()
    }

    /// Commit the eligible records. When validation is on and a checker is
    /// supplied, a failed URL marks its staged records invalid and blocks the
    /// whole commit. A sink error leaves everything staged for retry; on
    /// success exactly the committed records leave the store.
    pub async fn commit(
        &mut self,
        sink: &dyn AssetSink,
        checker: Option<&dyn UrlChecker>,
        options: &CommitOptions,
    ) -> Result<CommitReport, CommitError> {
        let eligible_ids: Vec<Uuid> = self.eligible().iter().map(|asset| asset.id).collect();
        if eligible_ids.is_empty() {
            return Ok(CommitReport::default());
        }

        if options.validate_before_commit {
            if let Some(checker) = checker {
                self.run_check(checker).await?;
            }
        }

        let records: Vec<CommitRecord> = self
            .assets
            .iter()
            .filter(|asset| eligible_ids.contains(&asset.id))
            .map(CommitRecord::from)
            .collect();

        let report = sink.commit(&records, self.destination, options).await?;
        tracing::info!(
            "Committed {} records to {} ({} ok, {} failed, {} duplicate)",
            records.len(),
            self.destination,
            report.successful,
            report.failed,
            report.duplicates
        );

        self.assets.retain(|asset| !eligible_ids.contains(&asset.id));
        Ok(report)
    }

    async fn run_check(&mut self, checker: &dyn UrlChecker) -> Result<(), CommitError> {
        let urls: Vec<String> = self.eligible().iter().map(|asset| asset.url.clone()).collect();
        let results = checker.check(&urls).await.map_err(CommitError::Collaborator)?;

        let mut failed = 0usize;
        for result in &results {
            if result.is_valid {
                continue;
            }
            failed += 1;
            for asset in self.assets.iter_mut().filter(|a| a.url == result.url) {
                asset.mark_invalid(result.message.clone());
            }
        }

        if failed > 0 {
            return Err(CommitError::ValidationBlocked {
                failed,
                checked: results.len(),
            });
        }
        Ok(())
    }

    fn get_mut(&mut self, id: Uuid) -> crate::Result<&mut CandidateAsset> {
        self.assets
            .iter_mut()
            .find(|asset| asset.id == id)
            .ok_or(crate::Error::AssetNotFound(id))
    }
}

impl Default for StagingStore {
    fn default() -> Self {
        Self::new(Destination::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::asset::HttpMethod;
    use crate::check::UrlCheckResult;

    fn asset(url: &str, method: HttpMethod) -> CandidateAsset {
        CandidateAsset::new(url.to_string(), method)
    }

    struct RecordingSink {
        records: Mutex<Vec<CommitRecord>>,
        fail: bool,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait::async_trait]
    impl AssetSink for RecordingSink {
        async fn commit(
            &self,
            records: &[CommitRecord],
            _destination: Destination,
            _options: &CommitOptions,
        ) -> crate::Result<CommitReport> {
            if self.fail {
                return Err(crate::Error::Collaborator("sink offline".to_string()));
            }

            self.records.lock().unwrap().extend(records.iter().cloned());
            Ok(CommitReport {
                successful: records.len() as u32,
                ..CommitReport::default()
            })
        }
    }

    /// Rejects any URL containing "bad".
    struct PickyChecker;

    #[async_trait::async_trait]
    impl UrlChecker for PickyChecker {
        async fn check(&self, urls: &[String]) -> crate::Result<Vec<UrlCheckResult>> {
            Ok(urls
                .iter()
                .map(|url| {
                    if url.contains("bad") {
                        UrlCheckResult::invalid(url, "unreachable".to_string())
                    } else {
                        UrlCheckResult::valid(url, "ok")
                    }
                })
                .collect())
        }
    }

    #[test]
    fn test_append_and_toggle() {
        let mut store = StagingStore::new(Destination::Session);
        let a = asset("https://a.com", HttpMethod::Get);
        let id = a.id;
        store.append(vec![a]);

        assert_eq!(store.len(), 1);
        assert!(!store.toggle_selected(id).unwrap());
        assert!(store.toggle_selected(id).unwrap());
    }

    #[test]
    fn test_unknown_id_errors() {
        let mut store = StagingStore::default();
        let missing = Uuid::now_v7();

        assert!(matches!(
            store.toggle_selected(missing),
            Err(crate::Error::AssetNotFound(_))
        ));
        assert!(store.remove(missing).is_err());
    }

    #[test]
    fn test_recursive_toggle_respects_destination() {
        let mut session = StagingStore::new(Destination::Session);
        let a = asset("https://a.com", HttpMethod::Get);
        let id = a.id;
        session.append(vec![a]);
        assert!(session.toggle_recursive(id).unwrap());

        let mut inventory = StagingStore::new(Destination::Inventory);
        let b = asset("https://b.com", HttpMethod::Get).with_recursive(true);
        let id = b.id;
        inventory.append(vec![b]);

        // Destination forces the flag; toggling changes nothing.
        assert!(inventory.toggle_recursive(id).unwrap());
        assert!(inventory.get(id).unwrap().recursive);
    }

    #[test]
    fn test_set_all_and_remove() {
        let mut store = StagingStore::default();
        let a = asset("https://a.com", HttpMethod::Get);
        let b = asset("https://b.com", HttpMethod::Post);
        let a_id = a.id;
        store.append(vec![a, b]);

        store.set_all_selected(false);
        assert!(store.assets().iter().all(|asset| !asset.selected));

        let removed = store.remove(a_id).unwrap();
        assert_eq!(removed.url, "https://a.com");
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_commit_filters_and_removes() {
        let mut store = StagingStore::new(Destination::Session);
        let keep = asset("https://keep.com", HttpMethod::Get);
        let mut deselected = asset("https://skip.com", HttpMethod::Get);
        deselected.selected = false;
        let mut invalid = asset("https://broken.com", HttpMethod::Get);
        invalid.mark_invalid("nope".to_string());
        store.append(vec![keep, deselected, invalid]);

        let sink = RecordingSink::new();
        let report = store
            .commit(&sink, None, &CommitOptions::default())
            .await
            .unwrap();

        assert_eq!(report.successful, 1);
        let committed = sink.records.lock().unwrap();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].url, "https://keep.com");

        // Committed records leave; everything else stays for review.
        assert_eq!(store.len(), 2);
        assert!(store.assets().iter().all(|a| a.url != "https://keep.com"));
    }

    #[tokio::test]
    async fn test_empty_commit_skips_sink() {
        let mut store = StagingStore::default();
        let sink = RecordingSink::failing();

        let report = store
            .commit(&sink, None, &CommitOptions::default())
            .await
            .unwrap();
        assert_eq!(report.total(), 0);
    }

    #[tokio::test]
    async fn test_sink_failure_preserves_staging() {
        let mut store = StagingStore::default();
        store.append(vec![asset("https://a.com", HttpMethod::Get)]);

        let sink = RecordingSink::failing();
        let result = store.commit(&sink, None, &CommitOptions::default()).await;

        assert!(matches!(result, Err(CommitError::Collaborator(_))));
        assert_eq!(store.len(), 1);
        assert_eq!(store.assets()[0].status, AssetStatus::Valid);
    }

    #[tokio::test]
    async fn test_failed_check_blocks_and_marks() {
        let mut store = StagingStore::default();
        store.append(vec![
            asset("https://good.com", HttpMethod::Get),
            asset("https://bad.com", HttpMethod::Get),
        ]);

        let sink = RecordingSink::new();
        let options = CommitOptions::default().with_validation(true);
        let result = store.commit(&sink, Some(&PickyChecker), &options).await;

        assert!(matches!(
            result,
            Err(CommitError::ValidationBlocked { failed: 1, checked: 2 })
        ));
        assert_eq!(store.len(), 2);

        let bad = store
            .assets()
            .iter()
            .find(|a| a.url == "https://bad.com")
            .unwrap();
        assert_eq!(bad.status, AssetStatus::Invalid);
        assert_eq!(bad.error.as_deref(), Some("unreachable"));
        assert!(sink.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_retry_after_failed_check() {
        let mut store = StagingStore::default();
        store.append(vec![
            asset("https://good.com", HttpMethod::Get),
            asset("https://bad.com", HttpMethod::Get),
        ]);

        let sink = RecordingSink::new();
        let options = CommitOptions::default().with_validation(true);
        let _ = store.commit(&sink, Some(&PickyChecker), &options).await;

        // The invalid record is no longer eligible, so the retry goes through.
        let report = store
            .commit(&sink, Some(&PickyChecker), &options)
            .await
            .unwrap();
        assert_eq!(report.successful, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.assets()[0].url, "https://bad.com");
    }
}
