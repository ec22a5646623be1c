pub mod analysis;
pub mod asset;
pub mod check;
pub mod error;
pub mod ingest;
pub mod inventory;
pub mod policy;
pub mod sink;
pub mod staging;

pub use analysis::{ApiDescriptionAnalyzer, ApiOutline, OutlineAnalyzer, OutlineEntry};
pub use asset::{
    composite_key, AssetStatus, CandidateAsset, ExistingAssetIndex, HttpMethod, FALLBACK_SOURCE,
};
pub use check::{check_syntax, SyntaxChecker, UrlCheckResult, UrlChecker};
pub use error::{Error, Result};
pub use ingest::{
    BatchKind, BatchOutcome, FileOutcome, IngestError, IngestPipeline, IngestResult,
};
pub use inventory::{ImportRun, Inventory, RunStatus, StoredAsset};
pub use policy::{Destination, ImportPolicy};
pub use sink::{AssetSink, CommitOptions, CommitRecord, CommitReport};
pub use staging::{CommitError, StagingStore};
