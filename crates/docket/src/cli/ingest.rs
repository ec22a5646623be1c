use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use docket_core::{
    ApiDescriptionAnalyzer, ApiOutline, AssetStatus, BatchOutcome, CommitError, CommitOptions,
    Destination, ImportPolicy, IngestPipeline, OutlineAnalyzer, StagingStore, SyntaxChecker,
    UrlChecker,
};

#[derive(Args)]
pub struct IngestArgs {
    /// File path(s) to ingest
    pub paths: Vec<PathBuf>,
    /// Ingest the given text instead of (or alongside) files
    #[arg(long)]
    pub paste: Option<String>,
    /// Commit target
    #[arg(long, default_value = "inventory")]
    pub destination: Destination,
    /// Mark candidates for recursive discovery (always on for the inventory)
    #[arg(long)]
    pub recursive: bool,
    /// Stage and print the review table without committing
    #[arg(long)]
    pub dry_run: bool,
    /// Run the offline URL syntax check before committing
    #[arg(long)]
    pub check: bool,
    /// Import records whose (url, method) already exists instead of skipping
    #[arg(long)]
    pub import_duplicates: bool,
    /// Print an outline when the batch is an API description
    #[arg(long)]
    pub analyze: bool,
    /// Database path (defaults to the user data directory)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

pub async fn run(args: IngestArgs) -> Result<()> {
    if args.paths.is_empty() && args.paste.is_none() {
        bail!("nothing to ingest: pass file paths or --paste");
    }

    let inventory = super::open_inventory(args.db.as_deref()).await?;
    let index = inventory.existing_index().await?;

    let policy = ImportPolicy::new(args.destination).with_default_recursive(args.recursive);
    let pipeline = IngestPipeline::new(policy);

    let BatchOutcome {
        candidates,
        failures,
        kind,
    } = pipeline.process_files(&args.paths, &index).await;

    let mut staging = StagingStore::new(args.destination);
    staging.append(candidates);

    for (origin, error) in &failures {
        eprintln!("error: {origin}: {error}");
    }

    if let Some(text) = args.paste.as_deref() {
        staging.append(pipeline.process_paste(text, &index).candidates);
    }

    if staging.is_empty() {
        println!("No candidates found");
        return Ok(());
    }

    print_review(&staging);

    if args.analyze {
        if let Some(raw) = kind.raw_text() {
            match OutlineAnalyzer::new().analyze(raw).await {
                Ok(outline) => print_outline(&outline),
                Err(e) => eprintln!("warning: could not analyze the API description: {e}"),
            }
        }
    }

    if args.dry_run {
        println!("Dry run: nothing committed");
        return Ok(());
    }

    let options = CommitOptions::default()
        .with_skip_duplicates(!args.import_duplicates)
        .with_validation(args.check);
    let checker = SyntaxChecker::new();
    let checker_ref: Option<&dyn UrlChecker> = if args.check { Some(&checker) } else { None };

    match staging.commit(&inventory, checker_ref, &options).await {
        Ok(report) => {
            println!(
                "Committed: {} imported, {} duplicate, {} failed",
                report.successful, report.duplicates, report.failed
            );
            for error in &report.errors {
                eprintln!("  {error}");
            }
            Ok(())
        }
        Err(e) => {
            if matches!(e, CommitError::ValidationBlocked { .. }) {
                for asset in staging
                    .assets()
                    .iter()
                    .filter(|a| a.status == AssetStatus::Invalid)
                {
                    eprintln!(
                        "  invalid: {}  ({})",
                        asset.url,
                        asset.error.as_deref().unwrap_or("no detail")
                    );
                }
            }
            Err(e.into())
        }
    }
}

fn print_review(staging: &StagingStore) {
    println!("{} candidate(s) staged:", staging.len());

    for asset in staging.assets() {
        let marker = match asset.status {
            AssetStatus::Duplicate => " [dup]",
            AssetStatus::Invalid => " [invalid]",
            _ => "",
        };
        println!(
            "  {:7} {}{}  ({})",
            asset.method.as_str(),
            asset.url,
            marker,
            asset.source
        );
    }
}

fn print_outline(outline: &ApiOutline) {
    println!(
        "API description: {} (version {}), {} operation(s)",
        outline.title,
        outline.version,
        outline.entry_count()
    );

    for entry in &outline.entries {
        match entry.summary.as_deref() {
            Some(summary) => println!("  {:7} {}  {}", entry.method, entry.path, summary),
            None => println!("  {:7} {}", entry.method, entry.path),
        }
    }
}
