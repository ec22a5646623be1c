use std::path::Path;

use anyhow::Result;

pub async fn run(limit: u32, db: Option<&Path>) -> Result<()> {
    let inventory = super::open_inventory(db).await?;
    let runs = inventory.list_runs(limit).await?;

    if runs.is_empty() {
        println!("No import runs recorded");
        return Ok(());
    }

    println!("{} run(s):", runs.len());
    for run in &runs {
        println!(
            "  {}  {:9}  {} total, {} imported, {} duplicate, {} failed  ({})",
            run.created_at.format("%Y-%m-%d %H:%M:%S"),
            run.status.as_str(),
            run.total,
            run.successful,
            run.duplicates,
            run.failed,
            run.source
        );
        if let Some(error) = &run.error {
            println!("    error: {error}");
        }
    }

    Ok(())
}
