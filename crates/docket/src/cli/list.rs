use std::path::Path;

use anyhow::Result;

pub async fn run(db: Option<&Path>) -> Result<()> {
    let inventory = super::open_inventory(db).await?;
    let assets = inventory.list_assets().await?;

    if assets.is_empty() {
        println!("Inventory is empty");
        return Ok(());
    }

    println!("{} asset(s):", assets.len());
    for asset in &assets {
        let marker = if asset.recursive { " [recursive]" } else { "" };
        println!(
            "  {:7} {}  ({}, {}){}",
            asset.method.as_str(),
            asset.url,
            asset.source,
            asset.destination,
            marker
        );
    }

    Ok(())
}
