use std::path::Path;

use anyhow::{bail, Result};

pub async fn run(yes: bool, db: Option<&Path>) -> Result<()> {
    if !yes {
        bail!("refusing to clear the inventory without --yes");
    }

    let inventory = super::open_inventory(db).await?;
    let removed = inventory.clear_assets().await?;
    println!("Removed {removed} asset(s)");

    Ok(())
}
