pub mod clear;
pub mod history;
pub mod ingest;
pub mod list;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use docket_core::Inventory;

use ingest::IngestArgs;

#[derive(Parser)]
#[command(
    name = "dkt",
    about = "Stage and import API endpoint evidence",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest files or pasted text, review, and commit
    Ingest(IngestArgs),
    /// Show inventory contents
    List {
        /// Database path (defaults to the user data directory)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Show import history
    History {
        /// Most recent runs to show
        #[arg(long, default_value_t = 20)]
        limit: u32,
        /// Database path (defaults to the user data directory)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Remove every asset from the inventory
    Clear {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
        /// Database path (defaults to the user data directory)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

pub async fn open_inventory(db: Option<&Path>) -> Result<Inventory> {
    let path = database_path(db)?;

    Inventory::open(&path.to_string_lossy())
        .await
        .with_context(|| format!("could not open database at {}", path.display()))
}

fn database_path(db: Option<&Path>) -> Result<PathBuf> {
    let path = match db {
        Some(path) => path.to_path_buf(),
        None => {
            let base = dirs::data_dir().context("no user data directory available")?;
            base.join("docket").join("docket.db")
        }
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(path)
}
