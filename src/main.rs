//! Command-line front end over the local catalog.
//!
//! Reads go straight to the adapter; `add`, `update`, `remove` and `import` pass the
//! manager PIN gate first.

use clap::{Parser, Subcommand};
use dashcat::app::{CatalogView, ManagerGate, SharePanel, ShareTarget};
use dashcat::domain::{BackupDocument, CatalogError, DashboardDraft, DashboardPatch};
use dashcat::observability::init_tracing;
use dashcat::sync::{DashboardStore, LocalAdapter};
use dashcat::{open_local_catalog, Config, Result};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "dashcat")]
#[command(version)]
#[command(about = "Catalog of research-funding dashboards")]
struct Args {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List dashboards, optionally filtered.
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// List the categories in use.
    Categories,
    /// Add a dashboard.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        pin: String,
    },
    /// Change fields of a dashboard. An empty `--category` clears it.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        pin: String,
    },
    /// Remove a dashboard.
    Remove {
        id: String,
        #[arg(long)]
        pin: String,
    },
    /// Write a timestamped backup file.
    Export {
        /// Target directory. Defaults to the configured backup directory.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Replace every dashboard with the contents of a backup file.
    Import {
        file: PathBuf,
        #[arg(long)]
        pin: String,
    },
    /// Print share links for a dashboard.
    Share {
        id: String,
        /// One of twitter, linkedin, whatsapp, email. Prints all when omitted.
        #[arg(long)]
        target: Option<ShareTarget>,
        #[arg(long)]
        message: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match args.config.as_ref().map_or_else(|| Ok(Config::default()), Config::from_file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("dashcat: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config);

    match run(args.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("dashcat: {e}");
            ExitCode::FAILURE
        }
    }
}

fn unlock(config: &Config, pin: &str) -> Result<()> {
    let mut gate = ManagerGate::new(config.manager_pin.as_str());
    gate.open();
    if gate.verify(pin) {
        Ok(())
    } else {
        Err(CatalogError::ValidationFailed("incorrect PIN".to_string()))
    }
}

/// Surfaces a failure recorded by the adapter while loading.
fn warn_on_status(adapter: &LocalAdapter) {
    if let Some(status) = adapter.error() {
        eprintln!("dashcat: warning: {}", status.message);
    }
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let adapter = open_local_catalog(config)?;
    warn_on_status(&adapter);

    match command {
        Command::List { search, category } => {
            let mut view = CatalogView::new(adapter.records());
            view.set_category(category);
            view.set_search(search.unwrap_or_default());
            for record in view.filtered() {
                println!(
                    "{}\t[{}]\t{}\t{}",
                    record.id,
                    record.category.as_deref().unwrap_or("-"),
                    record.title,
                    record.url
                );
            }
        }
        Command::Categories => {
            for category in CatalogView::new(adapter.records()).categories() {
                println!("{category}");
            }
        }
        Command::Add { title, url, description, category, pin } => {
            unlock(config, &pin)?;
            let mut draft = DashboardDraft::new(title, url).with_description(description);
            if let Some(category) = category {
                draft = draft.with_category(category);
            }
            let id = adapter.create(draft).await?;
            println!("{id}");
        }
        Command::Update { id, title, url, description, category, pin } => {
            unlock(config, &pin)?;
            let patch = DashboardPatch {
                title,
                description,
                url,
                category: category.map(Some),
            };
            if !adapter.records().iter().any(|d| d.id == id) {
                return Err(CatalogError::ValidationFailed(format!("no dashboard with id {id}")));
            }
            adapter.update(&id, patch).await?;
        }
        Command::Remove { id, pin } => {
            unlock(config, &pin)?;
            adapter.delete(&id).await?;
        }
        Command::Export { dir } => {
            let dir = dir.unwrap_or_else(|| config.backup_dir.clone());
            let path = adapter.download_backup(&dir)?;
            println!("{}", path.display());
        }
        Command::Import { file, pin } => {
            unlock(config, &pin)?;
            let text = std::fs::read_to_string(&file)?;
            let document = BackupDocument::from_json(&text)?;
            let count = document.dashboards.len();
            adapter.import_snapshot(document).await?;
            println!("imported {count} dashboards");
        }
        Command::Share { id, target, message } => {
            let records = adapter.records();
            let record = records
                .iter()
                .find(|d| d.id == id)
                .ok_or_else(|| CatalogError::ValidationFailed(format!("no dashboard with id {id}")))?;
            let panel = SharePanel::new(record).with_message(message.unwrap_or_default());
            match target {
                Some(target) => println!("{}", panel.link(target)),
                None => {
                    println!("link\t{}", panel.copy_link());
                    for target in ShareTarget::ALL {
                        println!("{target}\t{}", panel.link(target));
                    }
                }
            }
        }
    }

    adapter.close();
    Ok(())
}
