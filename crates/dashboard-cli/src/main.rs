//! Domain Dashboard CLI
//!
//! Track onboarding progress of websites, stored locally or in a remote table.

mod commands;
mod config;
mod view;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::{error, info};
use view::{SortKey, StatusFilter};

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(author, version, about = "Domain Dashboard - track website onboarding tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show domains as a table
    List {
        /// Filter by name or URL
        #[arg(short, long)]
        search: Option<String>,

        /// Sort column (defaults to the configured sort)
        #[arg(long, value_enum)]
        sort: Option<SortKey>,

        /// Sort ascending
        #[arg(long, conflicts_with = "desc")]
        asc: bool,

        /// Sort descending (default)
        #[arg(long)]
        desc: bool,

        /// Filter by completion status
        #[arg(long, value_enum, default_value = "all")]
        status: StatusFilter,
    },

    /// Show domains and their tasks as a tree
    Map {
        /// Filter by name or URL
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Add a domain
    Add {
        /// Display name
        name: String,

        /// Website URL
        url: String,

        /// Domain Authority
        #[arg(long)]
        da: Option<u32>,

        /// Domain Rating
        #[arg(long)]
        dr: Option<u32>,
    },

    /// Add many domains from URLs
    Bulk {
        /// URLs to add
        urls: Vec<String>,

        /// Read URLs from a file, one per line
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Edit a domain's details
    Edit {
        /// Domain id or name
        domain: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        da: Option<u32>,

        #[arg(long)]
        dr: Option<u32>,
    },

    /// Delete a domain
    Delete {
        /// Domain id or name
        domain: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show a domain's task checklist
    Tasks {
        /// Domain id or name
        domain: String,
    },

    /// Change tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Export all domains as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace local domains with an exported JSON file
    Import {
        /// Exported JSON file
        file: PathBuf,
    },

    /// Manage remote table storage
    Remote {
        #[command(subcommand)]
        action: RemoteAction,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Flip one task between done and open
    Toggle {
        /// Domain id or name
        domain: String,
        /// Task id or name
        task: String,
    },
    /// Edit completion and notes of every task interactively
    Edit {
        /// Domain id or name
        domain: String,
    },
}

#[derive(Subcommand)]
enum RemoteAction {
    /// Connect to a remote table and migrate local domains
    Connect {
        /// API key
        #[arg(long, env = "DASHBOARD_API_KEY")]
        api_key: String,

        /// Base id
        #[arg(long)]
        base_id: String,

        /// Table name (default: Domains)
        #[arg(long)]
        table: Option<String>,

        /// API root URL
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Show which storage is in use
    Status,
    /// Stop using the remote table
    Disconnect {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose {
            "dashboard_cli=debug,dashboard_core=debug"
        } else {
            "dashboard_cli=info"
        })
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    info!("Starting Domain Dashboard CLI");

    let result = run(cli.command).await;

    if let Err(ref e) = result {
        error!("Command failed: {:#}", e);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    result
}

async fn run(command: Commands) -> Result<()> {
    let settings = config::SettingsManager::load()?;
    let mut selector = commands::open(&settings).await?;

    match command {
        Commands::List {
            search,
            sort,
            asc,
            desc,
            status,
        } => {
            let options = commands::list::ListOptions {
                search,
                sort: sort.unwrap_or_else(|| SortKey::from_setting(&settings.default_sort)),
                ascending: view::sort_ascending(asc, desc),
                status,
            };
            commands::list::run(&selector, options).await
        }
        Commands::Map { search } => commands::map::run(&selector, search).await,
        Commands::Add { name, url, da, dr } => {
            commands::domain::add(&mut selector, &name, &url, da, dr).await
        }
        Commands::Bulk { urls, file } => {
            commands::domain::bulk(&mut selector, urls, file.as_deref()).await
        }
        Commands::Edit {
            domain,
            name,
            url,
            da,
            dr,
        } => {
            let options = commands::domain::EditOptions { name, url, da, dr };
            commands::domain::edit(&mut selector, &domain, options).await
        }
        Commands::Delete { domain, yes } => {
            commands::domain::delete(&mut selector, &domain, yes).await
        }
        Commands::Tasks { domain } => commands::task::show(&selector, &domain).await,
        Commands::Task { action } => match action {
            TaskAction::Toggle { domain, task } => {
                commands::task::toggle(&mut selector, &domain, &task).await
            }
            TaskAction::Edit { domain } => commands::task::edit(&mut selector, &domain).await,
        },
        Commands::Export { output } => {
            commands::transfer::export(&selector, output.as_deref()).await
        }
        Commands::Import { file } => commands::transfer::import(&mut selector, &file).await,
        Commands::Remote { action } => match action {
            RemoteAction::Connect {
                api_key,
                base_id,
                table,
                api_url,
            } => {
                let options = commands::remote::ConnectOptions {
                    api_key,
                    base_id,
                    table,
                    api_url,
                };
                commands::remote::connect(&mut selector, options).await
            }
            RemoteAction::Status => commands::remote::status(&selector).await,
            RemoteAction::Disconnect { yes } => {
                commands::remote::disconnect(&mut selector, yes).await
            }
        },
    }
}
