//! Remote table storage commands

use anyhow::Result;
use colored::Colorize;
use dashboard_core::{BackendSelector, RemoteConfig};

pub struct ConnectOptions {
    pub api_key: String,
    pub base_id: String,
    pub table: Option<String>,
    pub api_url: Option<String>,
}

impl ConnectOptions {
    pub fn into_config(self) -> RemoteConfig {
        let mut config = RemoteConfig::new(self.api_key.trim(), self.base_id.trim());
        if let Some(table) = self.table {
            config = config.with_table_name(table.trim());
        }
        if let Some(api_url) = self.api_url {
            config = config.with_api_url(api_url.trim());
        }
        config
    }
}

pub async fn connect(selector: &mut BackendSelector, options: ConnectOptions) -> Result<()> {
    let config = options.into_config();
    let table = config.table_name.clone();

    println!("{}", format!("🔗 Connecting to table '{}'...", table).blue());
    let migrated = selector.connect_remote(config).await?;

    println!("{}", "✅ Remote storage connected".green());
    if migrated > 0 {
        println!("   Migrated {} local domains to '{}'", migrated, table);
    }
    println!("   {} domains available", selector.domains().len());
    Ok(())
}

pub async fn status(selector: &BackendSelector) -> Result<()> {
    println!("{}", "🗄  Storage".blue().bold());
    println!();

    match selector.remote_config() {
        Some(config) => {
            println!("   Backend:  {}", "remote".green());
            println!("   API:      {}", config.api_url);
            println!("   Base:     {}", config.base_id.cyan());
            println!("   Table:    {}", config.table_name.cyan());
            println!("   API key:  {}", config.masked_key().dimmed());
        }
        None => {
            println!("   Backend:  {}", "local".yellow());
            println!();
            println!(
                "   Connect with: {}",
                "dashboard remote connect --api-key <key> --base-id <base>".dimmed()
            );
        }
    }
    println!("   Domains:  {}", selector.domains().len());
    Ok(())
}

pub async fn disconnect(selector: &mut BackendSelector, yes: bool) -> Result<()> {
    if !selector.using_remote() {
        println!("{}", "Remote storage is not connected".dimmed());
        return Ok(());
    }

    if !yes {
        let confirm: bool = dialoguer::Confirm::new()
            .with_prompt("Stop using the remote table? Remote rows are kept")
            .default(false)
            .interact()?;

        if !confirm {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    selector.disconnect_remote().await?;
    println!("{}", "✅ Switched to local storage".green());
    Ok(())
}
