use log::warn;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use crate::api::client::ApiClient;
use crate::app::Config;
use crate::error::{AppError, ConfigError};

/// Asks for each missing credential in turn. A closed input stream leaves
/// the remaining fields empty.
async fn prompt_missing<R>(mut config: Config, lines: &mut Lines<R>) -> std::io::Result<Config>
where
    R: AsyncBufRead + Unpin,
{
    let fields = [
        ("Airtable API key", &mut config.api_key),
        ("Base id (app…)", &mut config.base_id),
        ("Contacts table id (tbl…)", &mut config.contacts_table_id),
        ("Messages table id (tbl…)", &mut config.messages_table_id),
    ];
    for (label, slot) in fields {
        if !slot.trim().is_empty() {
            continue;
        }
        print!("{label}: ");
        std::io::stdout().flush()?;
        match lines.next_line().await? {
            Some(value) => *slot = value.trim().to_string(),
            None => break,
        }
    }
    Ok(config)
}

/// First-run setup: collect credentials, check them against the contacts
/// table, and persist them whether or not the check succeeds.
pub async fn show_login_window(config: Config) -> Result<Config, AppError> {
    println!("Connect to Airtable");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let config = prompt_missing(config, &mut lines).await?;
    config.validate()?;

    let client = ApiClient::new(&config)?;
    let status = match client.fetch_contacts().await {
        Ok(contacts) => format!("Connected ({} contacts)", contacts.len()),
        Err(e) => {
            warn!("credential check failed: {e}");
            "Saved (could not reach the contacts table)".to_string()
        }
    };
    println!("{status}");

    match config.save() {
        Ok(()) => {}
        Err(ConfigError::NoConfigDir) => warn!("no config directory; settings not saved"),
        Err(e) => println!("Failed to save settings: {e}"),
    }
    Ok(config)
}
