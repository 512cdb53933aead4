use anyhow::{Context, Result};
use serde_json::Value;

use zcomx_core::remote::{submit_with_panel, HttpRemoteAction, MessagePanel};
use zcomx_core::AppConfig;

/// Submit one remote action and print the server's reply
pub async fn run(config: &AppConfig, action: &str, data: Option<&str>) -> Result<()> {
    let payload: Value = match data {
        Some(raw) => serde_json::from_str(raw).context("Action payload is not valid JSON")?,
        None => Value::Object(Default::default()),
    };

    let remote = HttpRemoteAction::new(&config.loader.base_url, config.loader.request_timeout_secs)?;
    let mut panel = MessagePanel::new();

    match submit_with_panel(&remote, &mut panel, action, payload).await {
        Some(reply) => {
            println!("{}", serde_json::to_string_pretty(&reply)?);
            Ok(())
        }
        None => {
            for message in panel.messages() {
                eprintln!("Error: {}", message.text);
            }
            anyhow::bail!("Action {} failed", action)
        }
    }
}
