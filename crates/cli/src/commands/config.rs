//! Configuration file helpers.

use std::path::Path;

use anyhow::{Context, Result};
use openwpad_engine::BridgeConfig;
use serde_json::json;
use tracing::info;

use crate::error::CliError;

pub async fn init(path: &Path, force: bool, json: bool) -> Result<()> {
    let exists = tokio::fs::try_exists(path)
        .await
        .with_context(|| format!("Failed to probe {}", path.display()))?;
    if exists && !force {
        return Err(CliError::AlreadyExists(path.display().to_string()).into());
    }

    BridgeConfig::default().save(path).await?;
    info!(path = %path.display(), "wrote default configuration");

    if json {
        let out = json!({ "success": true, "path": path.display().to_string() });
        println!("{}", serde_json::to_string_pretty(&out).map_err(CliError::from)?);
    } else {
        println!("Wrote default configuration to {}", path.display());
    }
    Ok(())
}
