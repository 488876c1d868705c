//! Scripted session replay against the mock transport.

use std::path::Path;

use anyhow::{Context, Result};
use openwpad_engine::{BridgeConfig, ReplayError, Session, run_session};
use tracing::info;

use crate::error::CliError;
use crate::output;

pub async fn execute(path: &Path, config: &BridgeConfig, json: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read session file: {}", path.display()))?;
    let mut session: Session = serde_json::from_str(&content)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to parse session file: {}", path.display()))?;
    if session.config.is_none() {
        session.config = Some(config.clone());
    }
    info!(
        path = %path.display(),
        transport = %session.transport,
        steps = session.steps.len(),
        "replaying session"
    );

    let events = run_session(&session).map_err(|e| match e {
        ReplayError::Bridge(inner) => CliError::SessionFailed(inner.to_string()),
        other => CliError::InvalidInput(other.to_string()),
    })?;

    output::print_events(&events, json);
    Ok(())
}
