//! Registered device families.

use anyhow::Result;
use openwpad_engine::{BridgeConfig, Family};

use crate::output;

pub async fn execute(config: &BridgeConfig, json: bool) -> Result<()> {
    output::print_families(&listing(config), json);
    Ok(())
}

/// Every family in registration order, flagged by whether `config`
/// enables it.
pub fn listing(config: &BridgeConfig) -> Vec<(Family, bool)> {
    Family::ALL
        .into_iter()
        .map(|family| (family, config.families.contains(&family)))
        .collect()
}
