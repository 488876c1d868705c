//! Bridge configuration.
//!
//! Stored as pretty-printed JSON. A missing file yields the defaults; a
//! present one is parsed and validated.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::family::Family;

/// Emulated remotes the host subsystem exposes.
pub const MAX_SLOTS: usize = 4;

/// Complete bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Number of emulated remote slots, `1..=MAX_SLOTS`.
    pub slots: usize,
    /// Enabled families in probe order.
    pub families: Vec<Family>,
    pub outputs: OutputConfig,
    /// Re-initialise a slot whose poll loop failed when the next
    /// enumeration pass still lists its device. When off, the slot is
    /// released and the device is ignored until it is unplugged.
    pub auto_reconnect: bool,
    /// `tracing` filter directive used by the CLI.
    pub log_filter: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            slots: MAX_SLOTS,
            families: Family::ALL.to_vec(),
            outputs: OutputConfig::default(),
            auto_reconnect: true,
            log_filter: "info".to_string(),
        }
    }
}

/// Per-family output features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub ds3: OutputToggles,
    pub ds4: OutputToggles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputToggles {
    /// Player LEDs, or the lightbar colour.
    pub leds: bool,
    /// Forward the host's motor requests.
    pub rumble: bool,
}

impl Default for OutputToggles {
    fn default() -> Self {
        Self {
            leds: true,
            rumble: true,
        }
    }
}

impl BridgeConfig {
    /// Load from `path`, falling back to the defaults when it does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed, or when it holds
    /// invalid values.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !tokio::fs::try_exists(path)
            .await
            .with_context(|| format!("Failed to probe config file: {}", path.display()))?
        {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: BridgeConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Write to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails when the directory or file cannot be written.
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// # Errors
    ///
    /// Names the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.slots == 0 || self.slots > MAX_SLOTS {
            anyhow::bail!("Invalid slot count: {} (1..={MAX_SLOTS})", self.slots);
        }

        if self.families.is_empty() {
            anyhow::bail!("No device families enabled");
        }

        for (i, family) in self.families.iter().enumerate() {
            if self.families.iter().skip(i + 1).any(|other| other == family) {
                anyhow::bail!("Device family listed twice: {family}");
            }
        }

        if self.log_filter.trim().is_empty() {
            anyhow::bail!("Empty log filter");
        }

        Ok(())
    }
}
