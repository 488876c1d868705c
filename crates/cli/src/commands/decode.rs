//! Offline decode of one captured input report.

use anyhow::Result;
use openwpad_engine::config::OutputConfig;
use openwpad_engine::{Driver, Family};
use tracing::debug;

use crate::error::CliError;
use crate::output;

/// Parse a capture written as hex, ignoring whitespace and `:` separators.
pub fn parse_capture(text: &str) -> Result<Vec<u8>, CliError> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&compact).map_err(|e| CliError::InvalidInput(format!("report hex: {e}")))
}

pub async fn execute(family: &str, report: &str, json: bool) -> Result<()> {
    let family =
        Family::from_name(family).ok_or_else(|| CliError::UnknownFamily(family.to_string()))?;
    let data = parse_capture(report)?;
    debug!(%family, len = data.len(), "decoding capture");

    let decoded = family
        .decode(&data)
        .map_err(|e| CliError::InvalidInput(e.to_string()))?;
    let format = Driver::new(family, &OutputConfig::default())
        .personality()
        .map(|p| p.format);
    let record = match format {
        Some(format) => decoded.record.bytes_for(format),
        None => decoded.record.to_bytes().to_vec(),
    };

    output::print_decoded(family, &decoded, format, &record, json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_capture_accepts_separators() -> Result<(), CliError> {
        assert_eq!(parse_capture("00 3f:BE\n7f")?, vec![0x00, 0x3F, 0xBE, 0x7F]);
        assert!(matches!(parse_capture("0g"), Err(CliError::InvalidInput(_))));
        assert!(matches!(parse_capture("abc"), Err(CliError::InvalidInput(_))));
        Ok(())
    }
}
