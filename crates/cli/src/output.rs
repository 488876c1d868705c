//! Output formatting for CLI responses

use anyhow::Error;
use colored::Colorize;
use openwpad_engine::{Decoded, Family, ReplayEvent};
use openwpad_wiimote::{DataFormat, WpadStatus};
use serde_json::json;

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format output as JSON: {e}"),
    }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    print_json(&json!({
        "success": false,
        "error": { "message": format!("{error:#}") }
    }));
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// Space-separated upper-case hex, as captures are usually written.
pub fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn print_decoded(
    family: Family,
    decoded: &Decoded,
    format: Option<DataFormat>,
    record: &[u8],
    json: bool,
) {
    if json {
        print_json(&json!({
            "success": true,
            "family": family,
            "logical": decoded.logical,
            "extension_record": decoded.extension_record.map(hex::encode),
            "format": format,
            "record": hex::encode(record),
        }));
        return;
    }

    println!("{} {}", "Family:".bold(), family.description());
    println!("{} {}", "Logical:".bold(), decoded.logical);
    match decoded.extension_record {
        Some(ext) => println!("{} {}", "Extension record:".bold(), hex_bytes(&ext)),
        None => println!("{} {}", "Extension record:".bold(), "none".dimmed()),
    }
    let format = format.map_or_else(|| "full".to_string(), |f| format!("{f:?}"));
    println!("{} ({format}) {}", "Host record:".bold(), hex_bytes(record));
}

pub fn print_families(families: &[(Family, bool)], json: bool) {
    if json {
        let list: Vec<_> = families
            .iter()
            .map(|(family, enabled)| {
                json!({
                    "name": family,
                    "description": family.description(),
                    "ids": family.ids().iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "enabled": enabled,
                })
            })
            .collect();
        print_json(&json!({ "success": true, "families": list }));
        return;
    }

    println!("{}", "Device families (probe order):".bold());
    for (family, enabled) in families {
        let ids = family
            .ids()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let marker = if *enabled {
            "●".green()
        } else {
            "○".dimmed()
        };
        println!(
            "  {marker} {:<18} {:<30} {}",
            family.name().bold(),
            family.description(),
            ids.dimmed()
        );
    }
}

fn event_line(event: &ReplayEvent) -> String {
    match event {
        ReplayEvent::Connect { slot, status } => {
            let status = match status {
                WpadStatus::Ok => "connected".green(),
                WpadStatus::Disconnected => "disconnected".red(),
            };
            format!("slot {slot}  {status}")
        }
        ReplayEvent::Extension { slot, extension } => {
            let extension = format!("{extension:?}");
            format!("slot {slot}  extension {}", extension.cyan())
        }
        ReplayEvent::Sample { slot, record } => format!("slot {slot}  sample    {record}"),
        ReplayEvent::Read {
            slot,
            format,
            record,
        } => format!("slot {slot}  read {format:?}  {record}"),
    }
}

pub fn print_events(events: &[ReplayEvent], json: bool) {
    if json {
        print_json(&json!({ "success": true, "events": events }));
        return;
    }
    if events.is_empty() {
        println!("{}", "No host events".yellow());
        return;
    }
    for event in events {
        println!("{}", event_line(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_bytes_spacing() {
        assert_eq!(hex_bytes(&[0x00, 0x3F, 0xBE]), "00 3F BE");
        assert_eq!(hex_bytes(&[]), "");
    }

    #[test]
    fn test_event_lines() {
        colored::control::set_override(false);
        let line = event_line(&ReplayEvent::Sample {
            slot: 1,
            record: "0800".to_string(),
        });
        assert_eq!(line, "slot 1  sample    0800");
        let line = event_line(&ReplayEvent::Connect {
            slot: 0,
            status: WpadStatus::Disconnected,
        });
        assert_eq!(line, "slot 0  disconnected");
    }
}
