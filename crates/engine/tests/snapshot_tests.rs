//! Snapshots of what a scripted session shows the host, and of the
//! configuration file layout.

use insta::assert_snapshot;
use openwpad_engine::{BridgeConfig, Family, Session, Step, run_session};
use openwpad_usb_hid::TransportVersion;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn test_snapshot_default_config_file() -> TestResult {
    let json = serde_json::to_string(&BridgeConfig::default())?;
    assert_snapshot!(json, @r#"{"slots":4,"families":["gh-guitar","gh-drums","dj-turntable","santroller","taiko","ds3","ds4","xbox360-receiver"],"outputs":{"ds3":{"leds":true,"rumble":true},"ds4":{"leds":true,"rumble":true}},"auto_reconnect":true,"log_filter":"info"}"#);
    Ok(())
}

#[test]
fn test_snapshot_turntable_plug_cycle() -> TestResult {
    let session = Session {
        transport: TransportVersion::V4,
        config: None,
        steps: vec![
            Step::Attach {
                dev_id: 3,
                family: Some(Family::DjTurntable),
                vendor_id: None,
                product_id: None,
                in_packet: Some(64),
            },
            Step::Detach { dev_id: 3 },
        ],
    };
    let events = run_session(&session)?;
    let lines: Vec<String> = events
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<_, _>>()?;
    assert_snapshot!(lines.join("\n"), @r#"
    {"event":"connect","slot":0,"status":"Ok"}
    {"event":"extension","slot":0,"extension":"Turntable"}
    {"event":"connect","slot":0,"status":"Disconnected"}
    "#);
    Ok(())
}

#[test]
fn test_snapshot_unsupported_device_is_silent() -> TestResult {
    let session = Session {
        transport: TransportVersion::V5,
        config: None,
        steps: vec![Step::Attach {
            dev_id: 9,
            family: None,
            vendor_id: Some(0x046D),
            product_id: Some(0xC24F),
            in_packet: None,
        }],
    };
    let events = run_session(&session)?;
    assert_snapshot!(format!("{events:?}"), @"[]");
    Ok(())
}
