//! Property tests for the device change parsers and transfer messages.

use openwpad_hid_common::{EndpointInfo, UsbDeviceId, UsbDeviceInfo};
use openwpad_usb_hid::{RequestTag, Transfer, TransportVersion, mock, v4, v5};
use proptest::prelude::*;

fn version() -> impl Strategy<Value = TransportVersion> {
    prop_oneof![Just(TransportVersion::V4), Just(TransportVersion::V5)]
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(500))]

    /// Whatever the reply holds, walked endpoints sit on the side their
    /// direction bit says.
    #[test]
    fn prop_v4_endpoints_match_direction(data in proptest::collection::vec(any::<u8>(), 0..0x700)) {
        if let Ok(devices) = v4::parse_device_change(&data) {
            for device in devices {
                prop_assert!(device.endpoint_in.is_none_or(EndpointInfo::is_in));
                prop_assert!(device.endpoint_out.is_none_or(|ep| !ep.is_in()));
            }
        }
    }

    #[test]
    fn prop_v5_count_is_clamped(
        data in proptest::collection::vec(any::<u8>(), v5::DEVICE_CHANGE_LEN),
        count in any::<i32>(),
    ) {
        let entries = v5::parse_device_change(&data, count)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let expected = usize::try_from(count).unwrap_or(0).min(v5::MAX_DEVICES);
        prop_assert_eq!(entries.len(), expected);
    }

    #[test]
    fn prop_transfer_message_addresses_device(
        version in version(),
        dev_id in any::<u32>(),
        length in any::<u16>(),
        out in any::<bool>(),
    ) {
        let device = UsbDeviceInfo::new(dev_id, UsbDeviceId::new(0x054C, 0x0268));
        let transfer = if out {
            Transfer::InterruptOut { data: vec![0; usize::from(length % 64)] }
        } else {
            Transfer::InterruptIn { length }
        };
        let tag = RequestTag::Transfer { slot: 0, generation: 0 };
        let request = version.transfer_request(&device, &transfer, tag);
        let expected_len = match version {
            TransportVersion::V4 => v4::MESSAGE_LEN,
            TransportVersion::V5 => v5::MESSAGE_LEN,
        };
        prop_assert_eq!(request.message.len(), expected_len);
        prop_assert_eq!(version.message_dev_id(&request.message), Some(dev_id));
        prop_assert_eq!(request.host_to_device, out);
        prop_assert_eq!(request.response_len, if out { 0 } else { usize::from(length) });
    }

    /// The mock bus lists attached devices in attach order under either
    /// revision.
    #[test]
    fn prop_bus_lists_attached_devices(
        version in version(),
        ids in proptest::collection::btree_set(1u32..0x1000, 0..8),
    ) {
        let mut bus = mock::MockBus::new(version);
        for dev_id in &ids {
            bus.attach(
                UsbDeviceInfo::new(*dev_id, UsbDeviceId::new(0x12BA, 0x0100)).with_endpoint_in(
                    EndpointInfo { address: 0x81, max_packet_size: 27 },
                ),
            );
        }
        let reply = bus
            .answer(&version.device_change_request())
            .ok_or_else(|| TestCaseError::fail("device change left pending"))?;
        let devices = version
            .parse_device_change(&reply)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let listed: Vec<u32> = devices.iter().map(|d| d.dev_id).collect();
        let attached: Vec<u32> = ids.iter().copied().collect();
        prop_assert_eq!(listed, attached);
    }
}
