//! Property-based tests for the Xbox One protocol crate.

use padbridge_controller_types::{AnalogAxis, ControllerConfig};
use padbridge_hid_xboxone_protocol::{
    XboxOneInputState, XboxOneReport, build_rumble_packet, is_xbox_one_product,
    parse_input_report, product_ids,
};
use proptest::prelude::*;

// ── Product IDs ─────────────────────────────────────────────────────────────

#[test]
fn test_known_products_detected() {
    for pid in [
        product_ids::XBOX_ONE,
        product_ids::XBOX_ONE_2015,
        product_ids::XBOX_ONE_ELITE,
        product_ids::XBOX_ONE_S,
        product_ids::XBOX_ONE_ELITE_2,
        product_ids::XBOX_SERIES,
    ] {
        assert!(is_xbox_one_product(pid), "{pid:#06x}");
    }
    assert!(!is_xbox_one_product(0x028E));
}

// ── Input parsing ───────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_parse_never_panics(data in proptest::collection::vec(any::<u8>(), 0..64)) {
        let _report = parse_input_report(&data);
    }

    #[test]
    fn prop_input_parse_preserves_fields(
        buttons in any::<u16>(),
        lt in any::<u16>(),
        rt in any::<u16>(),
        sticks in any::<[i16; 4]>(),
    ) {
        let mut data = [0u8; 18];
        data[0] = 0x20;
        data[4..6].copy_from_slice(&buttons.to_le_bytes());
        data[6..8].copy_from_slice(&lt.to_le_bytes());
        data[8..10].copy_from_slice(&rt.to_le_bytes());
        for (i, v) in sticks.iter().enumerate() {
            data[10 + i * 2..12 + i * 2].copy_from_slice(&v.to_le_bytes());
        }
        let expected = XboxOneInputState {
            buttons,
            trigger_left: lt,
            trigger_right: rt,
            left_x: sticks[0],
            left_y: sticks[1],
            right_x: sticks[2],
            right_y: sticks[3],
        };
        prop_assert_eq!(parse_input_report(&data), Some(XboxOneReport::Input(expected)));
    }

    #[test]
    fn prop_raw_axes_bounded(
        lt in any::<u16>(), rt in any::<u16>(), sticks in any::<[i16; 4]>(), deadzone in 0u8..=100,
    ) {
        let state = XboxOneInputState {
            buttons: 0,
            trigger_left: lt,
            trigger_right: rt,
            left_x: sticks[0],
            left_y: sticks[1],
            right_x: sticks[2],
            right_y: sticks[3],
        };
        let config = ControllerConfig::default().with_deadzone(AnalogAxis::X, deadzone);
        let raw = state.to_raw_input(false, &config);
        let (x, y) = (raw.axis(AnalogAxis::X), raw.axis(AnalogAxis::Y));
        prop_assert!((x * x + y * y).sqrt() <= 1.0 + 1e-4);
        prop_assert!((0.0..=1.0).contains(&raw.axis(AnalogAxis::Rx)));
        prop_assert!((0.0..=1.0).contains(&raw.axis(AnalogAxis::Ry)));
    }

    #[test]
    fn prop_rumble_places_magnitudes(strong in any::<u8>(), weak in any::<u8>()) {
        let packet = build_rumble_packet(strong, weak);
        prop_assert_eq!(packet[8], strong);
        prop_assert_eq!(packet[9], weak);
        prop_assert_eq!(packet[0], 0x09);
    }
}
