//! Property-based tests for the DualShock 4 protocol crate.

use padbridge_controller_types::{AnalogAxis, ControllerConfig, RgbaColor};
use padbridge_hid_dualshock4_protocol::{
    INPUT_REPORT_LEN, build_output_report, parse_input_report, report_ids,
};
use proptest::prelude::*;

// ── Input parsing ───────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_parse_never_panics(data in proptest::collection::vec(any::<u8>(), 0..128)) {
        let _state = parse_input_report(&data);
    }

    #[test]
    fn prop_hat_sets_at_most_two_directions(
        mut data in proptest::collection::vec(any::<u8>(), INPUT_REPORT_LEN),
    ) {
        data[0] = report_ids::INPUT;
        let state = parse_input_report(&data).ok_or_else(|| TestCaseError::fail("parse failed"))?;
        let raw = state.to_raw_input(&ControllerConfig::default());
        let active = [raw.dpad_up(), raw.dpad_down(), raw.dpad_left(), raw.dpad_right()]
            .iter()
            .filter(|&&d| d)
            .count();
        prop_assert!(active <= 2);
        prop_assert!(!(raw.dpad_up() && raw.dpad_down()));
        prop_assert!(!(raw.dpad_left() && raw.dpad_right()));
        if state.hat > 7 {
            prop_assert_eq!(active, 0);
        }
    }

    #[test]
    fn prop_sticks_within_unit_circle(
        lx in any::<u8>(), ly in any::<u8>(), deadzone in 0u8..=100,
    ) {
        let mut data = [0u8; INPUT_REPORT_LEN];
        data[0] = report_ids::INPUT;
        data[1] = lx;
        data[2] = ly;
        let config = ControllerConfig::default().with_deadzone(AnalogAxis::X, deadzone);
        let raw = parse_input_report(&data)
            .ok_or_else(|| TestCaseError::fail("parse failed"))?
            .to_raw_input(&config);
        let (x, y) = (raw.axis(AnalogAxis::X), raw.axis(AnalogAxis::Y));
        prop_assert!((x * x + y * y).sqrt() <= 1.0 + 1e-4);
    }
}

// ── Output report ───────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_output_header_fixed(weak in any::<u8>(), strong in any::<u8>(), r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let report = build_output_report(weak, strong, RgbaColor::new(r, g, b, 0xFF));
        prop_assert_eq!(&report[..4], &[0x05, 0x07, 0x00, 0x00]);
        prop_assert_eq!(&report[4..9], &[weak, strong, r, g, b]);
    }
}
