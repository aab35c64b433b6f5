//! DualShock 3 bring-up payload and output report.

#![deny(static_mut_refs)]

use crate::types::Dualshock3Led;

/// Payload of the START_DEVICE feature request.
pub const START_DEVICE_PAYLOAD: [u8; 4] = [0x42, 0x0C, 0x00, 0x00];

/// Wire size of the output report (without report ID).
pub const OUTPUT_REPORT_LEN: usize = 30;

/// One LED timing block: always on.
const LED_PERMANENT: [u8; 5] = [0xFF, 0x27, 0x10, 0x00, 0x32];

/// Rumble duration used while a motor is active.
const RUMBLE_DURATION: u8 = 0xFE;

/// Build the output report carrying the player LED and the two motors.
///
/// Byte layout: `[0, weak_dur, weak_on, strong_dur, strong, 0 x4, led << 1,
/// 4 x LED_PERMANENT]`. The small motor is on/off only. With both motors off
/// the first nine bytes are zero.
pub fn build_output_report(led: Dualshock3Led, weak: u8, strong: u8) -> [u8; OUTPUT_REPORT_LEN] {
    let mut report = [0u8; OUTPUT_REPORT_LEN];

    if weak != 0 {
        report[1] = RUMBLE_DURATION;
        report[2] = 0x01;
    }
    if strong != 0 {
        report[3] = RUMBLE_DURATION;
        report[4] = strong;
    }

    report[9] = (led as u8) << 1;
    for block in report[10..].chunks_exact_mut(LED_PERMANENT.len()) {
        block.copy_from_slice(&LED_PERMANENT);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_led_report_layout() {
        let report = build_output_report(Dualshock3Led::Led1, 0, 0);
        assert_eq!(&report[..9], &[0u8; 9]);
        assert_eq!(report[9], 0x02);
        for block in report[10..].chunks_exact(5) {
            assert_eq!(block, &LED_PERMANENT);
        }
    }

    #[test]
    fn test_rumble_fields() {
        let report = build_output_report(Dualshock3Led::Led2, 0x80, 0xC0);
        assert_eq!(&report[1..5], &[0xFE, 0x01, 0xFE, 0xC0]);
        assert_eq!(report[9], 0x04);
    }
}
