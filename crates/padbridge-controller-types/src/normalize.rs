//! Deadzone and range conversion shared by all decoders.
//!
//! Sticks are handled in "127 units": the raw value centered on zero, so
//! full deflection has magnitude 127. Triggers are handled on the raw
//! `0..=255` byte.

/// Full-deflection magnitude of a centered stick axis.
pub const STICK_RANGE: f32 = 127.0;

/// Centre of an unsigned 8-bit stick axis.
pub const STICK_CENTER_U8: u8 = 127;

/// Trigger with an integer deadzone of `255 * percent / 100`.
///
/// Returns `0.0` below the deadzone and rescales the remainder to `[0, 1]`.
pub fn normalize_trigger(value: u8, deadzone_percent: u8) -> f32 {
    let deadzone = u16::from(u8::MAX) * u16::from(deadzone_percent.min(100)) / 100;
    let value = u16::from(value);
    if value < deadzone {
        return 0.0;
    }
    let span = u16::from(u8::MAX) - deadzone;
    if span == 0 {
        return 0.0;
    }
    (f32::from(value - deadzone) / f32::from(span)).clamp(0.0, 1.0)
}

/// Circular deadzone on a centered stick pair.
///
/// Inputs are in 127 units. A vector inside the deadzone radius becomes
/// exactly `(0, 0)`; outside, the magnitude is rescaled from
/// `[r, 127]` to `[0, 1]` keeping the direction.
pub fn normalize_stick(x: f32, y: f32, deadzone_percent: u8) -> (f32, f32) {
    let radius = STICK_RANGE * f32::from(deadzone_percent.min(100)) / 100.0;
    let magnitude = (x * x + y * y).sqrt();

    if magnitude <= radius || radius >= STICK_RANGE {
        return (0.0, 0.0);
    }

    let clipped = magnitude.min(STICK_RANGE);
    let ratio = ((clipped - radius) / (STICK_RANGE - radius)) / magnitude;
    (x * ratio, y * ratio)
}

/// Same as [`normalize_stick`] on a unit-scale vector (used when sticks are
/// synthesized from buttons).
pub fn clip_unit_vector(x: f32, y: f32) -> (f32, f32) {
    normalize_stick(x * STICK_RANGE, y * STICK_RANGE, 0)
}

/// [`normalize_stick`] on a pair of unsigned 8-bit axes centred at 127.
pub fn normalize_stick_u8(x: u8, y: u8, deadzone_percent: u8) -> (f32, f32) {
    normalize_stick(center_u8(x), center_u8(y), deadzone_percent)
}

/// Unsigned 8-bit stick axis to 127 units.
#[inline]
pub fn center_u8(raw: u8) -> f32 {
    f32::from(raw) - f32::from(STICK_CENTER_U8)
}

/// Signed 16-bit stick axis to 127 units.
#[inline]
pub fn scale_i16(raw: i16) -> f32 {
    f32::from(raw) * STICK_RANGE / f32::from(i16::MAX)
}

/// Full `0..=255` range to `[-1, 1]` without a deadzone.
#[inline]
pub fn u8_to_unit(raw: u8) -> f32 {
    f32::from(raw) / f32::from(u8::MAX) * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_trigger_without_deadzone() {
        assert!(approx(normalize_trigger(0, 0), 0.0));
        assert!(approx(normalize_trigger(255, 0), 1.0));
        assert!(approx(normalize_trigger(51, 0), 0.2));
    }

    #[test]
    fn test_trigger_with_deadzone() {
        // deadzone = 255 * 10 / 100 = 25
        assert!(approx(normalize_trigger(24, 10), 0.0));
        assert!(approx(normalize_trigger(25, 10), 0.0));
        assert!(approx(normalize_trigger(255, 10), 1.0));
        assert!(approx(normalize_trigger(140, 10), 115.0 / 230.0));
    }

    #[test]
    fn test_trigger_full_deadzone() {
        assert!(approx(normalize_trigger(255, 100), 0.0));
    }

    #[test]
    fn test_stick_inside_deadzone() {
        let (x, y) = normalize_stick(10.0, 10.0, 20);
        assert!(approx(x, 0.0) && approx(y, 0.0));
    }

    #[test]
    fn test_stick_full_deflection() {
        let (x, y) = normalize_stick(-127.0, 0.0, 20);
        assert!(approx(x, -1.0));
        assert!(approx(y, 0.0));

        let (x, y) = normalize_stick(127.0, 127.0, 0);
        assert!(approx((x * x + y * y).sqrt(), 1.0));
        assert!(approx(x, y));
    }

    #[test]
    fn test_clip_unit_vector() {
        let (x, y) = clip_unit_vector(-1.0, 1.0);
        assert!(approx(x, -std::f32::consts::FRAC_1_SQRT_2));
        assert!(approx(y, std::f32::consts::FRAC_1_SQRT_2));
    }

    #[test]
    fn test_conversions() {
        assert!(approx(center_u8(127), 0.0));
        assert!(approx(center_u8(0), -127.0));
        assert!(approx(scale_i16(i16::MAX), 127.0));
        assert!(approx(u8_to_unit(0), -1.0));
        assert!(approx(u8_to_unit(255), 1.0));
    }
}
