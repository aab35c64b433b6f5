//! Float assertions.

/// Assert that two floating-point values are approximately equal.
///
/// ```rust
/// use padbridge_test_helpers::assert_approx_eq;
///
/// assert_approx_eq!(0.7071_f32, std::f32::consts::FRAC_1_SQRT_2, 1e-4);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr $(,)?) => {
        let left = $left;
        let right = $right;
        let tolerance = $tolerance;
        let diff = (left - right).abs();
        if diff > tolerance {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n  tolerance: `{:?}`",
                left, right, diff, tolerance
            );
        }
    };
}

/// Assert that a stick `(x, y)` pair matches the expected coordinates.
///
/// ```rust
/// use padbridge_test_helpers::assert_stick_eq;
///
/// assert_stick_eq!((0.5_f32, -0.25_f32), (0.5, -0.25));
/// ```
#[macro_export]
macro_rules! assert_stick_eq {
    ($actual:expr, $expected:expr $(,)?) => {
        let (ax, ay) = $actual;
        let (ex, ey) = $expected;
        $crate::assert_approx_eq!(ax, ex, 1e-4);
        $crate::assert_approx_eq!(ay, ey, 1e-4);
    };
}
