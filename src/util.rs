use crate::{types::Float, PI, TWO_PI};

/// Wrap an angle into the half-open interval (-π, π]. Angles already in
/// range come back unchanged.
pub fn normalize_angle(angle: Float) -> Float {
    let mut angle = angle;
    // Far out of range one period is below the ulp, so reduce first
    if angle.abs() > TWO_PI {
        angle = angle.rem_euclid(TWO_PI);
    }
    while angle > PI {
        angle -= TWO_PI;
    }
    while angle <= -PI {
        angle += TWO_PI;
    }
    angle
}

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        // Helper function to log to the browser console
        pub fn console_log(message: &str) {
            web_sys::console::log_1(&message.into());
        }
    } else {
        pub fn console_log(message: &str) {
            println!("{}", message);
        }
    }
}

/// Format-style logging that ends up in the browser console on wasm and on
/// stdout everywhere else.
#[macro_export]
macro_rules! flog {
    ($($arg:tt)*) => {
        $crate::util::console_log(&format!($($arg)*))
    };
}

pub fn assert_close(a: Float, b: Float, tol: Float) {
    assert!((a - b).abs() < tol, "{} != {}", a, b);
}

#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr, $tolerance:expr) => {
        let left = $left;
        let right = $right;
        let tol = $tolerance;
        let diff = (left - right).abs();
        if diff > tol {
            panic!(
                "assertion failed: {} ~= {} \
                (tolerance: {}, difference: {})",
                left, right, tol, diff
            );
        }
    };
}

#[macro_export]
macro_rules! assert_vec_close {
    ($left:expr, $right:expr, $tolerance:expr) => {
        let left = $left;
        let right = $right;
        let tol = $tolerance;
        for (a, b) in left.iter().zip(right.iter()) {
            $crate::assert_close!(a, b, tol);
        }
    };
}
