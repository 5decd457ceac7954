//! Shared test utilities for the landsat-diff workspace.
//!
//! This crate provides common testing infrastructure including:
//! - The notebook scenario as constants
//! - Canned service replies
//! - Approximate float assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures};
//! ```

pub mod fixtures;
pub mod responses;

pub use fixtures::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of (lat, lon) pairs.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_lat_lon_approx_eq;
///
/// assert_lat_lon_approx_eq!((14.0901, -59.9358), (14.09, -59.9358), 0.001);
/// ```
#[macro_export]
macro_rules! assert_lat_lon_approx_eq {
    (($lat1:expr, $lon1:expr), ($lat2:expr, $lon2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($lat1, $lat2, $epsilon);
        $crate::assert_approx_eq!($lon1, $lon2, $epsilon);
    }};
}
