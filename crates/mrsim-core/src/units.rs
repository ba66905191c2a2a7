//! Physical constants and unit scale factors.
//!
//! Every quantity in the workspace is stored in SI base units (seconds,
//! metres, radians, tesla). The scale factors below convert from the
//! units used in sequence descriptions: `30.0 * DEG`, `5.0 * MS`.

use std::f64::consts::PI;

/// Proton gyromagnetic ratio, in rad·s⁻¹·T⁻¹.
pub const GAMMA: f64 = 2.0 * PI * 42.577_478_92e6;

/// One millisecond, in seconds.
pub const MS: f64 = 1e-3;

/// One millimetre, in metres.
pub const MM: f64 = 1e-3;

/// One degree, in radians.
pub const DEG: f64 = PI / 180.0;

/// One millitesla per metre, in T/m.
pub const MT_PER_M: f64 = 1e-3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_matches_proton_larmor_frequency() {
        let hz_per_tesla = GAMMA / (2.0 * PI);
        assert!((hz_per_tesla - 42.577_478_92e6).abs() < 1e-3);
    }

    #[test]
    fn degree_scale_is_exact_at_right_angle() {
        assert_eq!(90.0 * DEG, PI / 2.0);
    }
}
