//! Integer time identifiers.

use std::fmt;
use std::ops::{Add, Rem};

/// A point on the sequence clock, in whole milliseconds.
///
/// All scheduling decisions are made on `Tick` values so that TR-boundary
/// and TE-midpoint tests are exact integer comparisons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tick(pub u64);

impl Tick {
    /// Zero on the sequence clock.
    pub const ZERO: Tick = Tick(0);

    /// The tick as seconds.
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 * 1e-3
    }

    /// The tick as milliseconds.
    pub fn as_millis(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ms", self.0)
    }
}

impl From<u64> for Tick {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl Add for Tick {
    type Output = Tick;

    fn add(self, rhs: Tick) -> Tick {
        Tick(self.0 + rhs.0)
    }
}

impl Rem for Tick {
    type Output = Tick;

    fn rem(self, rhs: Tick) -> Tick {
        Tick(self.0 % rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_converts_to_seconds() {
        assert_eq!(Tick(1500).as_seconds(), 1.5);
        assert_eq!(Tick(0).as_seconds(), 0.0);
    }

    #[test]
    fn tick_arithmetic_is_integer() {
        assert_eq!(Tick(1000) % Tick(200), Tick(0));
        assert_eq!(Tick(1100) % Tick(200), Tick(100));
        assert_eq!(Tick(10) + Tick(20), Tick(30));
    }

    #[test]
    fn tick_display_shows_unit() {
        assert_eq!(Tick(25).to_string(), "25 ms");
    }
}
