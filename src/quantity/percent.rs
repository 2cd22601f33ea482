use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

/// State-of-charge percentage, stored in percent points.
#[derive(
    Clone,
    Copy,
    Deserialize,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Sub,
    derive_more::SubAssign,
)]
pub struct Percent(pub f64);

impl Percent {
    pub const ZERO: Self = Self(0.0);

    /// The percentage as a `0.0..=1.0` fraction.
    #[must_use]
    pub fn to_proportion(self) -> f64 {
        self.0 / 100.0
    }

    pub fn max(self, rhs: Self) -> Self {
        if rhs > self { rhs } else { self }
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl Debug for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_to_proportion() {
        assert_abs_diff_eq!(Percent(95.0).to_proportion(), 0.95);
    }

    #[test]
    fn test_max() {
        assert_eq!(Percent(10.0).max(Percent(68.3)), Percent(68.3));
        assert_eq!(Percent(68.3).max(Percent(10.0)), Percent(68.3));
    }
}
