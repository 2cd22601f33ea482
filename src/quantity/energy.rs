use std::{
    fmt::{Debug, Display, Formatter},
    ops::Div,
};

use crate::quantity::Quantity;

pub type KilowattHours = Quantity<f64, 1, 1>;

impl Default for KilowattHours {
    fn default() -> Self {
        Self(0.0)
    }
}

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} kWh", self.0)
    }
}

impl Debug for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}kWh", self.0)
    }
}

impl Div for KilowattHours {
    type Output = f64;

    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_ratio() {
        assert_abs_diff_eq!(KilowattHours::from(2.0) / KilowattHours::from(17.1), 0.116_959, epsilon = 1e-6);
    }
}
