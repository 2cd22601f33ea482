use chrono::{DateTime, Local, NaiveDate, TimeDelta};

use crate::quantity::{energy::KilowattHours, power::Kilowatts};

/// Forecast percentile the estimates are given at.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConfidenceBand {
    P10,
    P50,
    P90,
}

/// One forecast interval: confidence-banded power estimates for the time span
/// ending at `end`.
///
/// Within one day, a period is identified by its `(end, duration)` pair.
/// Estimates of same-key periods coming from different sites are additive.
#[derive(Copy, Clone, Debug, PartialEq)]
#[must_use]
pub struct ForecastPeriod {
    /// Period end instant in the local zone.
    pub end: DateTime<Local>,

    pub duration: TimeDelta,

    pub p10: Kilowatts,
    pub p50: Kilowatts,
    pub p90: Kilowatts,
}

/// Inconsistent source data: two entries share a period end but disagree on
/// the duration.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("conflicting durations {existing} and {incoming} for the period ending at {end}")]
pub struct MergeConflict {
    pub end: DateTime<Local>,
    pub existing: TimeDelta,
    pub incoming: TimeDelta,
}

impl ForecastPeriod {
    pub fn start(&self) -> DateTime<Local> {
        self.end - self.duration
    }

    /// Local calendar date the period belongs to.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    pub const fn power(&self, band: ConfidenceBand) -> Kilowatts {
        match band {
            ConfidenceBand::P10 => self.p10,
            ConfidenceBand::P50 => self.p50,
            ConfidenceBand::P90 => self.p90,
        }
    }

    /// Expected delivered energy at the conservative P90 estimate.
    #[must_use]
    pub fn energy(&self) -> KilowattHours {
        self.p90 * self.duration
    }

    /// Energy above the inverter ceiling, which cannot be delivered to load or
    /// grid and ends up stored or wasted.
    #[must_use]
    pub fn excess(&self, band: ConfidenceBand, ceiling: Kilowatts) -> KilowattHours {
        (self.power(band) - ceiling).max(Kilowatts::ZERO) * self.duration
    }

    /// Unused inverter throughput: energy the battery could discharge during
    /// the period without exceeding the ceiling.
    #[must_use]
    pub fn headroom(&self, ceiling: Kilowatts) -> KilowattHours {
        (ceiling - self.p90).max(Kilowatts::ZERO) * self.duration
    }

    /// Fold another record for the same `(end, duration)` key into this one,
    /// summing the estimates of all three bands.
    ///
    /// Folding a field-for-field identical record is a no-op, so re-merging
    /// the same source does not double-count.
    pub fn combine(self, other: Self) -> Result<Self, MergeConflict> {
        if self == other {
            return Ok(self);
        }
        if self.duration != other.duration {
            return Err(MergeConflict {
                end: self.end,
                existing: self.duration,
                incoming: other.duration,
            });
        }
        Ok(Self {
            p10: self.p10 + other.p10,
            p50: self.p50 + other.p50,
            p90: self.p90 + other.p90,
            ..self
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    use super::*;
    use crate::prelude::Result;

    fn period(p90: f64) -> ForecastPeriod {
        ForecastPeriod {
            end: Local.with_ymd_and_hms(2026, 6, 15, 11, 0, 0).unwrap(),
            duration: TimeDelta::minutes(30),
            p10: Kilowatts::from(p90 / 2.0),
            p50: Kilowatts::from(p90 * 0.75),
            p90: Kilowatts::from(p90),
        }
    }

    #[test]
    fn test_start() {
        let start = period(1.0).start();
        assert_eq!(start, Local.with_ymd_and_hms(2026, 6, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_combine_sums_all_bands() -> Result {
        let combined = period(4.0).combine(period(2.0))?;
        assert_abs_diff_eq!(combined.p10.0, 3.0);
        assert_abs_diff_eq!(combined.p50.0, 4.5);
        assert_abs_diff_eq!(combined.p90.0, 6.0);
        Ok(())
    }

    #[test]
    fn test_combine_with_identical_record_is_noop() -> Result {
        let combined = period(4.0).combine(period(4.0))?;
        assert_eq!(combined, period(4.0));
        Ok(())
    }

    #[test]
    fn test_combine_duration_mismatch() {
        let other = ForecastPeriod { duration: TimeDelta::hours(1), ..period(2.0) };
        assert!(period(4.0).combine(other).is_err());
    }

    #[test]
    fn test_excess_above_ceiling() {
        let period = ForecastPeriod { duration: TimeDelta::hours(1), ..period(10.0) };
        assert_abs_diff_eq!(period.excess(ConfidenceBand::P90, Kilowatts::from(8.0)).0, 2.0);
        assert_abs_diff_eq!(period.excess(ConfidenceBand::P10, Kilowatts::from(8.0)).0, 0.0);
    }

    #[test]
    fn test_headroom_below_ceiling() {
        let period = ForecastPeriod { duration: TimeDelta::hours(1), ..period(3.0) };
        assert_abs_diff_eq!(period.headroom(Kilowatts::from(8.0)).0, 5.0);
        assert_abs_diff_eq!(period.headroom(Kilowatts::from(2.0)).0, 0.0);
    }
}
