use std::collections::{BTreeMap, btree_map::Entry};

use chrono::{DateTime, Local, NaiveDate};

use crate::{
    core::period::{ConfidenceBand, ForecastPeriod, MergeConflict},
    quantity::{energy::KilowattHours, power::Kilowatts},
};

/// All merged forecast periods of one local calendar day, keyed and ordered by
/// the period end instant.
#[derive(Debug)]
#[must_use]
pub struct DailyForecast {
    date: NaiveDate,
    periods: BTreeMap<DateTime<Local>, ForecastPeriod>,
}

impl DailyForecast {
    pub fn new(date: NaiveDate) -> Self {
        Self { date, periods: BTreeMap::new() }
    }

    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Periods in ascending end-instant order.
    pub fn periods(&self) -> impl Iterator<Item = &ForecastPeriod> {
        self.periods.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Fold the period into its keyed slot, summing the estimates of periods
    /// sharing the end instant.
    pub fn fold(&mut self, period: ForecastPeriod) -> Result<(), MergeConflict> {
        debug_assert_eq!(period.date(), self.date);
        match self.periods.entry(period.end) {
            Entry::Vacant(entry) => {
                entry.insert(period);
            }
            Entry::Occupied(mut entry) => {
                let combined = entry.get().combine(period)?;
                entry.insert(combined);
            }
        }
        Ok(())
    }

    /// Total energy above the inverter ceiling at the given confidence band.
    #[must_use]
    pub fn excess(&self, band: ConfidenceBand, ceiling: Kilowatts) -> KilowattHours {
        self.periods.values().map(|period| period.excess(band, ceiling)).sum()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::prelude::Result;

    fn period(hour: u32, p90: f64) -> ForecastPeriod {
        ForecastPeriod {
            end: Local.with_ymd_and_hms(2026, 6, 15, hour, 0, 0).unwrap(),
            duration: TimeDelta::hours(1),
            p10: Kilowatts::from(p90 / 2.0),
            p50: Kilowatts::from(p90 * 0.75),
            p90: Kilowatts::from(p90),
        }
    }

    #[test]
    fn test_fold_keeps_time_order() -> Result {
        let mut daily = DailyForecast::new(period(12, 1.0).date());
        daily.fold(period(12, 1.0))?;
        daily.fold(period(10, 1.0))?;
        daily.fold(period(11, 1.0))?;
        let ends: Vec<_> = daily.periods().map(|period| period.end).collect();
        assert!(ends.is_sorted());
        assert_eq!(daily.len(), 3);
        Ok(())
    }

    #[test]
    fn test_fold_combines_same_key() -> Result {
        let mut daily = DailyForecast::new(period(12, 4.0).date());
        daily.fold(period(12, 4.0))?;
        daily.fold(period(12, 2.0))?;
        assert_eq!(daily.len(), 1);
        let period = daily.periods().next().unwrap();
        assert_abs_diff_eq!(period.p90.0, 6.0);
        Ok(())
    }

    #[test]
    fn test_excess_per_band() -> Result {
        let mut daily = DailyForecast::new(period(12, 10.0).date());
        daily.fold(period(12, 10.0))?;
        daily.fold(period(13, 9.0))?;
        let ceiling = Kilowatts::from(8.0);
        assert_abs_diff_eq!(daily.excess(ConfidenceBand::P90, ceiling).0, 3.0);
        assert_abs_diff_eq!(daily.excess(ConfidenceBand::P50, ceiling).0, 0.0);
        assert_abs_diff_eq!(daily.excess(ConfidenceBand::P10, ceiling).0, 0.0);
        Ok(())
    }
}
