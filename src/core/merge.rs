use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::core::{
    daily::DailyForecast,
    period::{ForecastPeriod, MergeConflict},
};

/// Bucket the parsed periods of all forecast sources into per-day forecasts,
/// summing the estimates of periods that share an end instant.
///
/// The first conflicting duration aborts the whole merge: it means the sources
/// disagree on the interval grid and no aggregate of them is trustworthy.
pub fn merge_forecasts<S>(sources: S) -> Result<BTreeMap<NaiveDate, DailyForecast>, MergeConflict>
where
    S: IntoIterator,
    S::Item: IntoIterator<Item = ForecastPeriod>,
{
    let mut days = BTreeMap::new();
    for source in sources {
        for period in source {
            days.entry(period.date())
                .or_insert_with(|| DailyForecast::new(period.date()))
                .fold(period)?;
        }
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{Local, TimeDelta, TimeZone};

    use super::*;
    use crate::{prelude::Result, quantity::power::Kilowatts};

    fn period(day: u32, hour: u32, p90: f64) -> ForecastPeriod {
        ForecastPeriod {
            end: Local.with_ymd_and_hms(2026, 6, day, hour, 0, 0).unwrap(),
            duration: TimeDelta::minutes(30),
            p10: Kilowatts::from(p90 / 2.0),
            p50: Kilowatts::from(p90 * 0.75),
            p90: Kilowatts::from(p90),
        }
    }

    #[test]
    fn test_buckets_by_local_date() -> Result {
        let days = merge_forecasts([vec![period(15, 10, 1.0), period(16, 10, 1.0)]])?;
        assert_eq!(days.len(), 2);
        for (date, daily) in &days {
            assert_eq!(*date, daily.date());
            assert_eq!(daily.len(), 1);
        }
        Ok(())
    }

    #[test]
    fn test_sums_across_sources() -> Result {
        let days =
            merge_forecasts([vec![period(15, 10, 4.0)], vec![period(15, 10, 2.0)]])?;
        let daily = &days[&period(15, 10, 4.0).date()];
        assert_eq!(daily.len(), 1);
        assert_abs_diff_eq!(daily.periods().next().unwrap().p90.0, 6.0);
        Ok(())
    }

    #[test]
    fn test_remerging_the_same_source_is_idempotent() -> Result {
        let source = vec![period(15, 10, 4.0), period(15, 11, 2.0)];
        let once = merge_forecasts([source.clone()])?;
        let twice = merge_forecasts([source.clone(), source])?;
        let date = period(15, 10, 4.0).date();
        for (lhs, rhs) in once[&date].periods().zip(twice[&date].periods()) {
            assert_eq!(lhs, rhs);
        }
        Ok(())
    }

    #[test]
    fn test_duration_mismatch_aborts() {
        let conflicting = ForecastPeriod { duration: TimeDelta::hours(1), ..period(15, 10, 2.0) };
        let result = merge_forecasts([vec![period(15, 10, 4.0)], vec![conflicting]]);
        assert!(result.is_err());
    }
}
