use chrono::{DateTime, Local, TimeDelta};
use itertools::Itertools;

use crate::{
    core::{daily::DailyForecast, period::ConfidenceBand},
    prelude::*,
    quantity::{energy::KilowattHours, percent::Percent, power::Kilowatts},
};

/// Minutes of lead time granted when the computed discharge start has already
/// passed: an actuator must never be pointed at an elapsed instant.
const START_GRACE_MINUTES: i64 = 5;

/// Battery and inverter parameters driving the charge plan.
#[derive(Copy, Clone, Debug, bon::Builder)]
pub struct PlanConfig {
    /// Usable battery capacity.
    pub battery_capacity: KilowattHours,

    /// Maximum AC-DC throughput of the inverter.
    pub inverter_ceiling: Kilowatts,

    /// State of charge the battery is recharged to after the surplus.
    pub target_max: Percent,

    /// Floor below which the battery is never discharged.
    pub min_reserve: Percent,

    /// Margin kept below `target_max` so the battery can absorb forecast
    /// error while recharging.
    pub charge_buffer: Percent,
}

/// Discharge plan for a single day.
///
/// A plan with zero `expected_excess` has every other field absent. A partial
/// plan (positive excess, some fields absent) is a legitimate outcome: it
/// means the day's forecast does not leave enough room to act, and callers
/// must not push it to an actuator.
#[derive(Copy, Clone, Debug, PartialEq)]
#[must_use]
pub struct ChargePlan {
    /// Total P90 energy above the inverter ceiling over the day.
    pub expected_excess: KilowattHours,

    /// When to start discharging towards `discharge_target`.
    pub discharge_start: Option<DateTime<Local>>,

    /// State of charge to discharge down to before the surplus begins.
    pub discharge_target: Option<Percent>,

    /// When the surplus begins and the reserve may start rebuilding.
    pub reserve_rebuild_start: Option<DateTime<Local>>,

    /// When the surplus ends and grid-independent operation can resume.
    pub clean_backup_start: Option<DateTime<Local>>,
}

impl ChargePlan {
    /// Plan for a day without any expected surplus.
    const fn idle() -> Self {
        Self {
            expected_excess: KilowattHours::ZERO,
            discharge_start: None,
            discharge_target: None,
            reserve_rebuild_start: None,
            clean_backup_start: None,
        }
    }

    /// Every field needed for actuation is populated.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.discharge_start.is_some()
            && self.discharge_target.is_some()
            && self.reserve_rebuild_start.is_some()
            && self.clean_backup_start.is_some()
    }
}

/// Derive the day's charge plan.
///
/// `now` is read once by the caller so that a single planning run is
/// deterministic; it only matters for clamping an already-elapsed discharge
/// start.
pub fn charge_plan(config: &PlanConfig, now: DateTime<Local>, forecast: &DailyForecast) -> ChargePlan {
    let ceiling = config.inverter_ceiling;
    let expected_excess = forecast.excess(ConfidenceBand::P90, ceiling);
    if expected_excess <= KilowattHours::ZERO {
        return ChargePlan::idle();
    }

    let periods = forecast.periods().copied().collect_vec();

    // Forward scan: find where the surplus block begins and ends.
    let mut scan = SurplusScan::BeforeSurplus;
    let mut first_surplus = None;
    let mut reserve_rebuild_start = None;
    let mut clean_backup_start = None;
    for (index, period) in periods.iter().enumerate() {
        let has_excess = period.excess(ConfidenceBand::P90, ceiling) > KilowattHours::ZERO;
        let (next, edge) = scan.step(has_excess);
        scan = next;
        match edge {
            Some(SurplusEdge::Begins) => {
                first_surplus = Some(index);
                reserve_rebuild_start = Some(period.end);
            }
            Some(SurplusEdge::Ends) => {
                clean_backup_start = Some(period.end);
                break;
            }
            None => {}
        }
    }

    let Some(first_surplus) = first_surplus else {
        // Cannot happen while the total excess is positive; degrade instead of
        // panicking if it somehow does.
        warn!(%expected_excess, "positive total excess without a surplus period");
        return ChargePlan { expected_excess, ..ChargePlan::idle() };
    };

    let excess_share = Percent::from(expected_excess / config.battery_capacity * 100.0);
    let discharge_target =
        (config.target_max - excess_share - config.charge_buffer).max(config.min_reserve);
    let to_discharge =
        config.battery_capacity * (config.target_max - discharge_target).to_proportion();

    // Backward scan: start discharging early enough that the pre-surplus
    // inverter headroom covers the energy to shed.
    let mut discharge_start = None;
    let mut headroom = KilowattHours::ZERO;
    for period in periods[..first_surplus].iter().rev() {
        headroom += period.headroom(ceiling);
        if headroom >= to_discharge {
            discharge_start = Some(period.start());
            break;
        }
    }
    let discharge_start = discharge_start.map(|start| {
        if start < now { now + TimeDelta::minutes(START_GRACE_MINUTES) } else { start }
    });

    ChargePlan {
        expected_excess,
        discharge_start,
        discharge_target: Some(discharge_target),
        reserve_rebuild_start,
        clean_backup_start,
    }
}

/// Forward-scan state while walking the day's periods in time order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum SurplusScan {
    /// No period producing above the ceiling seen yet.
    BeforeSurplus,

    /// Inside the block of periods producing above the ceiling.
    InSurplus,

    /// The surplus block has ended.
    AfterSurplus,
}

/// Boundary of the surplus block crossed by a scan step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum SurplusEdge {
    Begins,
    Ends,
}

impl SurplusScan {
    /// Advance over the next period and report the boundary it crosses, if any.
    const fn step(self, has_excess: bool) -> (Self, Option<SurplusEdge>) {
        match (self, has_excess) {
            (Self::BeforeSurplus, true) => (Self::InSurplus, Some(SurplusEdge::Begins)),
            (Self::InSurplus, false) => (Self::AfterSurplus, Some(SurplusEdge::Ends)),
            (Self::BeforeSurplus | Self::InSurplus | Self::AfterSurplus, _) => (self, None),
        }
    }
}
