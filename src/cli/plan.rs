use chrono::Local;
use itertools::Itertools;

use crate::{
    api::home_assistant,
    cli::{HomeAssistantArgs, PlanArgs},
    core::planner::{ChargePlan, charge_plan},
    prelude::*,
    tables::build_plan_table,
};

#[instrument(skip_all)]
pub async fn plan(args: &PlanArgs) -> Result {
    let now = Local::now();
    let days = super::load_days(&args.sources, now).await?;

    // Recognized for visibility; deliberately not part of the energy balance.
    debug!(battery_efficiency = %args.battery.efficiency, "planning");

    let config = args.plan_config();
    let plans = days
        .iter()
        .map(|(date, daily)| (*date, charge_plan(&config, now, daily)))
        .collect_vec();
    println!("{}", build_plan_table(&plans));

    let today = now.date_naive();
    if let Some((_, plan)) = plans.iter().find(|(date, _)| *date == today) {
        if !plan.is_complete() {
            info!(%today, "the plan is incomplete, nothing to push");
        } else if args.scout {
            info!(%today, "dry run, not pushing");
        } else {
            push_plan(&args.home_assistant, plan).await?;
        }
    }

    Ok(())
}

async fn push_plan(args: &HomeAssistantArgs, plan: &ChargePlan) -> Result {
    let (Some(base_url), Some(token)) = (&args.url, &args.token) else {
        info!("Home Assistant is not configured, skipping the push");
        return Ok(());
    };
    let (Some(start), Some(target), Some(rebuild), Some(backup)) = (
        plan.discharge_start,
        plan.discharge_target,
        plan.reserve_rebuild_start,
        plan.clean_backup_start,
    ) else {
        bail!("refusing to push an incomplete plan");
    };

    let api = home_assistant::Api::try_new(token, base_url.clone())?;
    let entities = &args.entities;
    api.set_datetime(&entities.discharge_start, start).await?;
    api.set_number(&entities.discharge_target, target.0).await?;
    api.set_datetime(&entities.reserve_rebuild, rebuild).await?;
    api.set_datetime(&entities.clean_backup, backup).await?;
    info!("pushed the plan");
    Ok(())
}
