use chrono::Local;

use crate::{
    cli::ForecastArgs,
    core::period::ConfidenceBand,
    prelude::*,
    tables::build_forecast_table,
};

#[instrument(skip_all)]
pub async fn forecast(args: &ForecastArgs) -> Result {
    let now = Local::now();
    let days = super::load_days(&args.sources, now).await?;

    let ceiling = args.battery.inverter_ceiling;
    for (date, daily) in &days {
        info!(
            %date,
            p10 = %daily.excess(ConfidenceBand::P10, ceiling),
            p50 = %daily.excess(ConfidenceBand::P50, ceiling),
            p90 = %daily.excess(ConfidenceBand::P90, ceiling),
            "expected excess"
        );
        println!("{}", build_forecast_table(daily, ceiling));
    }

    Ok(())
}
