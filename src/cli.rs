mod forecast;
mod plan;

use std::{collections::BTreeMap, path::PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use clap::{Parser, Subcommand};
use reqwest::Url;

pub use self::{forecast::forecast, plan::plan};
use crate::{
    api::{
        solcast::{Forecast, Solcast},
        source::{FileSource, ForecastSource, SiteSource},
    },
    cache::ForecastCache,
    config::SitesFile,
    core::{daily::DailyForecast, merge::merge_forecasts, planner::PlanConfig},
    prelude::*,
    quantity::{energy::KilowattHours, percent::Percent, power::Kilowatts},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: fetch the forecasts, derive the per-day charge plans, and
    /// push today's plan to Home Assistant.
    Plan(Box<PlanArgs>),

    /// Fetch the forecasts and display the merged per-day periods.
    Forecast(Box<ForecastArgs>),
}

#[derive(Parser)]
pub struct PlanArgs {
    /// Do not push the plan to Home Assistant (dry run).
    #[clap(long)]
    pub scout: bool,

    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub thresholds: ThresholdArgs,

    #[clap(flatten)]
    pub sources: SourceArgs,

    #[clap(flatten)]
    pub home_assistant: HomeAssistantArgs,
}

impl PlanArgs {
    pub fn plan_config(&self) -> PlanConfig {
        PlanConfig::builder()
            .battery_capacity(self.battery.capacity)
            .inverter_ceiling(self.battery.inverter_ceiling)
            .target_max(self.thresholds.target_max)
            .min_reserve(self.thresholds.min_reserve)
            .charge_buffer(self.thresholds.charge_buffer)
            .build()
    }
}

#[derive(Parser)]
pub struct ForecastArgs {
    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub sources: SourceArgs,
}

#[derive(Copy, Clone, Parser)]
pub struct BatteryArgs {
    /// Usable battery capacity in kilowatt-hours.
    #[clap(long = "battery-capacity", default_value = "17.1", env = "BATTERY_CAPACITY_KWH")]
    pub capacity: KilowattHours,

    /// Round-trip battery efficiency in percent.
    ///
    /// Recognized and displayed; deliberately left out of the energy balance.
    #[clap(long = "battery-efficiency", default_value = "96", env = "BATTERY_EFFICIENCY")]
    pub efficiency: Percent,

    /// Maximum AC-DC throughput of the inverter in kilowatts.
    #[clap(long = "inverter-ceiling", default_value = "8.3", env = "INVERTER_CEILING_KW")]
    pub inverter_ceiling: Kilowatts,
}

#[derive(Copy, Clone, Parser)]
pub struct ThresholdArgs {
    /// State of charge to recharge to after the surplus, in percent.
    #[clap(long = "target-max", default_value = "95", env = "TARGET_MAX_PERCENT")]
    pub target_max: Percent,

    /// State-of-charge floor, in percent.
    #[clap(long = "min-reserve", default_value = "10", env = "MIN_RESERVE_PERCENT")]
    pub min_reserve: Percent,

    /// Safety margin below the recharge target, in percent.
    #[clap(long = "charge-buffer", default_value = "10", env = "CHARGE_BUFFER_PERCENT")]
    pub charge_buffer: Percent,
}

#[derive(Parser)]
pub struct SourceArgs {
    /// Read forecast JSON from a file instead of fetching (repeatable).
    #[clap(long = "file")]
    pub files: Vec<PathBuf>,

    /// Solcast rooftop site resource id (repeatable).
    #[clap(long = "site", env = "SOLCAST_RESOURCE_ID")]
    pub sites: Vec<String>,

    /// TOML file listing the rooftop sites.
    #[clap(long = "sites-file")]
    pub sites_file: Option<PathBuf>,

    /// Solcast API key.
    #[clap(long = "solcast-api-key", env = "SOLCAST_API_KEY")]
    pub api_key: Option<String>,

    /// Directory for the cached forecast payloads.
    #[clap(long = "cache-dir", default_value = ".cache", env = "FORECAST_CACHE_DIR")]
    pub cache_dir: PathBuf,
}

impl SourceArgs {
    /// Build the configured forecast sources.
    fn sources(&self, fetched_at: DateTime<Local>) -> Result<Vec<Box<dyn ForecastSource>>> {
        let mut sources: Vec<Box<dyn ForecastSource>> = self
            .files
            .iter()
            .map(|path| Box::new(FileSource { path: path.clone() }) as Box<dyn ForecastSource>)
            .collect();

        let mut resource_ids = self.sites.clone();
        if let Some(path) = &self.sites_file {
            for site in SitesFile::read_from(path)?.sites {
                debug!(
                    resource_id = site.resource_id.as_str(),
                    name = site.name.as_deref().unwrap_or("-"),
                    "configured site"
                );
                resource_ids.push(site.resource_id);
            }
        }
        if !resource_ids.is_empty() {
            let api_key = self
                .api_key
                .clone()
                .context("the Solcast API key is required to fetch the sites")?;
            let solcast = Solcast::try_new(api_key)?;
            let cache = ForecastCache::open(self.cache_dir.clone())?;
            sources.extend(resource_ids.into_iter().map(|resource_id| {
                Box::new(SiteSource {
                    solcast: solcast.clone(),
                    cache: cache.clone(),
                    resource_id,
                    fetched_at,
                }) as Box<dyn ForecastSource>
            }));
        }

        ensure!(!sources.is_empty(), "specify at least one `--file` or rooftop site");
        Ok(sources)
    }
}

#[derive(Parser)]
pub struct HomeAssistantArgs {
    /// Home Assistant base URL.
    #[clap(long = "home-assistant-url", env = "HOME_ASSISTANT_URL")]
    pub url: Option<Url>,

    /// Home Assistant long-lived access token.
    #[clap(long = "home-assistant-token", env = "HOME_ASSISTANT_TOKEN")]
    pub token: Option<String>,

    #[clap(flatten)]
    pub entities: EntityArgs,
}

#[derive(Parser)]
pub struct EntityArgs {
    /// `input_datetime` holding the discharge start.
    #[clap(
        long = "discharge-start-entity",
        default_value = "input_datetime.battery_discharge_start",
        env = "DISCHARGE_START_ENTITY"
    )]
    pub discharge_start: String,

    /// `input_number` holding the discharge target state of charge.
    #[clap(
        long = "discharge-target-entity",
        default_value = "input_number.battery_discharge_target",
        env = "DISCHARGE_TARGET_ENTITY"
    )]
    pub discharge_target: String,

    /// `input_datetime` holding the reserve rebuild start.
    #[clap(
        long = "reserve-rebuild-entity",
        default_value = "input_datetime.battery_reserve_rebuild",
        env = "RESERVE_REBUILD_ENTITY"
    )]
    pub reserve_rebuild: String,

    /// `input_datetime` holding the clean backup start.
    #[clap(
        long = "clean-backup-entity",
        default_value = "input_datetime.battery_clean_backup",
        env = "CLEAN_BACKUP_ENTITY"
    )]
    pub clean_backup: String,
}

/// Load all configured sources and merge them into per-day forecasts.
async fn load_days(
    args: &SourceArgs,
    now: DateTime<Local>,
) -> Result<BTreeMap<NaiveDate, DailyForecast>> {
    let sources = args.sources(now)?;
    let mut payloads = Vec::with_capacity(sources.len());
    for source in &sources {
        let forecast = source
            .get_forecast()
            .await
            .with_context(|| format!("failed to load the forecast from `{}`", source.id()))?;
        payloads.push(forecast);
    }
    let days = merge_forecasts(payloads.into_iter().map(Forecast::into_periods))?;
    ensure!(!days.is_empty(), "the sources contained no forecast periods");
    Ok(days)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_plan_from_files() -> Result {
        let args = Args::try_parse_from([
            "sunward",
            "plan",
            "--scout",
            "--file",
            "north.json",
            "--file",
            "south.json",
            "--target-max",
            "90",
        ])?;
        let Command::Plan(args) = args.command else {
            bail!("expected the plan command");
        };
        assert!(args.scout);
        assert_eq!(args.sources.files.len(), 2);
        assert_eq!(args.thresholds.target_max, Percent(90.0));
        assert_eq!(args.thresholds.min_reserve, Percent(10.0));
        Ok(())
    }
}
