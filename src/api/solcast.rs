//! [Solcast](https://docs.solcast.com.au/) rooftop sites client.

use std::path::Path;

use chrono::{DateTime, Local, TimeDelta, Utc};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Unexpected};

use crate::{api::client, core::period::ForecastPeriod, prelude::*, quantity::power::Kilowatts};

#[derive(Clone)]
pub struct Solcast {
    client: Client,
    api_key: String,
}

impl Solcast {
    pub fn try_new(api_key: String) -> Result<Self> {
        Ok(Self { client: client::try_new()?, api_key })
    }

    #[instrument(skip_all, fields(resource_id = resource_id))]
    pub async fn get_forecasts(&self, resource_id: &str) -> Result<Forecast> {
        let url =
            format!("https://api.solcast.com.au/rooftop_sites/{resource_id}/forecasts?format=json");
        let forecast: Forecast = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("failed to call")?
            .error_for_status()
            .context("request failed")?
            .json()
            .await
            .context("failed to deserialize the response")?;
        info!(n_periods = forecast.forecasts.len(), "fetched");
        Ok(forecast)
    }
}

/// One raw forecast payload, as returned by the API and as stored on disk.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Forecast {
    pub forecasts: Vec<ForecastEntry>,
}

impl Forecast {
    pub fn read_from(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse the forecast in `{}`", path.display()))
    }

    /// Parsed periods, normalized to the local zone.
    pub fn into_periods(self) -> impl Iterator<Item = ForecastPeriod> {
        self.forecasts.into_iter().map(ForecastPeriod::from)
    }
}

/// One raw forecast interval.
#[derive(Copy, Clone, Debug, Deserialize, Serialize)]
pub struct ForecastEntry {
    pub period_end: DateTime<Utc>,

    #[serde(deserialize_with = "deserialize_period", serialize_with = "serialize_period")]
    pub period: TimeDelta,

    #[serde(rename = "pv_estimate10")]
    pub p10: f64,

    #[serde(rename = "pv_estimate")]
    pub p50: f64,

    #[serde(rename = "pv_estimate90")]
    pub p90: f64,
}

impl From<ForecastEntry> for ForecastPeriod {
    fn from(entry: ForecastEntry) -> Self {
        Self {
            end: entry.period_end.with_timezone(&Local),
            duration: entry.period,
            p10: Kilowatts::from(entry.p10),
            p50: Kilowatts::from(entry.p50),
            p90: Kilowatts::from(entry.p90),
        }
    }
}

fn deserialize_period<'de, D>(deserializer: D) -> Result<TimeDelta, D::Error>
where
    D: Deserializer<'de>,
{
    let string = String::deserialize(deserializer)?;
    parse_duration(&string).ok_or_else(|| {
        serde::de::Error::invalid_value(Unexpected::Str(&string), &"an ISO 8601 time duration")
    })
}

fn serialize_period<S>(period: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("PT{}S", period.num_seconds()))
}

/// Parse the `PTnHnMnS` subset of ISO 8601 durations used by the forecast API.
fn parse_duration(string: &str) -> Option<TimeDelta> {
    let rest = string.strip_prefix("PT")?;
    if rest.is_empty() {
        return None;
    }
    let mut total = TimeDelta::zero();
    let mut digits = String::new();
    for char in rest.chars() {
        if char.is_ascii_digit() {
            digits.push(char);
        } else {
            let value: i64 = digits.parse().ok()?;
            digits.clear();
            total = total
                + match char {
                    'H' => TimeDelta::hours(value),
                    'M' => TimeDelta::minutes(value),
                    'S' => TimeDelta::seconds(value),
                    _ => return None,
                };
        }
    }
    digits.is_empty().then_some(total)
}
