use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::{
    api::solcast::{Forecast, Solcast},
    cache::ForecastCache,
    prelude::*,
};

/// A single configured forecast source.
#[async_trait]
pub trait ForecastSource {
    /// Identifies the source in logs.
    fn id(&self) -> String;

    async fn get_forecast(&self) -> Result<Forecast>;
}

/// Forecast JSON stored on disk, the same payload the API returns.
pub struct FileSource {
    pub path: PathBuf,
}

#[async_trait]
impl ForecastSource for FileSource {
    fn id(&self) -> String {
        self.path.display().to_string()
    }

    async fn get_forecast(&self) -> Result<Forecast> {
        Forecast::read_from(&self.path)
    }
}

/// Remote rooftop site, fetched through the on-disk cache.
pub struct SiteSource {
    pub solcast: Solcast,
    pub cache: ForecastCache,
    pub resource_id: String,

    /// Wall-clock instant of the run, truncated into the cache key.
    pub fetched_at: DateTime<Local>,
}

#[async_trait]
impl ForecastSource for SiteSource {
    fn id(&self) -> String {
        self.resource_id.clone()
    }

    async fn get_forecast(&self) -> Result<Forecast> {
        if let Some(forecast) = self.cache.get(&self.resource_id, self.fetched_at) {
            return Ok(forecast);
        }
        let forecast = self.solcast.get_forecasts(&self.resource_id).await?;
        self.cache.put(&self.resource_id, self.fetched_at, &forecast);
        Ok(forecast)
    }
}
