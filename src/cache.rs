use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::{api::solcast::Forecast, prelude::*};

/// Disk cache of fetched forecast payloads.
///
/// Entries are keyed by the site resource id and the fetch instant truncated
/// to the hour, so repeated runs within one hour reuse the same payload
/// instead of spending API quota.
#[derive(Clone)]
pub struct ForecastCache {
    dir: PathBuf,
}

impl ForecastCache {
    pub fn open(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create the cache directory `{}`", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, resource_id: &str, fetched_at: DateTime<Local>) -> PathBuf {
        self.dir.join(format!("{resource_id}-{}.json", fetched_at.format("%Y-%m-%dT%H")))
    }

    /// Cached payload, if present and readable.
    ///
    /// A failure to read or parse the entry is logged and treated as a miss.
    pub fn get(&self, resource_id: &str, fetched_at: DateTime<Local>) -> Option<Forecast> {
        let path = self.path_for(resource_id, fetched_at);
        if !path.is_file() {
            return None;
        }
        match Self::read(&path) {
            Ok(forecast) => {
                info!(path = %path.display(), "cache hit");
                Some(forecast)
            }
            Err(error) => {
                error!(path = %path.display(), "failed to read the cached forecast: {error:#}");
                None
            }
        }
    }

    /// Store the payload; a failure is logged and otherwise ignored.
    pub fn put(&self, resource_id: &str, fetched_at: DateTime<Local>, forecast: &Forecast) {
        let path = self.path_for(resource_id, fetched_at);
        if let Err(error) = Self::write(&path, forecast) {
            error!(path = %path.display(), "failed to write the forecast cache: {error:#}");
        }
    }

    fn read(path: &Path) -> Result<Forecast> {
        Ok(serde_json::from_slice(&std::fs::read(path)?)?)
    }

    fn write(path: &Path, forecast: &Forecast) -> Result {
        Ok(std::fs::write(path, serde_json::to_vec(forecast)?)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_path_truncates_the_instant_to_the_hour() {
        let cache = ForecastCache { dir: PathBuf::from("/var/cache/sunward") };
        let fetched_at = Local.with_ymd_and_hms(2026, 6, 15, 9, 35, 27).unwrap();
        assert_eq!(
            cache.path_for("aaaa-bbbb-cccc-dddd", fetched_at),
            PathBuf::from("/var/cache/sunward/aaaa-bbbb-cccc-dddd-2026-06-15T09.json"),
        );
    }
}
