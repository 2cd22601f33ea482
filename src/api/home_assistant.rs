//! [Home Assistant](https://developers.home-assistant.io/docs/api/rest/) client.

use chrono::{DateTime, Local};
use reqwest::{
    Client,
    ClientBuilder,
    Url,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use serde::Serialize;

use crate::prelude::*;

pub struct Api {
    client: Client,
    base_url: Url,
}

impl Api {
    pub fn try_new(access_token: &str, base_url: Url) -> Result<Self> {
        let headers = HeaderMap::from_iter([(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&format!("Bearer {access_token}"))?,
        )]);
        let client = ClientBuilder::new().default_headers(headers).build()?;
        Ok(Self { client, base_url })
    }

    /// Point an `input_datetime` helper at the instant.
    #[instrument(skip_all, fields(entity_id = entity_id))]
    pub async fn set_datetime(&self, entity_id: &str, instant: DateTime<Local>) -> Result {
        let request = SetDatetimeRequest {
            entity_id,
            datetime: instant.format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        self.call_service("input_datetime", "set_datetime", &request).await
    }

    /// Set an `input_number` helper.
    #[instrument(skip_all, fields(entity_id = entity_id))]
    pub async fn set_number(&self, entity_id: &str, value: f64) -> Result {
        self.call_service("input_number", "set_value", &SetValueRequest { entity_id, value })
            .await
    }

    async fn call_service<R: Serialize>(&self, domain: &str, service: &str, request: &R) -> Result {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("invalid base URL"))?
            .extend(["api", "services", domain, service]);
        self.client.post(url).json(request).send().await?.error_for_status()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct SetDatetimeRequest<'a> {
    entity_id: &'a str,
    datetime: String,
}

#[derive(Serialize)]
struct SetValueRequest<'a> {
    entity_id: &'a str,
    value: f64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_set_datetime_request_shape() -> Result {
        let request = SetDatetimeRequest {
            entity_id: "input_datetime.battery_discharge_start",
            datetime: "2026-06-15 09:35:00".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request)?,
            json!({
                "entity_id": "input_datetime.battery_discharge_start",
                "datetime": "2026-06-15 09:35:00"
            }),
        );
        Ok(())
    }

    #[test]
    fn test_set_value_request_shape() -> Result {
        let request =
            SetValueRequest { entity_id: "input_number.battery_discharge_target", value: 68.3 };
        assert_eq!(
            serde_json::to_value(&request)?,
            json!({
                "entity_id": "input_number.battery_discharge_target",
                "value": 68.3
            }),
        );
        Ok(())
    }
}
