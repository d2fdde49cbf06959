//! Current air quality at a location.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use firewiser_core::types::GeoPoint;

use crate::config::ServiceConfig;
use crate::error::{with_timeout, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexColor {
    #[serde(default)]
    pub red: f64,
    #[serde(default)]
    pub green: f64,
    #[serde(default)]
    pub blue: f64,
}

impl Default for IndexColor {
    fn default() -> Self {
        Self {
            red: 0.5,
            green: 0.5,
            blue: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQuality {
    pub aqi: u32,
    pub category: String,
    #[serde(default)]
    pub color: IndexColor,
    pub dominant_pollutant: String,
}

impl AirQuality {
    pub fn advice(&self) -> &'static str {
        aqi_advice(self.aqi)
    }
}

/// Health advice for an index value.
pub fn aqi_advice(aqi: u32) -> &'static str {
    match aqi {
        0..=50 => "Air quality is satisfactory, posing minimal risk.",
        51..=100 => {
            "Individuals with respiratory sensitivity should limit prolonged outdoor exertion."
        }
        101..=150 => {
            "At-risk groups (e.g., heart/lung disease, elderly) should reduce heavy outdoor exertion."
        }
        151..=200 => {
            "Health Advisory: Avoid prolonged outdoor exertion. N95 mask use is recommended for at-risk individuals."
        }
        _ => "Hazardous Conditions: Remain indoors with windows closed. Utilize air purifiers if accessible.",
    }
}

/// Display colour band for an index value, as RGB.
pub fn aqi_band_color(aqi: u32) -> (u8, u8, u8) {
    match aqi {
        0..=50 => (76, 175, 80),
        51..=100 => (255, 235, 59),
        101..=150 => (255, 152, 0),
        151..=200 => (244, 67, 54),
        201..=300 => (156, 39, 176),
        _ => (121, 85, 72),
    }
}

pub trait AirQualityProvider {
    fn lookup(
        &self,
        location: GeoPoint,
    ) -> impl Future<Output = Result<AirQuality, ServiceError>> + Send;
}

/// Google Air Quality `currentConditions:lookup` client.
#[derive(Debug, Clone)]
pub struct GoogleAirQuality {
    client: reqwest::Client,
    api_key: Option<String>,
    url: String,
}

impl GoogleAirQuality {
    pub fn new(client: reqwest::Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            api_key: config.air_quality_api_key.clone(),
            url: config.air_quality_url.clone(),
        }
    }
}

impl AirQualityProvider for GoogleAirQuality {
    async fn lookup(&self, location: GeoPoint) -> Result<AirQuality, ServiceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ServiceError::MissingCredentials("air quality"))?;

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", api_key)])
            .json(&json!({
                "location": { "latitude": location.lat, "longitude": location.lng },
                "universalAqi": true
            }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                service: "air quality",
                status: status.as_u16(),
            });
        }
        let body: Value = response.json().await?;
        parse_response(&body)
    }
}

/// Read the first index of a lookup response.
pub fn parse_response(body: &Value) -> Result<AirQuality, ServiceError> {
    let index = body
        .pointer("/indexes/0")
        .ok_or_else(|| ServiceError::Schema("no air quality index in response".into()))?;
    serde_json::from_value(index.clone()).map_err(|e| ServiceError::Schema(e.to_string()))
}

/// Look up air quality, or `None` on any failure.
pub async fn lookup_or_none<A: AirQualityProvider>(
    provider: &A,
    location: GeoPoint,
    timeout: std::time::Duration,
) -> Option<AirQuality> {
    match with_timeout(timeout, provider.lookup(location)).await {
        Ok(reading) => Some(reading),
        Err(err) => {
            log::warn!("Air quality lookup failed: {err}");
            None
        }
    }
}
