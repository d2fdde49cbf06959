//! Fire-weather conditions. Only a simulated source exists.

use std::future::Future;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use firewiser_core::types::GeoPoint;

use crate::error::{with_timeout, ServiceError};

pub const WIND_DIRECTIONS: [&str; 3] = ["NNE", "NE", "ENE"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature_f: u32,
    pub humidity_pct: u32,
    pub wind_speed_mph: u32,
    pub wind_direction: String,
    pub description: String,
}

pub trait WeatherProvider {
    fn current(
        &self,
        location: GeoPoint,
    ) -> impl Future<Output = Result<WeatherReport, ServiceError>> + Send;
}

/// Hot, dry, offshore-wind conditions after a fixed latency.
#[derive(Debug)]
pub struct SimulatedWeather {
    latency: Duration,
    rng: Mutex<ChaCha8Rng>,
}

impl SimulatedWeather {
    pub fn new(latency: Duration, seed: u64) -> Self {
        Self {
            latency,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl WeatherProvider for SimulatedWeather {
    async fn current(&self, location: GeoPoint) -> Result<WeatherReport, ServiceError> {
        log::debug!(
            "Simulating weather at ({:.4}, {:.4})",
            location.lat,
            location.lng
        );
        tokio::time::sleep(self.latency).await;

        let mut rng = self.rng.lock().await;
        Ok(WeatherReport {
            temperature_f: 92 + rng.gen_range(0..8),
            humidity_pct: 12 + rng.gen_range(0..8),
            wind_speed_mph: 20 + rng.gen_range(0..10),
            wind_direction: WIND_DIRECTIONS[rng.gen_range(0..WIND_DIRECTIONS.len())].to_string(),
            description: "Critical fire weather conditions detected.".to_string(),
        })
    }
}

/// Current weather, or `None` on any failure.
pub async fn current_or_none<W: WeatherProvider>(
    provider: &W,
    location: GeoPoint,
    timeout: Duration,
) -> Option<WeatherReport> {
    match with_timeout(timeout, provider.current(location)).await {
        Ok(report) => Some(report),
        Err(err) => {
            log::warn!("Weather lookup failed: {err}");
            None
        }
    }
}
