//! Drop-zone-eligible population lookup.

use std::future::Future;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::Mutex;

use firewiser_core::constants::EN_ROUTE_POPULATION;
use firewiser_core::types::{GeoBounds, PopulationSample};

use crate::error::ServiceError;

pub trait PopulationSource {
    fn lookup(
        &self,
        bounds: GeoBounds,
    ) -> impl Future<Output = Result<Vec<PopulationSample>, ServiceError>> + Send;
}

/// Uniform samples inside the region after a fixed latency.
#[derive(Debug)]
pub struct SimulatedPopulation {
    count: u32,
    latency: Duration,
    rng: Mutex<ChaCha8Rng>,
}

impl SimulatedPopulation {
    pub fn new(latency: Duration, seed: u64) -> Self {
        Self::with_count(EN_ROUTE_POPULATION, latency, seed)
    }

    pub fn with_count(count: u32, latency: Duration, seed: u64) -> Self {
        Self {
            count,
            latency,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl PopulationSource for SimulatedPopulation {
    async fn lookup(&self, bounds: GeoBounds) -> Result<Vec<PopulationSample>, ServiceError> {
        if !bounds.is_valid() {
            return Err(ServiceError::Schema(format!("invalid bounds {bounds:?}")));
        }
        tokio::time::sleep(self.latency).await;

        let mut rng = self.rng.lock().await;
        Ok((0..self.count)
            .map(|id| PopulationSample {
                id,
                position: bounds.sample(rng.gen(), rng.gen()),
            })
            .collect())
    }
}
