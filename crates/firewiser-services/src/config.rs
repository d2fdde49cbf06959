//! Service configuration read from the environment.

use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_GUIDANCE_MODEL: &str = "gemini-2.5-flash";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const AIR_QUALITY_URL: &str = "https://airquality.googleapis.com/v1/currentConditions:lookup";

/// Latency of the simulated weather and population lookups.
pub const SIMULATED_LATENCY_MS: u64 = 1500;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub guidance_api_key: Option<String>,
    pub guidance_model: String,
    pub guidance_base_url: String,
    pub air_quality_api_key: Option<String>,
    pub air_quality_url: String,
    /// Deadline applied to every individual service call.
    pub timeout: Duration,
    pub simulated_latency: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            guidance_api_key: None,
            guidance_model: DEFAULT_GUIDANCE_MODEL.to_string(),
            guidance_base_url: GEMINI_BASE_URL.to_string(),
            air_quality_api_key: None,
            air_quality_url: AIR_QUALITY_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            simulated_latency: Duration::from_millis(SIMULATED_LATENCY_MS),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unset, empty or unparsable
    /// values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            guidance_api_key: non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")),
            guidance_model: non_empty("FIREWISER_GUIDANCE_MODEL").unwrap_or(defaults.guidance_model),
            guidance_base_url: defaults.guidance_base_url,
            air_quality_api_key: non_empty("AIR_QUALITY_API_KEY"),
            air_quality_url: defaults.air_quality_url,
            timeout: non_empty("FIREWISER_SERVICE_TIMEOUT_MS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            simulated_latency: defaults.simulated_latency,
        }
    }
}
