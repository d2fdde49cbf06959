//! Pre-map briefing: guidance, air quality and weather fetched concurrently.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use firewiser_core::enums::HouseholdProfile;
use firewiser_core::types::GeoPoint;

use crate::air_quality::{lookup_or_none, AirQuality, AirQualityProvider};
use crate::guidance::{generate_or_fallback, GuidancePlan, GuidanceProvider};
use crate::weather::{current_or_none, WeatherProvider, WeatherReport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Briefing {
    pub profile: HouseholdProfile,
    pub guidance: GuidancePlan,
    /// True when the built-in plan replaced a failed generation.
    pub guidance_fallback: bool,
    pub air_quality: Option<AirQuality>,
    pub weather: Option<WeatherReport>,
}

/// Borrowed set of providers a briefing is gathered from.
pub struct BriefingSources<'a, G, A, W> {
    pub guidance: &'a G,
    pub air_quality: &'a A,
    pub weather: &'a W,
}

/// Fire all three requests at once and wait for every one of them. Each call
/// has its own `timeout` and its own fallback, so this never fails.
pub async fn gather_briefing<G, A, W>(
    sources: BriefingSources<'_, G, A, W>,
    profile: HouseholdProfile,
    location: GeoPoint,
    timeout: Duration,
) -> Briefing
where
    G: GuidanceProvider,
    A: AirQualityProvider,
    W: WeatherProvider,
{
    let ((guidance, guidance_fallback), air_quality, weather) = tokio::join!(
        generate_or_fallback(sources.guidance, profile, timeout),
        lookup_or_none(sources.air_quality, location, timeout),
        current_or_none(sources.weather, location, timeout),
    );
    log::info!(
        "Briefing ready for {profile:?} (fallback guidance: {guidance_fallback}, air quality: {}, weather: {})",
        air_quality.is_some(),
        weather.is_some()
    );

    Briefing {
        profile,
        guidance,
        guidance_fallback,
        air_quality,
        weather,
    }
}
