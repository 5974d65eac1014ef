//! Environment signals: device location and a current-weather snapshot.
//!
//! Neither operation fails outward. Location falls back to a fixed default
//! coordinate, weather to a fixed substitute record; failures are only noted
//! on the diagnostic log.

use crate::core::state::AetherConfig;
use crate::errors::AetherError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Default coordinate when no override is configured (London).
pub const DEFAULT_LOCATION: GeoPoint = GeoPoint {
    lat: 51.5074,
    lon: -0.1278,
};

const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Foggy,
    Rainy,
    Snowy,
    Stormy,
    Unknown,
}

impl WeatherCondition {
    /// Bucket a WMO weather interpretation code.
    /// 0: Clear, 1-3: Cloudy, 45-48: Fog, 51-67: Drizzle/Rain, 71-86: Snow,
    /// 95+: Thunderstorm. Codes outside the buckets read as Clear.
    pub fn from_wmo_code(code: u32) -> Self {
        match code {
            1..=3 => WeatherCondition::Cloudy,
            45..=48 => WeatherCondition::Foggy,
            51..=67 => WeatherCondition::Rainy,
            71..=86 => WeatherCondition::Snowy,
            95.. => WeatherCondition::Stormy,
            _ => WeatherCondition::Clear,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "Clear",
            WeatherCondition::Cloudy => "Cloudy",
            WeatherCondition::Foggy => "Foggy",
            WeatherCondition::Rainy => "Rainy",
            WeatherCondition::Snowy => "Snowy",
            WeatherCondition::Stormy => "Stormy",
            WeatherCondition::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current-conditions record. Replaced on every successful poll; never unset
/// after the first attempt.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub condition: WeatherCondition,
    pub is_day: bool,
    pub location_label: String,
}

impl WeatherSnapshot {
    /// Substitute record applied on any fetch failure.
    pub fn fallback() -> Self {
        Self {
            temperature: 20.0,
            condition: WeatherCondition::Unknown,
            is_day: true,
            location_label: "Unknown Location".to_string(),
        }
    }
}

#[async_trait]
pub trait EnvironmentProvider: Send + Sync {
    async fn location(&self) -> GeoPoint;
    async fn weather(&self, point: GeoPoint) -> WeatherSnapshot;
}

/// Open-Meteo backed provider. Terminal processes have no geolocation
/// hardware, so location is the configured override or the fixed default.
pub struct OpenMeteo {
    client: reqwest::Client,
    override_point: Option<GeoPoint>,
}

impl OpenMeteo {
    pub fn new(config: &AetherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("failed to build weather HTTP client")?;

        let override_point = match (config.latitude, config.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
            _ => None,
        };

        Ok(Self {
            client,
            override_point,
        })
    }

    async fn fetch_weather(&self, point: GeoPoint) -> Result<WeatherSnapshot> {
        let res = self
            .client
            .get(OPEN_METEO_URL)
            .query(&[
                ("latitude", point.lat.to_string()),
                ("longitude", point.lon.to_string()),
                ("current_weather", "true".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(anyhow::anyhow!("Open-Meteo status: {}", res.status()));
        }

        let body: Value = res.json().await?;
        let cw = body
            .get("current_weather")
            .context("current_weather missing in response")?;

        let temperature = cw
            .get("temperature")
            .and_then(Value::as_f64)
            .context("temperature missing")?;
        let code = cw
            .get("weathercode")
            .and_then(Value::as_u64)
            .context("weathercode missing")? as u32;
        let is_day = cw.get("is_day").and_then(Value::as_u64) == Some(1);

        Ok(WeatherSnapshot {
            temperature,
            condition: WeatherCondition::from_wmo_code(code),
            is_day,
            // Reverse geocoding needs an API key, a coordinate label is enough
            location_label: format!("Lat: {:.2}, Lon: {:.2}", point.lat, point.lon),
        })
    }
}

#[async_trait]
impl EnvironmentProvider for OpenMeteo {
    async fn location(&self) -> GeoPoint {
        self.override_point.unwrap_or(DEFAULT_LOCATION)
    }

    async fn weather(&self, point: GeoPoint) -> WeatherSnapshot {
        match self.fetch_weather(point).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let outage = AetherError::SignalUnavailable(e.to_string());
                tracing::warn!(%outage, "weather fetch failed, substituting fallback");
                WeatherSnapshot::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmo_buckets() {
        assert_eq!(WeatherCondition::from_wmo_code(0), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_wmo_code(2), WeatherCondition::Cloudy);
        assert_eq!(WeatherCondition::from_wmo_code(3), WeatherCondition::Cloudy);
        assert_eq!(WeatherCondition::from_wmo_code(46), WeatherCondition::Foggy);
        assert_eq!(WeatherCondition::from_wmo_code(61), WeatherCondition::Rainy);
        assert_eq!(WeatherCondition::from_wmo_code(75), WeatherCondition::Snowy);
        assert_eq!(WeatherCondition::from_wmo_code(95), WeatherCondition::Stormy);
        assert_eq!(WeatherCondition::from_wmo_code(97), WeatherCondition::Stormy);
    }

    #[test]
    fn test_wmo_gap_codes_read_clear() {
        // Codes the buckets skip (e.g. 10, 49, 70) fall through to Clear,
        // matching the bucket table rather than Unknown.
        assert_eq!(WeatherCondition::from_wmo_code(10), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_wmo_code(49), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_wmo_code(70), WeatherCondition::Clear);
    }

    #[test]
    fn test_fallback_snapshot_is_exact() {
        let w = WeatherSnapshot::fallback();
        assert_eq!(w.temperature, 20.0);
        assert_eq!(w.condition, WeatherCondition::Unknown);
        assert!(w.is_day);
        assert_eq!(w.location_label, "Unknown Location");
    }

    #[tokio::test]
    async fn test_default_location_without_override() {
        let provider = OpenMeteo::new(&AetherConfig::default()).unwrap();
        assert_eq!(provider.location().await, DEFAULT_LOCATION);
    }

    #[tokio::test]
    async fn test_configured_location_override() {
        let config = AetherConfig {
            latitude: Some(35.68),
            longitude: Some(139.69),
            ..AetherConfig::default()
        };
        let provider = OpenMeteo::new(&config).unwrap();
        let point = provider.location().await;
        assert_eq!(point.lat, 35.68);
        assert_eq!(point.lon, 139.69);
    }
}
