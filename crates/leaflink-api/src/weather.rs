//! Weather and geocoding lookups.
//!
//! Two third-party services, both consumed read-only:
//!
//! - Open-Meteo for the current WMO weather code at a coordinate pair
//! - Nominatim (OpenStreetMap) for forward and reverse geocoding
//!
//! Base URLs are injectable so tests can point at a mock server.

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::Error;

const OPEN_METEO_URL: &str = "https://api.open-meteo.com";
const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// A geocoded place: the fields the backend persists for a plant location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoMatch {
    pub display_name: String,
    /// Nominatim returns coordinates as strings.
    pub lat: String,
    pub lon: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    weather_code: u16,
}

/// Client for weather and geocoding lookups.
pub struct WeatherClient {
    http: reqwest::Client,
    forecast_url: Url,
    geocode_url: Url,
}

impl WeatherClient {
    /// Create a client against the public Open-Meteo and Nominatim hosts.
    pub fn new() -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("leaflink/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            forecast_url: Url::parse(OPEN_METEO_URL)?,
            geocode_url: Url::parse(NOMINATIM_URL)?,
        })
    }

    /// Create a client with explicit service URLs (tests).
    pub fn with_urls(http: reqwest::Client, forecast_url: Url, geocode_url: Url) -> Self {
        Self {
            http,
            forecast_url,
            geocode_url,
        }
    }

    /// Current WMO weather code at the given coordinates.
    pub async fn current_weather_code(&self, lat: f64, lon: f64) -> Result<u16, Error> {
        let mut url = self.forecast_url.join("/v1/forecast")?;
        url.query_pairs_mut()
            .append_pair("latitude", &lat.to_string())
            .append_pair("longitude", &lon.to_string())
            .append_pair("current", "weather_code");

        debug!("GET {url}");
        let resp: ForecastResponse = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp.current.weather_code)
    }

    /// Forward geocoding: free-text query to candidate places.
    pub async fn search(&self, query: &str) -> Result<Vec<GeoMatch>, Error> {
        let mut url = self.geocode_url.join("/search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json");

        debug!("GET {url}");
        let matches: Vec<GeoMatch> = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(matches)
    }

    /// Reverse geocoding: coordinates to the nearest named place.
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<GeoMatch, Error> {
        let mut url = self.geocode_url.join("/reverse")?;
        url.query_pairs_mut()
            .append_pair("lat", &lat.to_string())
            .append_pair("lon", &lon.to_string())
            .append_pair("format", "json");

        debug!("GET {url}");
        let m: GeoMatch = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(m)
    }
}
