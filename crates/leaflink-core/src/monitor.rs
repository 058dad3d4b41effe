// ── Plant monitor ──
//
// Binds one plant to everything the UI needs: its backend metadata, a
// live telemetry session, and the current weather at its location.

use std::sync::Arc;

use tracing::{debug, warn};

use leaflink_api::{RestClient, WeatherClient};

use crate::error::CoreError;
use crate::model::{DeviceId, Plant, TelemetrySnapshot, WeatherCode};
use crate::session::{PlantSession, SessionKind, SessionManager};

/// One plant's full live view.
pub struct PlantMonitor {
    rest: RestClient,
    weather: WeatherClient,
    sessions: Arc<SessionManager>,
    plant: Plant,
    session: Arc<PlantSession>,
    weather_code: WeatherCode,
}

impl PlantMonitor {
    /// Bind a monitor to a device: resolve its metadata from the plant
    /// list and open (or join) its telemetry session.
    pub async fn bind(
        rest: RestClient,
        weather: WeatherClient,
        sessions: Arc<SessionManager>,
        device: DeviceId,
    ) -> Result<Self, CoreError> {
        let plant = fetch_plant(&rest, &device).await?;
        let session = sessions.open(&device, SessionKind::Telemetry)?;

        Ok(Self {
            rest,
            weather,
            sessions,
            plant,
            session,
            weather_code: WeatherCode::LOADING,
        })
    }

    pub fn plant(&self) -> &Plant {
        &self.plant
    }

    pub fn session(&self) -> &Arc<PlantSession> {
        &self.session
    }

    /// Current weather code; [`WeatherCode::LOADING`] until the first
    /// successful fetch.
    pub fn weather_code(&self) -> WeatherCode {
        self.weather_code
    }

    /// The latest cached reading, if any has arrived.
    pub fn reading(&self) -> Option<TelemetrySnapshot> {
        self.session.cache().read()
    }

    /// Full refresh: metadata, then a fresh sensor reading, then
    /// weather. Sensor and weather misses are not errors; a plant that
    /// disappeared from the account is.
    pub async fn refresh(&mut self) -> Result<Option<TelemetrySnapshot>, CoreError> {
        self.plant = fetch_plant(&self.rest, &self.plant.id).await?;

        let reading = self.session.request_sensors().await;
        if reading.is_none() {
            debug!(device = %self.plant.id, "no sensor reading available");
        }

        self.refresh_weather().await;
        Ok(reading)
    }

    /// Fetch the weather for the plant's location. Failures and missing
    /// coordinates leave the previous code in place.
    pub async fn refresh_weather(&mut self) {
        let Some((lat, lon)) = self.plant.location.as_ref().and_then(|l| l.coords()) else {
            return;
        };
        match self.weather.current_weather_code(lat, lon).await {
            Ok(code) => self.weather_code = WeatherCode(code),
            Err(e) => {
                warn!(device = %self.plant.id, error = %e, "weather fetch failed");
            }
        }
    }

    /// Close the underlying session and free its slot.
    pub async fn close(self) {
        self.sessions.close(&self.plant.id).await;
    }
}

/// Resolve a device to its plant record via the signed-in user's list.
async fn fetch_plant(rest: &RestClient, device: &DeviceId) -> Result<Plant, CoreError> {
    let records = rest.get_plants().await?;
    records
        .into_iter()
        .find(|r| r.uuid == device.as_str())
        .map(Plant::from)
        .ok_or_else(|| CoreError::PlantNotFound {
            uuid: device.to_string(),
        })
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn plants_server(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/get-plants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    fn rest_for(server: &MockServer) -> RestClient {
        let base = url::Url::parse(&format!("{}/", server.uri())).unwrap();
        RestClient::with_client(reqwest::Client::new(), base)
            .with_token("test-token".to_string().into())
    }

    #[tokio::test]
    async fn unknown_uuid_is_plant_not_found() {
        let server = plants_server(json!([
            { "uuid": "other", "nickname": "Fern" }
        ]))
        .await;

        let err = fetch_plant(&rest_for(&server), &DeviceId::new("abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::PlantNotFound { uuid } if uuid == "abc"));
    }

    #[tokio::test]
    async fn resolves_plant_metadata() {
        let server = plants_server(json!([
            {
                "uuid": "abc",
                "nickname": "Mr. Leafy",
                "species": "Monstera",
                "birth": "2025-06-01",
                "location": "{\"display_name\":\"Berlin\",\"lat\":\"52.5\",\"lon\":\"13.4\"}"
            }
        ]))
        .await;

        let plant = fetch_plant(&rest_for(&server), &DeviceId::new("abc"))
            .await
            .unwrap();
        assert_eq!(plant.nickname, "Mr. Leafy");
        assert_eq!(plant.location.unwrap().coords(), Some((52.5, 13.4)));
    }
}
