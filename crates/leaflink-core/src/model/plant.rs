use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use leaflink_api::rest::PlantRecord;

use super::DeviceId;

/// A geocoded plant location.
///
/// The backend stores this as a JSON string inside the plant record;
/// coordinates arrive as strings (geocoder convention) and are parsed
/// lazily when weather lookups need them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoLocation {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

impl GeoLocation {
    /// Coordinates as floats, when both parse.
    pub fn coords(&self) -> Option<(f64, f64)> {
        Some((self.lat.parse().ok()?, self.lon.parse().ok()?))
    }
}

/// A plant and its registered metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Plant {
    pub id: DeviceId,
    pub nickname: String,
    pub species: Option<String>,
    pub birth: Option<NaiveDate>,
    pub location: Option<GeoLocation>,
}

impl Plant {
    /// Days since the registered birth/acquisition date, if known.
    pub fn age_days(&self) -> Option<i64> {
        self.birth
            .map(|birth| (Utc::now().date_naive() - birth).num_days())
    }
}

impl From<PlantRecord> for Plant {
    fn from(record: PlantRecord) -> Self {
        // A location string that fails to parse is treated as absent --
        // same recovery as any other malformed payload on this path.
        let location = record.location.as_deref().and_then(|raw| {
            serde_json::from_str(raw)
                .map_err(|e| {
                    tracing::debug!(error = %e, raw, "unparseable plant location, ignoring");
                    e
                })
                .ok()
        });

        Self {
            id: DeviceId::new(record.uuid),
            nickname: record.nickname,
            species: record.species,
            birth: record.birth,
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(location: Option<&str>) -> PlantRecord {
        PlantRecord {
            uuid: "abc".into(),
            nickname: "Mr. Leafy".into(),
            species: Some("Monstera".into()),
            birth: NaiveDate::from_ymd_opt(2025, 6, 1),
            location: location.map(String::from),
        }
    }

    #[test]
    fn parses_location_json_string() {
        let plant = Plant::from(record(Some(
            r#"{"display_name":"Berlin","lat":"52.5","lon":"13.4"}"#,
        )));

        let loc = plant.location.expect("location should parse");
        assert_eq!(loc.display_name, "Berlin");
        assert_eq!(loc.coords(), Some((52.5, 13.4)));
    }

    #[test]
    fn malformed_location_becomes_none() {
        let plant = Plant::from(record(Some("not json")));
        assert_eq!(plant.location, None);
    }

    #[test]
    fn age_days_counts_from_birth() {
        let yesterday = Utc::now().date_naive() - chrono::Days::new(1);
        let plant = Plant {
            id: DeviceId::new("abc"),
            nickname: "x".into(),
            species: None,
            birth: Some(yesterday),
            location: None,
        };
        assert_eq!(plant.age_days(), Some(1));
    }

    #[test]
    fn unparseable_coords_are_none() {
        let loc = GeoLocation {
            display_name: "??".into(),
            lat: "not-a-number".into(),
            lon: "13.4".into(),
        };
        assert_eq!(loc.coords(), None);
    }
}
