use std::fmt;

use serde::{Deserialize, Serialize};

/// A WMO weather interpretation code, as returned by the forecast API.
///
/// Code 200 is not a real WMO code; it is the local sentinel shown while
/// the first fetch is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherCode(pub u16);

impl WeatherCode {
    /// Placeholder code until the first forecast response lands.
    pub const LOADING: WeatherCode = WeatherCode(200);

    pub fn is_loading(self) -> bool {
        self == Self::LOADING
    }

    /// Human-readable description of the code.
    pub fn description(self) -> &'static str {
        match self.0 {
            0 => "Clear sky",
            1 => "Mainly clear",
            2 => "Partly cloudy",
            3 => "Overcast",
            45 => "Fog",
            48 => "Depositing rime fog",
            51 => "Light Drizzle",
            53 => "Moderate Drizzle",
            55 => "Dense Drizzle",
            56 => "Light Freezing Drizzle",
            57 => "Dense Freezing Drizzle",
            61 => "Slight Rain",
            63 => "Moderate Rain",
            65 => "Heavy Rain",
            66 => "Light Freezing Rain",
            67 => "Heavy Freezing Rain",
            71 => "Slight Snow fall",
            73 => "Moderate Snow fall",
            75 => "Heavy Snow fall",
            77 => "Snow grains",
            80 => "Slight Rain Showers",
            81 => "Moderate Rain Showers",
            82 => "Violent Rain Showers",
            85 => "Slight Snow Showers",
            86 => "Heavy Snow Showers",
            95 => "Thunderstorm",
            96 => "Thunderstorm with slight hail",
            99 => "Thunderstorm with heavy hail",
            200 => "Loading",
            _ => "Unknown",
        }
    }
}

impl Default for WeatherCode {
    fn default() -> Self {
        Self::LOADING
    }
}

impl fmt::Display for WeatherCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
