use serde::{Deserialize, Serialize};

use leaflink_api::SensorReport;

/// The latest complete sensor reading for one device.
///
/// Always replaced wholesale when a report arrives; fields are never
/// merged across reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Soil moisture, percent.
    pub soil: f64,
    /// Air temperature, degrees Celsius.
    pub temp: f64,
    /// Relative air humidity, percent.
    pub humid: f64,
    /// Ambient light, lux.
    pub light: f64,
}

impl From<SensorReport> for TelemetrySnapshot {
    fn from(report: SensorReport) -> Self {
        Self {
            soil: report.soil,
            temp: report.temp,
            humid: report.humid,
            light: report.light,
        }
    }
}
