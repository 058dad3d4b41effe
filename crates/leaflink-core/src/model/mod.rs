// ── Domain model ──

mod device;
mod plant;
mod telemetry;
mod weather;

pub use device::DeviceId;
pub use plant::{GeoLocation, Plant};
pub use telemetry::TelemetrySnapshot;
pub use weather::WeatherCode;
