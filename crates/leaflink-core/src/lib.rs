// leaflink-core: Session coordination layer between leaflink-api and consumers.

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod monitor;
pub mod pairing;
pub mod request;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::TelemetryCache;
pub use classify::{Classification, DisplayTier, Threshold, classify};
pub use config::CoordinatorConfig;
pub use error::CoreError;
pub use monitor::PlantMonitor;
pub use pairing::{PairingFlow, PairingStep};
pub use session::{PlantSession, SessionKind, SessionManager, SessionState};

// Re-export model types at the crate root for ergonomics.
pub use model::{DeviceId, GeoLocation, Plant, TelemetrySnapshot, WeatherCode};
