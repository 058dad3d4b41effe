// ── Coordinator configuration ──

use secrecy::SecretString;
use url::Url;

use leaflink_api::BrokerConfig;

/// Everything the session coordinator needs to talk to the outside world.
///
/// Built by `leaflink-config` from the TOML profile, environment, and the
/// credential chain; consumed by [`SessionManager`](crate::SessionManager)
/// and [`PlantMonitor`](crate::PlantMonitor).
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Backend base URL (trailing slash significant for joins).
    pub server_url: Url,

    /// Broker connection settings.
    pub broker: BrokerConfig,

    /// Topic namespace the device firmware publishes under.
    pub namespace: String,

    /// Bearer token, when signed in.
    pub auth_token: Option<SecretString>,

    /// Locally generated, persisted client-instance identifier. Feeds the
    /// broker client id together with a per-session random suffix.
    pub instance_id: String,
}

impl CoordinatorConfig {
    /// Default topic namespace (the firmware's wire namespace).
    pub const DEFAULT_NAMESPACE: &'static str = "flowey";
}
