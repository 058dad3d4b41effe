use std::fmt;

use serde::{Deserialize, Serialize};

use leaflink_api::TopicSet;

/// Identifier of a physical sensor device (one per plant).
///
/// Opaque uuid string minted by the backend at provisioning time. All
/// broker topic names derive from it; one `DeviceId` maps to at most one
/// live session per client process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self(uuid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The device's topic names under the given namespace.
    pub fn topics(&self, namespace: &str) -> TopicSet {
        TopicSet::for_device(namespace, &self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_topics_from_uuid() {
        let id = DeviceId::new("abc");
        let topics = id.topics("flowey");
        assert_eq!(topics.sensors, "/flowey/abc/sensors");
        assert_eq!(topics.status, "/flowey/abc/status");
    }
}
