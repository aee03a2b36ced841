use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configuration for a single automation session.
///
/// Opaque to this crate beyond the identifier: the transport layer decides
/// what `endpoint` and `capabilities` mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub id: String,
    pub endpoint: String,
    pub capabilities: serde_json::Map<String, Value>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            endpoint: "http://localhost:4444".to_string(),
            capabilities: serde_json::Map::new(),
        }
    }
}

/// One labeled entry of a multiremote setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    pub label: String,
    #[serde(default)]
    pub session: SessionConfig,
}

impl InstanceConfig {
    pub fn new(label: impl Into<String>, session: SessionConfig) -> Self {
        Self {
            label: label.into(),
            session,
        }
    }
}

/// Ordered multiremote configuration. Declaration order is the order
/// instances are constructed in and the order fan-out results come back in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MultiremoteConfig {
    pub instances: Vec<InstanceConfig>,
}

impl MultiremoteConfig {
    pub fn new(instances: Vec<InstanceConfig>) -> Self {
        Self { instances }
    }

    pub fn with_instance(mut self, label: impl Into<String>, session: SessionConfig) -> Self {
        self.instances.push(InstanceConfig::new(label, session));
        self
    }
}
