//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the profile view server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Path layout and profile-type routing.
    pub routing: RoutingConfig,

    /// Snapshot store settings.
    pub store: StoreConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:10902").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:10902".to_string(),
        }
    }
}

/// How snapshot paths are laid out and routed.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RoutingConfig {
    /// Mount prefix, e.g. "/pprof". No trailing slash.
    pub prefix: String,

    /// Label whose matcher value declares the profile type.
    pub profile_type_label: String,

    /// Profile type served by the trace view adapter.
    pub trace_profile_type: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            prefix: "/pprof".to_string(),
            profile_type_label: "profile_type".to_string(),
            trace_profile_type: "trace".to_string(),
        }
    }
}

/// Snapshot store configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// TOML manifest describing series and sample files.
    /// Without one the server starts with an empty store.
    pub manifest_path: Option<PathBuf>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time before the client receives a timeout response, in seconds.
    /// Store lookups and engine runs are not cancelled by it.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.routing.prefix, "/pprof");
        assert_eq!(config.routing.profile_type_label, "profile_type");
        assert_eq!(config.routing.trace_profile_type, "trace");
        assert!(config.store.manifest_path.is_none());
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml() {
        let config: ServerConfig = toml::from_str(
            r#"
[routing]
prefix = "/profiles"

[store]
manifest_path = "/var/lib/profview/manifest.toml"
"#,
        )
        .unwrap();
        assert_eq!(config.routing.prefix, "/profiles");
        assert_eq!(config.routing.trace_profile_type, "trace");
        assert_eq!(
            config.store.manifest_path,
            Some(PathBuf::from("/var/lib/profview/manifest.toml"))
        );
        assert_eq!(config.timeouts.request_secs, 60);
    }
}
