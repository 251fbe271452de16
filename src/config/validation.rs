//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the routing prefix and label names are usable in paths and selectors
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::resolve::selector::is_valid_label_name;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),

    #[error("routing.prefix {0:?} must start with '/' and must not end with '/'")]
    Prefix(String),

    #[error("routing.profile_type_label {0:?} is not a valid label name")]
    ProfileTypeLabel(String),

    #[error("routing.trace_profile_type must not be empty")]
    TraceProfileType,

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let prefix = &config.routing.prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        errors.push(ValidationError::Prefix(prefix.clone()));
    }

    if !is_valid_label_name(&config.routing.profile_type_label) {
        errors.push(ValidationError::ProfileTypeLabel(
            config.routing.profile_type_label.clone(),
        ));
    }

    if config.routing.trace_profile_type.is_empty() {
        errors.push(ValidationError::TraceProfileType);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
