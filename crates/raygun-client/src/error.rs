// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised synchronously while assembling a diagnostic message
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("User custom data must be a key-value mapping, got {found}")]
    CustomDataNotMapping { found: &'static str },

    #[error("Failed to serialize user custom data: {0}")]
    CustomDataSerialization(#[from] serde_json::Error),
}

/// Errors that can occur when loading or validating client configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// Delivery failures that carry no HTTP status code.
///
/// Always reported through the completion path, never returned from `send`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("Request to collector timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to prepare payload: {0}")]
    Payload(String),

    #[error("No async runtime available to dispatch the request")]
    NoRuntime,

    #[error("Delivery task dropped before completing")]
    Dropped,
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DeliveryError::Timeout
        } else {
            DeliveryError::Network(err.to_string())
        }
    }
}
