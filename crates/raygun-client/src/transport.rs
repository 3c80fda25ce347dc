// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery of diagnostic messages to the collector.
//!
//! A [`Transport`] makes at most one attempt per message and always resolves
//! to a [`SendResponse`]; failures are values, never panics or early returns.
//!
//! ```text
//!   DiagnosticMessage ──> JSON ──> POST {host}/entries ──> SendResponse
//!                                  X-ApiKey: <key>
//! ```

use crate::config::ClientConfig;
use crate::error::DeliveryError;
use crate::http_client::get_client;
use crate::message::DiagnosticMessage;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt::Debug;
use std::time::Instant;
use tracing::{debug, error};

pub const API_KEY_HEADER: &str = "X-ApiKey";

/// Why a message was not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressReason {
    /// The error class is on the ignore list
    IgnoredClass(String),
    /// The before-send hook dropped the message
    BeforeSend,
}

/// Outcome handed to the caller exactly once per send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResponse {
    /// The collector answered. Only 202 counts as success.
    Delivered { status_code: u16, body: String },
    /// No response was obtained.
    Failed(DeliveryError),
    /// Dropped by policy; no network call was made.
    Suppressed(SuppressReason),
    /// Offline mode; no network call was made.
    Offline,
}

impl SendResponse {
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SendResponse::Delivered { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status_code() == Some(StatusCode::ACCEPTED.as_u16())
    }
}

#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn send(&self, message: &DiagnosticMessage) -> SendResponse;
}

/// Posts JSON messages to the collector over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl HttpTransport {
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        HttpTransport {
            client: get_client(config),
            url: config.entries_url(),
            api_key: config.api_key.clone(),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn create_request(&self, body: Vec<u8>) -> reqwest::RequestBuilder {
        self.client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("Content-Type", "application/json")
            .body(body)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, message: &DiagnosticMessage) -> SendResponse {
        let body = match serde_json::to_vec(message) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to serialize message. Data dropped: {}", e);
                return SendResponse::Failed(DeliveryError::Payload(e.to_string()));
            }
        };

        let time = Instant::now();
        let resp = self.create_request(body).send().await;
        let elapsed = time.elapsed();

        match resp {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                match status {
                    StatusCode::ACCEPTED => {
                        debug!("Message accepted in {} ms", elapsed.as_millis());
                    }
                    StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                        error!(
                            "{}: Message rejected by collector. Please verify that your API key is valid.",
                            status
                        );
                    }
                    unexpected_status_code => {
                        error!(
                            "{}: Failed to push message to collector: {:?}",
                            unexpected_status_code, body
                        );
                    }
                }
                SendResponse::Delivered {
                    status_code: status.as_u16(),
                    body,
                }
            }
            Err(e) => {
                error!(
                    "Failed to send message after {} ms: {:?}",
                    elapsed.as_millis(),
                    e
                );
                SendResponse::Failed(DeliveryError::from(e))
            }
        }
    }
}
