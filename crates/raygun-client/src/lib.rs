// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! # Raygun client
//!
//! Builds crash diagnostics for an error and ships them to a Raygun collector.
//!
//! - [`builder`]: assembles a [`message::DiagnosticMessage`] from an error
//!   and its surroundings (stack, environment, request, user, tags)
//! - [`stack_trace`]: turns raw textual stack traces into structured frames
//! - [`filters`]: masks sensitive keys before a message leaves the process
//! - [`transport`]: single-attempt JSON delivery over HTTP(S)
//! - [`client`]: the facade applications call, with fire-and-forget and
//!   awaitable sends
//!
//! ```rust,no_run
//! use raygun_client::{Client, ClientConfig, SendContext};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("my-api-key");
//! raygun_client::logger::init_logging(&config.log_level)?;
//! let client = Client::new(config)?;
//! let response = client
//!     .send("payment failed", SendContext::new().with_tags(["checkout"]))?
//!     .wait()
//!     .await;
//! println!("collector answered {:?}", response.status_code());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod builder;
pub mod client;
pub mod config;
pub mod environment;
pub mod error;
pub mod error_info;
pub mod filters;
pub mod hostname;
pub mod http_client;
pub mod logger;
pub mod message;
pub mod request;
pub mod stack_trace;
pub mod transport;

pub use builder::MessageBuilder;
pub use client::{Client, SendContext, SendHandle};
pub use config::ClientConfig;
pub use error::{BuildError, ConfigError, DeliveryError};
pub use error_info::ErrorInfo;
pub use message::{DiagnosticMessage, UserDetails};
pub use request::RequestContext;
pub use transport::{SendResponse, SuppressReason, Transport};
