// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Reporting client facade.
//!
//! [`Client`] owns the configuration, builds one message per send and hands
//! it to a [`Transport`]. Policies run in this order:
//!
//! 1. ignored error classes are suppressed before anything is built
//! 2. the message is built (custom data defects are returned synchronously)
//! 3. the grouping key callback runs
//! 4. key filters redact custom data and request fields
//! 5. the before-send hook may rewrite or drop the message
//! 6. offline mode short-circuits the network call
//!
//! Every path that gets past step 2 completes with exactly one [`SendResponse`].

use crate::builder::MessageBuilder;
use crate::config::ClientConfig;
use crate::environment::{EnvironmentInspector, SystemInspector};
use crate::error::{BuildError, ConfigError, DeliveryError};
use crate::error_info::ErrorInfo;
use crate::filters::KeyFilter;
use crate::hostname::get_machine_name;
use crate::message::{DiagnosticMessage, UserDetails};
use crate::request::RequestContext;
use crate::transport::{HttpTransport, SendResponse, SuppressReason, Transport};
use serde_json::Value;
use std::fmt::{self, Debug};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, error};

pub type BeforeSendFn = Arc<dyn Fn(DiagnosticMessage) -> Option<DiagnosticMessage> + Send + Sync>;
pub type GroupingKeyFn = Arc<dyn Fn(&DiagnosticMessage, &ErrorInfo) -> Option<String> + Send + Sync>;

/// Per-send extras: custom data, request and tags.
#[derive(Debug, Clone, Default)]
pub struct SendContext {
    pub custom_data: Option<Value>,
    pub request: Option<RequestContext>,
    pub tags: Vec<String>,
}

impl SendContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Must be a JSON object by the time the message is built.
    #[must_use]
    pub fn with_custom_data(mut self, custom_data: Value) -> Self {
        self.custom_data = Some(custom_data);
        self
    }

    #[must_use]
    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = Some(request);
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Resolves once to the outcome of a [`Client::send`].
#[derive(Debug)]
pub struct SendHandle {
    rx: oneshot::Receiver<SendResponse>,
}

impl SendHandle {
    pub async fn wait(self) -> SendResponse {
        self.rx
            .await
            .unwrap_or(SendResponse::Failed(DeliveryError::Dropped))
    }
}

enum Prepared {
    Ready(DiagnosticMessage),
    Done(SendResponse),
}

#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    inspector: Arc<dyn EnvironmentInspector>,
    filter: KeyFilter,
    machine_name: String,
    user: Option<UserDetails>,
    version: Option<String>,
    before_send: Option<BeforeSendFn>,
    grouping_key: Option<GroupingKeyFn>,
}

impl Client {
    /// Validates `config` and sets up the HTTP transport.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let transport = Arc::new(HttpTransport::new(&config));
        Self::with_transport(config, transport)
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let machine_name = config
            .machine_name
            .clone()
            .unwrap_or_else(get_machine_name);
        Ok(Client {
            filter: KeyFilter::new(&config.filters),
            machine_name,
            config: Arc::new(config),
            transport,
            inspector: Arc::new(SystemInspector),
            user: None,
            version: None,
            before_send: None,
            grouping_key: None,
        })
    }

    #[must_use]
    pub fn with_inspector(mut self, inspector: Arc<dyn EnvironmentInspector>) -> Self {
        self.inspector = inspector;
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: impl Into<UserDetails>) -> Self {
        self.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Runs on every redacted message; returning `None` drops it.
    #[must_use]
    pub fn on_before_send<F>(mut self, hook: F) -> Self
    where
        F: Fn(DiagnosticMessage) -> Option<DiagnosticMessage> + Send + Sync + 'static,
    {
        self.before_send = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn with_grouping_key<F>(mut self, grouping_key: F) -> Self
    where
        F: Fn(&DiagnosticMessage, &ErrorInfo) -> Option<String> + Send + Sync + 'static,
    {
        self.grouping_key = Some(Arc::new(grouping_key));
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds the message `send` would deliver, before filters and hooks.
    pub fn build_message(
        &self,
        error: &ErrorInfo,
        context: &SendContext,
    ) -> Result<DiagnosticMessage, BuildError> {
        let mut builder = MessageBuilder::with_inspector(Arc::clone(&self.inspector));
        builder
            .report_column_numbers(self.config.report_column_numbers)
            .set_error_details(error)
            .set_environment_details()
            .set_machine_name(self.machine_name.as_str());

        if let Some(custom_data) = &context.custom_data {
            builder.set_user_custom_data(custom_data)?;
        }
        if let Some(request) = &context.request {
            builder.set_request_details(request);
        }
        if !self.config.tags.is_empty() || !context.tags.is_empty() {
            builder.set_tags(self.config.tags.iter().chain(&context.tags).cloned());
        }
        if let Some(user) = &self.user {
            builder.set_user(user.clone());
        }
        if let Some(version) = &self.version {
            builder.set_version(version.as_str());
        }

        let mut message = builder.build();
        if let Some(grouping_key) = &self.grouping_key {
            message.details.grouping_key = grouping_key(&message, error);
        }
        Ok(message)
    }

    fn prepare(&self, error: &ErrorInfo, context: &SendContext) -> Result<Prepared, BuildError> {
        let class_name = error.class_name();
        if self.config.is_ignored(class_name) {
            debug!("Skipping send: error class '{}' is ignored", class_name);
            return Ok(Prepared::Done(SendResponse::Suppressed(
                SuppressReason::IgnoredClass(class_name.to_string()),
            )));
        }

        let mut message = self.build_message(error, context)?;
        self.filter.apply(&mut message);

        if let Some(before_send) = &self.before_send {
            match before_send(message) {
                Some(rewritten) => message = rewritten,
                None => {
                    debug!("Skipping send: message dropped by before-send hook");
                    return Ok(Prepared::Done(SendResponse::Suppressed(
                        SuppressReason::BeforeSend,
                    )));
                }
            }
        }

        if self.config.offline {
            debug!("Skipping send: client is offline");
            return Ok(Prepared::Done(SendResponse::Offline));
        }

        Ok(Prepared::Ready(message))
    }

    /// Fire-and-forget send. `callback` runs exactly once with the outcome,
    /// inline for suppressed/offline sends, otherwise on the current tokio
    /// runtime once the request completes.
    ///
    /// Only a malformed custom data value is returned as an error.
    pub fn send_with_callback<F>(
        &self,
        error: impl Into<ErrorInfo>,
        context: SendContext,
        callback: F,
    ) -> Result<(), BuildError>
    where
        F: FnOnce(SendResponse) + Send + 'static,
    {
        let error = error.into();
        let message = match self.prepare(&error, &context)? {
            Prepared::Done(response) => {
                callback(response);
                return Ok(());
            }
            Prepared::Ready(message) => message,
        };

        match Handle::try_current() {
            Ok(handle) => {
                let transport = Arc::clone(&self.transport);
                handle.spawn(async move {
                    let response = transport.send(&message).await;
                    callback(response);
                });
            }
            Err(e) => {
                error!("Failed to dispatch message: {}", e);
                callback(SendResponse::Failed(DeliveryError::NoRuntime));
            }
        }
        Ok(())
    }

    /// Fire-and-forget send whose outcome can be awaited through the handle.
    pub fn send(
        &self,
        error: impl Into<ErrorInfo>,
        context: SendContext,
    ) -> Result<SendHandle, BuildError> {
        let (tx, rx) = oneshot::channel();
        self.send_with_callback(error, context, move |response| {
            // the receiver may have been dropped; nobody is waiting then
            let _ = tx.send(response);
        })?;
        Ok(SendHandle { rx })
    }

    /// Sends and awaits the outcome on the caller's task.
    pub async fn send_async(
        &self,
        error: impl Into<ErrorInfo>,
        context: SendContext,
    ) -> Result<SendResponse, BuildError> {
        let error = error.into();
        match self.prepare(&error, &context)? {
            Prepared::Done(response) => Ok(response),
            Prepared::Ready(message) => Ok(self.transport.send(&message).await),
        }
    }
}

impl Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.config.host)
            .field("offline", &self.config.offline)
            .field("machine_name", &self.machine_name)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}
