// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Incremental assembly of a [`DiagnosticMessage`].
//!
//! Setters mutate the builder and return it for chaining. [`MessageBuilder::build`]
//! produces an independent snapshot: mutating the builder afterwards never
//! changes a message that was already built, and the builder can be reused.
//!
//! ```
//! use raygun_client::builder::MessageBuilder;
//! use raygun_client::error_info::ErrorInfo;
//!
//! let message = MessageBuilder::new()
//!     .set_error_details(&ErrorInfo::new("boom"))
//!     .set_machine_name("server1")
//!     .set_tags(["checkout"])
//!     .build();
//! assert_eq!(message.details.machine_name.as_deref(), Some("server1"));
//! ```

use crate::environment::{EnvironmentInspector, SystemInspector};
use crate::error::BuildError;
use crate::error_info::ErrorInfo;
use crate::message::{
    ClientDetails, DiagnosticMessage, ErrorDetails, MessageDetails, RequestDetails, UserDetails,
};
use crate::request::RequestContext;
use crate::stack_trace::parse_stack_trace;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MessageBuilder {
    inspector: Arc<dyn EnvironmentInspector>,
    report_column_numbers: bool,
    details: MessageDetails,
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_inspector(Arc::new(SystemInspector))
    }

    #[must_use]
    pub fn with_inspector(inspector: Arc<dyn EnvironmentInspector>) -> Self {
        MessageBuilder {
            inspector,
            report_column_numbers: false,
            details: MessageDetails::default(),
        }
    }

    /// Keep parsed column numbers on stack frames. Applies to subsequent
    /// `set_error_details` calls.
    pub fn report_column_numbers(&mut self, enabled: bool) -> &mut Self {
        self.report_column_numbers = enabled;
        self
    }

    /// Stores class name, message and parsed stack of `error`, recursing into
    /// its inner error. A missing stack yields an empty frame list.
    pub fn set_error_details(&mut self, error: &ErrorInfo) -> &mut Self {
        self.details.error = Some(error_details(error, self.report_column_numbers, 0));
        self
    }

    /// Takes a fresh environment snapshot, replacing any previous one.
    pub fn set_environment_details(&mut self) -> &mut Self {
        self.details.environment = Some(self.inspector.snapshot());
        self
    }

    pub fn set_machine_name(&mut self, machine_name: impl Into<String>) -> &mut Self {
        self.details.machine_name = Some(machine_name.into());
        self
    }

    /// Stores `data` as user custom data.
    ///
    /// `data` must serialize to a JSON object. Anything else (string, number,
    /// array, null) is rejected with [`BuildError::CustomDataNotMapping`] and
    /// the builder is left unchanged.
    pub fn set_user_custom_data<T>(&mut self, data: &T) -> Result<&mut Self, BuildError>
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_value(data)? {
            Value::Object(map) => {
                self.details.user_custom_data = Some(map);
                Ok(self)
            }
            other => Err(BuildError::CustomDataNotMapping {
                found: value_kind(&other),
            }),
        }
    }

    pub fn set_request_details(&mut self, request: &RequestContext) -> &mut Self {
        self.details.request = Some(RequestDetails {
            host_name: request.host_name.clone(),
            url: request.url.clone(),
            http_method: request.http_method.clone(),
            ip_address: request.ip_address.clone(),
            query_string: request.query_string.clone(),
            headers: request.headers.clone(),
            form: request.form.clone(),
            raw_data: request.raw_data.clone(),
        });
        self
    }

    pub fn set_user(&mut self, user: impl Into<UserDetails>) -> &mut Self {
        self.details.user = Some(user.into());
        self
    }

    pub fn set_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.details.version = Some(version.into());
        self
    }

    /// Stored as given: no sorting, no deduplication.
    pub fn set_tags<I, S>(&mut self, tags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.details.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn set_grouping_key(&mut self, grouping_key: impl Into<String>) -> &mut Self {
        self.details.grouping_key = Some(grouping_key.into());
        self
    }

    /// Snapshots the current state with `occurredOn` set to now.
    #[must_use]
    pub fn build(&self) -> DiagnosticMessage {
        DiagnosticMessage {
            occurred_on: Utc::now(),
            details: MessageDetails {
                client: ClientDetails::default(),
                ..self.details.clone()
            },
        }
    }
}

const MAX_INNER_DEPTH: usize = 32;

fn error_details(error: &ErrorInfo, report_column_numbers: bool, depth: usize) -> ErrorDetails {
    let mut stack_trace = error
        .stack
        .as_deref()
        .map(parse_stack_trace)
        .unwrap_or_default();
    if !report_column_numbers {
        for frame in &mut stack_trace {
            frame.column_number = None;
        }
    }

    let inner_error = match error.inner.as_deref() {
        Some(inner) if depth < MAX_INNER_DEPTH => Some(Box::new(error_details(
            inner,
            report_column_numbers,
            depth + 1,
        ))),
        _ => None,
    };

    ErrorDetails {
        class_name: error.class_name().to_string(),
        message: error.message.clone(),
        stack_trace,
        inner_error,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
