// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log formatting for the reporting client.
//!
//! Every line is prefixed with `RAYGUN` so the client's own diagnostics can be
//! told apart from the host application's logs:
//!
//! ```text
//! RAYGUN | LEVEL | [span_name{span_fields}:] message {event_fields}
//! ```
//!
//! Applications that already install a subscriber can plug [`Formatter`] into
//! their own builder; [`init_logging`] is a shortcut for those that don't.

use crate::error::ConfigError;
use std::fmt;
use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext, FormattedFields,
};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

pub const LOG_PREFIX: &str = "RAYGUN";

#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(&mut writer, "{} | {} | ", LOG_PREFIX, metadata.level())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;

                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Filter directive for `log_level`, with noisy HTTP internals silenced.
#[must_use]
pub fn filter_directive(log_level: &str) -> String {
    format!("h2=off,hyper=off,rustls=off,{}", log_level)
}

/// Installs a global subscriber using [`Formatter`].
///
/// Fails if the level does not parse or a global subscriber is already set.
pub fn init_logging(log_level: &str) -> Result<(), ConfigError> {
    let env_filter = EnvFilter::try_new(filter_directive(log_level))
        .map_err(|e| ConfigError::Logging(format!("could not parse log level: {e}")))?;

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .event_format(Formatter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ConfigError::Logging(format!("setting default subscriber failed: {e}")))
}
