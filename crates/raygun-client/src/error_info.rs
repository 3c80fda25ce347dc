// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The error shape the reporter accepts.
//!
//! [`ErrorInfo`] is a narrow structural view of an exception: a message, an
//! optional class name, optional stack text and an optional inner cause.
//! Native Rust errors are adapted into it with [`ErrorInfo::from_error`].

use std::any::type_name;
use std::error::Error as StdError;

/// Class name reported when the error does not carry one.
pub const DEFAULT_CLASS_NAME: &str = "Error";

/// Cause chains deeper than this are cut off.
const MAX_INNER_DEPTH: usize = 32;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    pub message: String,
    pub class_name: Option<String>,
    /// Platform stack text, header line first.
    pub stack: Option<String>,
    pub inner: Option<Box<ErrorInfo>>,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorInfo {
            message: message.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    #[must_use]
    pub fn with_inner(mut self, inner: ErrorInfo) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }

    /// Class name used for reporting and ignore-list matching.
    #[must_use]
    pub fn class_name(&self) -> &str {
        self.class_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_CLASS_NAME)
    }

    /// Adapts a typed Rust error. The class name is the error's type name
    /// without module path or generics; `source()` causes become inner errors.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: StdError + 'static,
    {
        let mut info = Self::from_dyn_error(err);
        info.class_name = Some(short_type_name::<E>().to_string());
        info
    }

    /// Adapts a type-erased error. No class name is available.
    pub fn from_dyn_error(err: &(dyn StdError + 'static)) -> Self {
        Self::from_dyn_error_at_depth(err, 0)
    }

    fn from_dyn_error_at_depth(err: &(dyn StdError + 'static), depth: usize) -> Self {
        let inner = match err.source() {
            Some(source) if depth < MAX_INNER_DEPTH => {
                Some(Box::new(Self::from_dyn_error_at_depth(source, depth + 1)))
            }
            _ => None,
        };
        ErrorInfo {
            message: err.to_string(),
            class_name: None,
            stack: None,
            inner,
        }
    }
}

impl From<&str> for ErrorInfo {
    fn from(message: &str) -> Self {
        ErrorInfo::new(message)
    }
}

impl From<String> for ErrorInfo {
    fn from(message: String) -> Self {
        ErrorInfo::new(message)
    }
}

impl From<&(dyn StdError + 'static)> for ErrorInfo {
    fn from(err: &(dyn StdError + 'static)) -> Self {
        ErrorInfo::from_dyn_error(err)
    }
}

fn short_type_name<E>() -> &'static str {
    let full = type_name::<E>();
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct ConnectionError {
        source: std::io::Error,
    }

    impl fmt::Display for ConnectionError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "failed to reach database")
        }
    }

    impl StdError for ConnectionError {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.source)
        }
    }

    #[test]
    fn test_from_error_uses_type_name_and_source_chain() {
        let err = ConnectionError {
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        let info = ErrorInfo::from_error(&err);

        assert_eq!(info.class_name(), "ConnectionError");
        assert_eq!(info.message, "failed to reach database");
        let inner = info.inner.as_deref().map(|inner| inner.message.as_str());
        assert_eq!(inner, Some("refused"));
        assert_eq!(
            info.inner.as_deref().map(ErrorInfo::class_name),
            Some(DEFAULT_CLASS_NAME)
        );
    }

    #[test]
    fn test_missing_or_empty_class_name_defaults() {
        assert_eq!(ErrorInfo::new("x").class_name(), DEFAULT_CLASS_NAME);
        assert_eq!(
            ErrorInfo::new("x").with_class_name("").class_name(),
            DEFAULT_CLASS_NAME
        );
        assert_eq!(
            ErrorInfo::new("x").with_class_name("TypeError").class_name(),
            "TypeError"
        );
    }

    #[test]
    fn test_short_type_name_strips_path_and_generics() {
        assert_eq!(short_type_name::<std::io::Error>(), "Error");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
        assert_eq!(short_type_name::<ConnectionError>(), "ConnectionError");
    }

    #[test]
    fn test_string_conversions() {
        let info: ErrorInfo = "boom".into();
        assert_eq!(info.message, "boom");
        assert!(info.stack.is_none());
        assert!(info.inner.is_none());
    }
}
