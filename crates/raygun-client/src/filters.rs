// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Key redaction applied to a message before it leaves the process.
//!
//! Any object key matching a configured filter name (case-insensitive) has its
//! value replaced with [`FILTERED_PLACEHOLDER`], at any nesting depth, inside
//! user custom data and the request's headers, query string, form and raw body.

use crate::message::{DiagnosticMessage, RequestDetails};
use serde_json::{Map, Value};

pub const FILTERED_PLACEHOLDER: &str = "[filtered]";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFilter {
    keys: Vec<String>,
}

impl KeyFilter {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        KeyFilter {
            keys: keys
                .into_iter()
                .map(|key| key.as_ref().trim().to_lowercase())
                .filter(|key| !key.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.keys.iter().any(|filtered| *filtered == key)
    }

    pub fn apply(&self, message: &mut DiagnosticMessage) {
        if self.is_empty() {
            return;
        }
        if let Some(data) = message.details.user_custom_data.as_mut() {
            self.redact_map(data);
        }
        if let Some(request) = message.details.request.as_mut() {
            self.redact_request(request);
        }
    }

    fn redact_request(&self, request: &mut RequestDetails) {
        for map in [request.headers.as_mut(), request.query_string.as_mut()]
            .into_iter()
            .flatten()
        {
            self.redact_map(map);
        }
        for value in [request.form.as_mut(), request.raw_data.as_mut()]
            .into_iter()
            .flatten()
        {
            self.redact_value(value);
        }
    }

    fn redact_map(&self, map: &mut Map<String, Value>) {
        for (key, value) in map.iter_mut() {
            if self.matches(key) {
                *value = Value::String(FILTERED_PLACEHOLDER.to_string());
            } else {
                self.redact_value(value);
            }
        }
    }

    fn redact_value(&self, value: &mut Value) {
        match value {
            Value::Object(map) => self.redact_map(map),
            Value::Array(items) => items.iter_mut().for_each(|item| self.redact_value(item)),
            _ => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::message::MessageDetails;
    use chrono::Utc;
    use serde_json::json;

    fn message_with(custom: Value, request: RequestDetails) -> DiagnosticMessage {
        DiagnosticMessage {
            occurred_on: Utc::now(),
            details: MessageDetails {
                user_custom_data: custom.as_object().cloned(),
                request: Some(request),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_masks_nested_custom_data() {
        let filter = KeyFilter::new(["password", "cardNumber"]);
        let mut message = message_with(
            json!({
                "user": "ana",
                "password": "hunter2",
                "payment": {"CardNumber": "4111", "amount": 12},
                "history": [{"password": "old"}, "plain"]
            }),
            RequestDetails::default(),
        );
        filter.apply(&mut message);

        let data = Value::Object(message.details.user_custom_data.unwrap());
        assert_eq!(
            data,
            json!({
                "user": "ana",
                "password": FILTERED_PLACEHOLDER,
                "payment": {"CardNumber": FILTERED_PLACEHOLDER, "amount": 12},
                "history": [{"password": FILTERED_PLACEHOLDER}, "plain"]
            })
        );
    }

    #[test]
    fn test_masks_request_sections() {
        let filter = KeyFilter::new(["authorization", "token"]);
        let request = RequestDetails {
            headers: json!({"authorization": "Bearer abc", "accept": "*/*"})
                .as_object()
                .cloned(),
            query_string: json!({"token": "t0k", "page": "2"}).as_object().cloned(),
            form: Some(json!({"token": "f0rm"})),
            raw_data: Some(json!("token=raw")),
            ..Default::default()
        };
        let mut message = message_with(json!({}), request);
        filter.apply(&mut message);

        let request = message.details.request.unwrap();
        let headers = request.headers.unwrap();
        assert_eq!(headers["authorization"], FILTERED_PLACEHOLDER);
        assert_eq!(headers["accept"], "*/*");
        assert_eq!(request.query_string.unwrap()["token"], FILTERED_PLACEHOLDER);
        assert_eq!(request.form.unwrap()["token"], FILTERED_PLACEHOLDER);
        // string bodies carry no keys to match
        assert_eq!(request.raw_data.unwrap(), json!("token=raw"));
    }

    #[test]
    fn test_empty_filter_is_noop() {
        let filter = KeyFilter::new(Vec::<String>::new());
        assert!(filter.is_empty());
        let mut message = message_with(json!({"password": "x"}), RequestDetails::default());
        let before = message.clone();
        filter.apply(&mut message);
        assert_eq!(message, before);
    }

    #[test]
    fn test_blank_filter_names_are_ignored() {
        let filter = KeyFilter::new(["", "  ", "Secret"]);
        assert!(filter.matches("secret"));
        assert!(filter.matches("SECRET"));
        assert!(!filter.matches(""));
    }
}
