// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Request context captured alongside an error.

use http::request::Parts;
use http::HeaderMap;
use serde_json::{Map, Value};

/// Request facts supplied by the web layer. Every field is optional and an
/// absent field stays absent in the diagnostic message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    pub host_name: Option<String>,
    pub url: Option<String>,
    pub http_method: Option<String>,
    pub ip_address: Option<String>,
    pub query_string: Option<Map<String, Value>>,
    pub headers: Option<Map<String, Value>>,
    pub form: Option<Value>,
    pub raw_data: Option<Value>,
}

impl RequestContext {
    /// Extracts host, path, method, client address, query parameters and
    /// headers from a standard `http` request head.
    #[must_use]
    pub fn from_parts(parts: &Parts) -> Self {
        let host_name = header_str(&parts.headers, http::header::HOST)
            .or_else(|| parts.uri.authority().map(|authority| authority.as_str().to_string()));

        let ip_address = header_str(&parts.headers, "x-forwarded-for")
            .and_then(|forwarded| {
                forwarded
                    .split(',')
                    .map(str::trim)
                    .find(|addr| !addr.is_empty())
                    .map(str::to_string)
            })
            .or_else(|| header_str(&parts.headers, "x-real-ip"));

        RequestContext {
            host_name,
            url: Some(parts.uri.path().to_string()),
            http_method: Some(parts.method.as_str().to_string()),
            ip_address,
            query_string: parts.uri.query().map(parse_query).filter(|q| !q.is_empty()),
            headers: Some(headers_to_map(&parts.headers)).filter(|h| !h.is_empty()),
            form: None,
            raw_data: None,
        }
    }

    #[must_use]
    pub fn with_form(mut self, form: Value) -> Self {
        self.form = Some(form);
        self
    }

    #[must_use]
    pub fn with_raw_data(mut self, raw_data: impl Into<Value>) -> Self {
        self.raw_data = Some(raw_data.into());
        self
    }
}

fn header_str<K: http::header::AsHeaderName>(headers: &HeaderMap, key: K) -> Option<String> {
    headers
        .get(key)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Repeated parameters collect into an array in arrival order.
fn parse_query(query: &str) -> Map<String, Value> {
    let mut params = Map::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = Value::String(value.into_owned());
        match params.get_mut(&*key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                params.insert(key.into_owned(), value);
            }
        }
    }
    params
}

/// Multi-valued headers are joined with `", "`; non UTF-8 values become empty strings.
fn headers_to_map(headers: &HeaderMap) -> Map<String, Value> {
    let mut map = Map::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|value| value.to_str().unwrap_or_default())
            .collect::<Vec<_>>()
            .join(", ");
        map.insert(name.as_str().to_string(), Value::String(joined));
    }
    map
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parts(builder: http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_from_parts_extracts_request_head() {
        let head = parts(
            http::Request::builder()
                .method("POST")
                .uri("https://shop.example.com/cart/checkout?item=42&item=7&coupon=SAVE")
                .header("Host", "shop.example.com")
                .header("X-Forwarded-For", "203.0.113.9, 10.0.0.1")
                .header("Accept", "text/html")
                .header("Accept", "application/json"),
        );
        let request = RequestContext::from_parts(&head);

        assert_eq!(request.host_name.as_deref(), Some("shop.example.com"));
        assert_eq!(request.url.as_deref(), Some("/cart/checkout"));
        assert_eq!(request.http_method.as_deref(), Some("POST"));
        assert_eq!(request.ip_address.as_deref(), Some("203.0.113.9"));

        let query = request.query_string.unwrap();
        assert_eq!(query["item"], json!(["42", "7"]));
        assert_eq!(query["coupon"], json!("SAVE"));

        let headers = request.headers.unwrap();
        assert_eq!(headers["accept"], json!("text/html, application/json"));
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let head = parts(http::Request::builder().uri("/health"));
        let request = RequestContext::from_parts(&head);

        assert_eq!(request.host_name, None);
        assert_eq!(request.ip_address, None);
        assert_eq!(request.query_string, None);
        assert_eq!(request.headers, None);
        assert_eq!(request.form, None);
        assert_eq!(request.raw_data, None);
        assert_eq!(request.http_method.as_deref(), Some("GET"));
    }

    #[test]
    fn test_host_falls_back_to_uri_authority_and_real_ip() {
        let head = parts(
            http::Request::builder()
                .uri("http://api.internal:8080/v1/users")
                .header("X-Real-IP", "198.51.100.4"),
        );
        let request = RequestContext::from_parts(&head);
        assert_eq!(request.host_name.as_deref(), Some("api.internal:8080"));
        assert_eq!(request.ip_address.as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn test_body_setters() {
        let request = RequestContext::default()
            .with_form(json!({"name": "a"}))
            .with_raw_data("name=a");
        assert_eq!(request.form, Some(json!({"name": "a"})));
        assert_eq!(request.raw_data, Some(json!("name=a")));
    }
}
