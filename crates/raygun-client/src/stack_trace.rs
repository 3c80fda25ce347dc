// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Stack trace parsing.
//!
//! Turns the multi-line stack text attached to an error into an ordered list of
//! [`StackFrame`]s. Recognized frame shapes:
//!
//! ```text
//!     at Class.method (/path/to/file.js:10:15)
//!     at /path/to/file.js:10:15
//! ```
//!
//! The first line of the text names the error and is skipped. Every other
//! non-blank line yields exactly one frame, in input order. Lines that match
//! neither shape still produce a frame with placeholder fields.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Placeholder class name used when a frame has no class qualifier.
pub const UNKNOWN_CLASS_NAME: &str = "(unknown)";

/// Placeholder method name for bare `at file:line:column` frames.
pub const ANONYMOUS_METHOD_NAME: &str = "(anonymous)";

/// One parsed call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    /// Line in `file_name`, 0 when unknown.
    pub line_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,
    pub class_name: String,
    pub file_name: String,
    pub method_name: String,
}

impl StackFrame {
    fn unparsed(line: &str) -> Self {
        StackFrame {
            line_number: 0,
            column_number: None,
            class_name: UNKNOWN_CLASS_NAME.to_string(),
            file_name: String::new(),
            method_name: line.to_string(),
        }
    }
}

fn frame_regex() -> Option<&'static Regex> {
    static FRAME_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    FRAME_REGEX
        .get_or_init(|| {
            Regex::new(r"^at\s+(?:(?P<method>\S.*?)\s+\((?P<location>.*)\)|(?P<bare>\S.*))$").ok()
        })
        .as_ref()
}

/// Parses raw stack text into frames.
///
/// Never fails. The number of frames equals the number of non-blank lines
/// after the header line.
#[must_use]
pub fn parse_stack_trace(raw: &str) -> Vec<StackFrame> {
    raw.lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_frame)
        .collect()
}

/// Parses a single trimmed frame line.
#[must_use]
pub fn parse_frame(line: &str) -> StackFrame {
    let Some(captures) = frame_regex().and_then(|re| re.captures(line)) else {
        return StackFrame::unparsed(line);
    };

    if let (Some(method), Some(location)) = (captures.name("method"), captures.name("location")) {
        let (file_name, line_number, column_number) = parse_location(location.as_str());
        let (class_name, method_name) = split_qualifier(method.as_str());
        return StackFrame {
            line_number,
            column_number,
            class_name,
            file_name,
            method_name,
        };
    }

    match captures.name("bare") {
        Some(bare) => {
            let (file_name, line_number, column_number) = parse_location(bare.as_str());
            StackFrame {
                line_number,
                column_number,
                class_name: UNKNOWN_CLASS_NAME.to_string(),
                file_name,
                method_name: ANONYMOUS_METHOD_NAME.to_string(),
            }
        }
        None => StackFrame::unparsed(line),
    }
}

/// Splits `file:line:column` (or `file:line`) from the right so drive letters
/// and URL schemes stay in the file name.
fn parse_location(location: &str) -> (String, u32, Option<u32>) {
    let location = location.trim();
    if let Some((rest, last)) = location.rsplit_once(':') {
        if let Ok(last) = last.parse::<u32>() {
            if let Some((file, line)) = rest.rsplit_once(':') {
                if let Ok(line) = line.parse::<u32>() {
                    return (file.to_string(), line, Some(last));
                }
            }
            return (rest.to_string(), last, None);
        }
    }
    (location.to_string(), 0, None)
}

/// Splits `Class.method` on the last separator. `new`/`async` keywords and
/// `[as alias]` suffixes stay with the method name.
fn split_qualifier(qualifier: &str) -> (String, String) {
    let (keyword, rest) = ["new ", "async "]
        .iter()
        .find_map(|kw| qualifier.strip_prefix(kw).map(|rest| (*kw, rest)))
        .unwrap_or(("", qualifier));
    let (base, alias) = match rest.find(" [as ") {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };

    match base.rsplit_once('.') {
        Some((class, method)) if !class.is_empty() && !method.is_empty() => {
            (class.to_string(), format!("{keyword}{method}{alias}"))
        }
        _ => (UNKNOWN_CLASS_NAME.to_string(), qualifier.to_string()),
    }
}
