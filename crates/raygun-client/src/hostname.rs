// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Machine name detection

use std::env;
use sysinfo::System;
use tracing::warn;

/// Get the name reported as `machineName`
///
/// Sources, in order:
/// 1. RAYGUN_MACHINE_NAME environment variable
/// 2. HOSTNAME environment variable
/// 3. OS host name
/// 4. "unknown"
#[must_use]
pub fn get_machine_name() -> String {
    for var in ["RAYGUN_MACHINE_NAME", "HOSTNAME"] {
        if let Ok(name) = env::var(var) {
            if !name.trim().is_empty() {
                return name;
            }
        }
    }

    if let Some(name) = System::host_name().filter(|name| !name.is_empty()) {
        return name;
    }

    warn!("Could not determine machine name, using 'unknown'");
    "unknown".to_string()
}
