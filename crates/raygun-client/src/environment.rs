// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Host and runtime facts attached to a diagnostic message.
//!
//! Inspection sits behind [`EnvironmentInspector`] so tests can swap the real
//! OS reads for a fixed snapshot.

use chrono::{Local, Offset};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use sysinfo::System;
use tracing::debug;

const UNKNOWN: &str = "unknown";

/// Snapshot of machine facts. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentInfo {
    pub processor_count: usize,
    pub os_version: String,
    pub cpu: String,
    pub architecture: String,
    /// Bytes
    pub total_physical_memory: u64,
    /// Bytes, fluctuates between snapshots
    pub available_physical_memory: u64,
    /// Whole hours east of UTC
    pub utc_offset: i32,
}

pub trait EnvironmentInspector: Send + Sync + Debug {
    fn snapshot(&self) -> EnvironmentInfo;
}

/// Reads facts from the running host through `sysinfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInspector;

impl EnvironmentInspector for SystemInspector {
    fn snapshot(&self) -> EnvironmentInfo {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();

        let processor_count = match sys.cpus().len() {
            0 => std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1),
            n => n,
        };

        let cpu = sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty())
            .unwrap_or_else(|| {
                debug!("Could not read CPU model, reporting '{UNKNOWN}'");
                UNKNOWN.to_string()
            });

        EnvironmentInfo {
            processor_count,
            os_version: os_version(),
            cpu,
            architecture: architecture(std::env::consts::ARCH).to_string(),
            total_physical_memory: sys.total_memory(),
            available_physical_memory: sys.available_memory(),
            utc_offset: utc_offset_hours(),
        }
    }
}

/// Joins OS name, release and kernel into one string, e.g. `Ubuntu 22.04 6.5.0-1`.
fn os_version() -> String {
    let parts: Vec<String> = [
        System::name(),
        System::os_version(),
        System::kernel_version(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.trim().is_empty())
    .collect();

    if parts.is_empty() {
        std::env::consts::OS.to_string()
    } else {
        parts.join(" ")
    }
}

/// Maps Rust target names to the names the collector groups by.
fn architecture(arch: &str) -> &str {
    match arch {
        "x86_64" => "x64",
        "x86" => "ia32",
        "aarch64" => "arm64",
        "" => UNKNOWN,
        other => other,
    }
}

fn utc_offset_hours() -> i32 {
    Local::now().offset().fix().local_minus_utc() / 3600
}
