// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;
use std::sync::Arc;

use exray_core::bridge::ReportingSink;

use crate::error::PropagationError;

/// Which error-reporting SDK generation the host runs. Decided once from
/// configuration; nothing branches on it per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportingBackend {
    /// The deprecated reporting SDK still deployed on older services.
    Legacy,
    /// The current reporting SDK.
    Modern,
}

impl FromStr for ReportingBackend {
    type Err = PropagationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "legacy" => Ok(ReportingBackend::Legacy),
            "modern" => Ok(ReportingBackend::Modern),
            _ => Err(PropagationError::UnknownReportingBackend(raw.to_string())),
        }
    }
}

/// Picks the sink adapter for the configured backend. Called exactly once,
/// at composition time; the chosen sink is what every store forwards to.
pub fn select_sink(
    backend: ReportingBackend,
    legacy: Arc<dyn ReportingSink>,
    modern: Arc<dyn ReportingSink>,
) -> Arc<dyn ReportingSink> {
    match backend {
        ReportingBackend::Legacy => legacy,
        ReportingBackend::Modern => modern,
    }
}
