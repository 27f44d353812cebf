// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while configuring propagation. Runtime propagation never
/// errors: a missing trace is the no-op path, not a failure.
#[derive(Debug, thiserror::Error)]
pub enum PropagationError {
    #[error("Unknown reporting backend: {0}")]
    UnknownReportingBackend(String),
}
