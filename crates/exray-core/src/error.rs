// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors from the trace-context engine.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// The raw trace header was empty. A malformed-but-present header never
    /// errors; its bad segments degrade to missing fields instead.
    #[error("Trace header is empty")]
    EmptyHeader,
}
