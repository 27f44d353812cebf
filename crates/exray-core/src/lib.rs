// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Trace-chain engine: the wire codec for the `Root=..;Self=..` trace
//! header, the per-unit-of-work context model, and the scoped store that
//! guarantees contexts are reset before a pooled worker is reused.

pub mod bridge;
pub mod codec;
pub mod context;
pub mod error;
pub mod store;

pub use context::{BusinessContext, ReportingContext, TraceContext};
pub use error::TraceError;
pub use store::{ContextScope, ContextStore};
