// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Propagation orchestrator for the trace-chain engine: hydrates the
//! context store from inbound requests and dequeued jobs, injects trace
//! headers into outbound calls and enqueued jobs, and originates fresh
//! traces for scheduled tasks — resetting the store at the end of every
//! unit of work so pooled workers never leak state.

pub mod config;
pub mod error;
pub mod http_client;
pub mod jobs;
pub mod propagator;
pub mod reporting;
pub mod tasks;

pub use config::Config;
pub use error::PropagationError;
pub use http_client::TracedClient;
pub use propagator::Propagator;
pub use reporting::ReportingBackend;
