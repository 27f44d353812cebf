// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use http::HeaderMap;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

use exray_core::bridge::{BusinessBridge, ReportingSink};
use exray_core::codec;
use exray_core::store::ContextStore;

use crate::config::Config;

/// Drives the context store at every propagation boundary: inbound request
/// hydration, outbound header generation, job enqueue/dequeue, and
/// scheduled-task origin.
///
/// Collaborators are wired in once at construction; per-unit state lives
/// entirely in the [`ContextStore`] passed to each call.
pub struct Propagator {
    pub config: Arc<Config>,
    pub business_bridge: Option<Arc<dyn BusinessBridge>>,
    pub reporting_sink: Option<Arc<dyn ReportingSink>>,
}

impl Propagator {
    pub fn new(
        config: Arc<Config>,
        business_bridge: Option<Arc<dyn BusinessBridge>>,
        reporting_sink: Option<Arc<dyn ReportingSink>>,
    ) -> Self {
        Propagator {
            config,
            business_bridge,
            reporting_sink,
        }
    }

    /// A store wired with this propagator's collaborators. One store per
    /// concurrent unit of work; each worker keeps its own instance and
    /// never shares it.
    pub fn new_store(&self) -> ContextStore {
        ContextStore::new(self.business_bridge.clone(), self.reporting_sink.clone())
    }

    /// Hydrates the store from an inbound HTTP request.
    ///
    /// The incoming header is optional; when present it is kept verbatim
    /// for log tagging and parsed into the trace fields. An unparseable
    /// value is logged and otherwise ignored. When a business bridge is
    /// configured and the request carried a root id, the derived
    /// correlation id is published to it.
    pub fn hydrate_request(
        &self,
        store: &mut ContextStore,
        headers: &HeaderMap,
        request_id: &str,
        now: SystemTime,
    ) {
        let raw_header = headers
            .get(self.config.incoming_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        {
            let trace = store.trace_mut();
            trace.created_at = Some(now);
            trace.service_name = format!("{}-HTTP", self.config.service_name);
            trace.request_id = Some(request_id.to_string());
        }

        if let Some(raw) = raw_header {
            match codec::parse(&raw) {
                Ok(parsed) => parsed.apply(store.trace_mut()),
                Err(err) => debug!("Ignoring unusable trace header: {err}"),
            }
            store.trace_mut().raw_header = Some(raw);
        }

        if store.trace().root_id.is_some() && self.business_bridge.is_some() {
            let correlation_id = store.correlation_id();
            store.set_correlation_id(&correlation_id);
        }

        let correlation_id = store.correlation_id();
        debug!("Inbound request hydrated, correlation id {correlation_id}");
    }

    /// Header value for an outbound call, or `None` when no trace is
    /// active and propagation is skipped. Read-only on the store; each
    /// call recomputes cumulative time and mints a fresh self id.
    pub fn outbound_header(&self, store: &ContextStore, now: SystemTime) -> Option<String> {
        if store.trace().root_id.is_none() {
            debug!("No active trace, skipping outbound propagation");
            return None;
        }
        Some(codec::generate(store.trace(), now))
    }
}
