// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Trace propagation through the background-job queue. The trace header
//! and a business-context snapshot ride inside the job payload under two
//! reserved keys.

use serde_json::{Map, Value};
use std::fmt::Display;
use std::future::Future;
use std::time::SystemTime;
use tracing::{debug, error};

use exray_core::codec;
use exray_core::context::BusinessContext;
use exray_core::store::{ContextScope, ContextStore};

use crate::propagator::Propagator;

/// Payload key carrying the serialized trace header.
pub const TRACE_PAYLOAD_KEY: &str = "exis_ray_trace";
/// Payload key carrying the business-context snapshot.
pub const CONTEXT_PAYLOAD_KEY: &str = "exis_ray_context";

impl Propagator {
    /// Embeds the current trace and business context into a job payload
    /// about to be enqueued. Without an active trace the payload is left
    /// untouched.
    pub fn inject_job(
        &self,
        store: &ContextStore,
        payload: &mut Map<String, Value>,
        now: SystemTime,
    ) {
        if store.trace().root_id.is_none() {
            debug!("No active trace, job enqueued without trace context");
            return;
        }
        payload.insert(
            TRACE_PAYLOAD_KEY.to_string(),
            Value::String(codec::generate(store.trace(), now)),
        );

        let snapshot = store.business();
        if !snapshot.is_empty() {
            match serde_json::to_value(snapshot) {
                Ok(snapshot) => {
                    payload.insert(CONTEXT_PAYLOAD_KEY.to_string(), snapshot);
                }
                Err(err) => debug!("Could not snapshot business context: {err}"),
            }
        }
    }

    /// Hydrates the store from a dequeued job payload.
    ///
    /// A payload without a usable trace key means the job was enqueued
    /// outside any trace; a fresh root is originated so the job's own
    /// outbound calls still chain together.
    pub fn rehydrate_job(
        &self,
        store: &mut ContextStore,
        job_type: &str,
        payload: &Map<String, Value>,
        now: SystemTime,
    ) {
        {
            let trace = store.trace_mut();
            trace.created_at = Some(now);
            trace.service_name = format!("{}-{}", self.config.queue_worker_name, job_type);
        }

        match payload
            .get(TRACE_PAYLOAD_KEY)
            .and_then(Value::as_str)
            .filter(|raw| !raw.is_empty())
        {
            Some(raw) => {
                if let Ok(parsed) = codec::parse(raw) {
                    parsed.apply(store.trace_mut());
                }
                store.trace_mut().raw_header = Some(raw.to_string());
            }
            None => {
                store.trace_mut().root_id = Some(codec::generate_new_root(None, now));
            }
        }

        if let Some(context) = payload.get(CONTEXT_PAYLOAD_KEY) {
            match serde_json::from_value::<BusinessContext>(context.clone()) {
                Ok(snapshot) => {
                    if let Some(user_id) = snapshot.user_id {
                        store.set_user_id(user_id);
                    }
                    if let Some(isp_id) = snapshot.isp_id {
                        store.set_isp_id(isp_id);
                    }
                    if let Some(correlation_id) = snapshot.correlation_id {
                        store.set_correlation_id(&correlation_id);
                    }
                }
                Err(err) => debug!("Unusable business context on job {job_type}: {err}"),
            }
        }
    }

    /// Rehydrates the store from the payload, runs the job body, and
    /// resets the store however the body ends — success, error, or a
    /// cancelled future. Body errors are logged and propagated unchanged.
    ///
    /// The body reads the hydrated store before building its future; hosts
    /// that need to mutate the store mid-job compose [`ContextScope`] with
    /// [`Propagator::rehydrate_job`] directly.
    pub async fn run_job<F, Fut, T, E>(
        &self,
        store: &mut ContextStore,
        job_type: &str,
        payload: &Map<String, Value>,
        body: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&ContextStore) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut scope = ContextScope::enter(store);
        self.rehydrate_job(&mut scope, job_type, payload, SystemTime::now());
        let correlation_id = scope.correlation_id();
        debug!("Job {job_type} running with correlation id {correlation_id}");

        let result = body(&scope).await;
        if let Err(err) = &result {
            error!("Job {job_type} failed: {err}");
        }
        result
    }
}
