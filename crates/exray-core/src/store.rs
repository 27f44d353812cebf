// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Scoped storage for the trace, business, and reporting contexts of one
//! unit of work.
//!
//! A store is exclusively owned by the worker processing that unit and
//! performs no synchronization of its own: safety comes from the
//! one-store-per-worker discipline plus the mandatory [`ContextStore::reset`]
//! before the worker picks up unrelated work. Leaking fields across that
//! boundary is the severest bug class this engine guards against.

use serde_json::Value;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::debug;

use crate::bridge::{BusinessBridge, ReportingSink};
use crate::context::{BusinessContext, ReportingContext, TraceContext};

type ResetListener = Box<dyn Fn() + Send + Sync>;

/// Per-unit-of-work storage for the three propagation contexts.
pub struct ContextStore {
    trace: TraceContext,
    business: BusinessContext,
    reporting: ReportingContext,
    business_bridge: Option<Arc<dyn BusinessBridge>>,
    reporting_sink: Option<Arc<dyn ReportingSink>>,
    reset_listeners: Vec<ResetListener>,
}

impl ContextStore {
    pub fn new(
        business_bridge: Option<Arc<dyn BusinessBridge>>,
        reporting_sink: Option<Arc<dyn ReportingSink>>,
    ) -> Self {
        ContextStore {
            trace: TraceContext::default(),
            business: BusinessContext::default(),
            reporting: ReportingContext::default(),
            business_bridge,
            reporting_sink,
            reset_listeners: Vec::new(),
        }
    }

    /// A store with no collaborators wired in.
    pub fn detached() -> Self {
        Self::new(None, None)
    }

    pub fn trace(&self) -> &TraceContext {
        &self.trace
    }

    pub fn trace_mut(&mut self) -> &mut TraceContext {
        &mut self.trace
    }

    pub fn business(&self) -> &BusinessContext {
        &self.business
    }

    pub fn reporting(&self) -> &ReportingContext {
        &self.reporting
    }

    pub fn correlation_id(&self) -> String {
        self.trace.correlation_id()
    }

    /// Stores the user id and signals the business bridge so any memoized
    /// user object is invalidated.
    pub fn set_user_id(&mut self, user_id: Value) {
        if let Some(bridge) = &self.business_bridge {
            bridge.set_user_id(&user_id);
        }
        self.business.user_id = Some(user_id);
    }

    /// Stores the ISP id and signals the business bridge so any memoized
    /// ISP object is invalidated.
    pub fn set_isp_id(&mut self, isp_id: Value) {
        if let Some(bridge) = &self.business_bridge {
            bridge.set_isp_id(&isp_id);
        }
        self.business.isp_id = Some(isp_id);
    }

    /// Stores the correlation id, republishes it into the reporting tags,
    /// and forwards it to the business bridge.
    pub fn set_correlation_id(&mut self, correlation_id: &str) {
        self.business.correlation_id = Some(correlation_id.to_string());
        if let Some(bridge) = &self.business_bridge {
            bridge.set_correlation_id(correlation_id);
        }
        let mut tags = HashMap::new();
        tags.insert(
            "correlation_id".to_string(),
            Value::String(correlation_id.to_string()),
        );
        self.add_tags(tags);
    }

    pub fn add_tags(&mut self, tags: HashMap<String, Value>) {
        if let Some(sink) = &self.reporting_sink {
            sink.add_tags(&tags);
        }
        self.reporting.tags.extend(tags);
    }

    pub fn add_context(&mut self, name: &str, context: Value) {
        if let Some(sink) = &self.reporting_sink {
            sink.add_context(name, &context);
        }
        self.reporting.contexts.insert(name.to_string(), context);
    }

    pub fn add_fingerprint(&mut self, parts: Vec<String>) {
        if let Some(sink) = &self.reporting_sink {
            sink.add_fingerprint(&parts);
        }
        self.reporting.add_fingerprint(parts);
    }

    pub fn set_transaction_name(&mut self, name: &str) {
        if let Some(sink) = &self.reporting_sink {
            sink.set_transaction_name(name);
        }
        self.reporting.transaction_name = Some(name.to_string());
    }

    /// Registers a listener fired on every reset for the life of the store.
    /// Used to clear legacy bridges and memoized lazily-loaded objects that
    /// live outside the store.
    pub fn on_reset(&mut self, listener: impl Fn() + Send + Sync + 'static) {
        self.reset_listeners.push(Box::new(listener));
    }

    /// Restores all three contexts to their defaults and notifies the
    /// collaborators and every reset listener. Must run at the end of every
    /// unit of work, success or not, before the owning worker is reused.
    pub fn reset(&mut self) {
        self.trace = TraceContext::default();
        self.business = BusinessContext::default();
        self.reporting = ReportingContext::default();
        if let Some(bridge) = &self.business_bridge {
            bridge.reset();
        }
        if let Some(sink) = &self.reporting_sink {
            sink.reset();
        }
        for listener in &self.reset_listeners {
            listener();
        }
        debug!("Context store reset");
    }
}

/// Ties a store to one unit of work: the store is reset when the scope
/// drops, whether the body completed, returned an error, panicked, or had
/// its future cancelled.
pub struct ContextScope<'a> {
    store: &'a mut ContextStore,
}

impl<'a> ContextScope<'a> {
    pub fn enter(store: &'a mut ContextStore) -> Self {
        ContextScope { store }
    }
}

impl Deref for ContextScope<'_> {
    type Target = ContextStore;

    fn deref(&self) -> &ContextStore {
        self.store
    }
}

impl DerefMut for ContextScope<'_> {
    fn deref_mut(&mut self) -> &mut ContextStore {
        self.store
    }
}

impl Drop for ContextScope<'_> {
    fn drop(&mut self) {
        self.store.reset();
    }
}
