// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Collaborator seams consumed by the context store. Both collaborators are
//! optional; the store only calls them when configured.

use serde_json::Value;
use std::collections::HashMap;

/// Business-context surface of the embedding application.
///
/// Implementations typically memoize the user/ISP objects the ids point at;
/// the setters double as invalidation signals for those caches.
pub trait BusinessBridge: Send + Sync {
    fn set_user_id(&self, user_id: &Value);
    fn set_isp_id(&self, isp_id: &Value);
    fn set_correlation_id(&self, correlation_id: &str);
    /// Clears everything the bridge accumulated for the current unit of
    /// work, memoized lookups included.
    fn reset(&self);
}

/// Error-reporting SDK surface. Which SDK generation backs it is decided
/// once at configuration time, never per call.
pub trait ReportingSink: Send + Sync {
    fn add_tags(&self, tags: &HashMap<String, Value>);
    fn add_context(&self, name: &str, context: &Value);
    fn add_fingerprint(&self, parts: &[String]);
    fn set_transaction_name(&self, name: &str);
    fn reset(&self);
}

/// Sink that drops everything. Stands in when the host has no error
/// reporter configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopReportingSink;

impl ReportingSink for NoopReportingSink {
    fn add_tags(&self, _tags: &HashMap<String, Value>) {}
    fn add_context(&self, _name: &str, _context: &Value) {}
    fn add_fingerprint(&self, _parts: &[String]) {}
    fn set_transaction_name(&self, _name: &str) {}
    fn reset(&self) {}
}
