// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::SystemTime;

/// Trace fields for one unit of work (one HTTP request, one queued job run,
/// or one scheduled task run).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraceContext {
    /// The untouched incoming header value, kept for log tagging.
    pub raw_header: Option<String>,
    /// Identifies the whole distributed trace, `1-<8 hex>-<24 hex>`. Fixed
    /// at trace origin and preserved unchanged across every hop in this
    /// process.
    pub root_id: Option<String>,
    /// Identifies this hop. Regenerated on every outbound propagation.
    pub self_id: Option<String>,
    /// Service name of the immediate caller, as received.
    pub called_from: Option<String>,
    /// Cumulative elapsed milliseconds across all hops up to entry into
    /// this process.
    pub total_time_so_far_ms: u64,
    /// When this process began handling the unit of work.
    pub created_at: Option<SystemTime>,
    /// This process's logical name, optionally suffixed with a transport
    /// tag (`-HTTP`, `-Cron-<Task>`, or `<worker>-<job type>`).
    pub service_name: String,
    /// Opaque identifier for this hop; self ids are derived from it.
    pub request_id: Option<String>,
}

impl TraceContext {
    /// Human-searchable correlation string for logs and error reports: the
    /// service name and root id joined with `;`.
    pub fn correlation_id(&self) -> String {
        format!(
            "{};{}",
            self.service_name,
            self.root_id.as_deref().unwrap_or("")
        )
    }
}

/// Business identifiers carried alongside the trace.
///
/// Also the serde model of the `exis_ray_context` job-payload snapshot:
/// absent fields are omitted on serialize and stay `None` on deserialize.
/// `user_id` and `isp_id` are opaque scalars owned by the embedding
/// application, so they are carried as raw JSON values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isp_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl BusinessContext {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.isp_id.is_none() && self.correlation_id.is_none()
    }
}

/// Tags, structured contexts, fingerprint, and transaction name destined
/// for the error reporter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportingContext {
    pub tags: HashMap<String, Value>,
    pub contexts: HashMap<String, Value>,
    /// Fingerprint parts, first-seen order, duplicates dropped.
    pub fingerprint: Vec<String>,
    pub transaction_name: Option<String>,
}

impl ReportingContext {
    /// Appends fingerprint parts, keeping first-seen order and dropping
    /// parts already recorded.
    pub fn add_fingerprint<I, S>(&mut self, parts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for part in parts {
            let part = part.into();
            if !self.fingerprint.contains(&part) {
                self.fingerprint.push(part);
            }
        }
    }
}
