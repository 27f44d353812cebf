// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Trace origin for scheduled tasks. A task run has no caller, so it mints
//! its own root, salted with the pod ordinal so roots stay attributable to
//! the instance that originated them.

use std::fmt::Display;
use std::future::Future;
use std::time::SystemTime;
use tracing::{debug, error};
use uuid::Uuid;

use exray_core::codec;
use exray_core::store::{ContextScope, ContextStore};

use crate::propagator::Propagator;

impl Propagator {
    /// Seeds a fresh trace for one scheduled task run.
    pub fn originate_task(&self, store: &mut ContextStore, task_name: &str, now: SystemTime) {
        let short_name = task_short_name(task_name);
        let seed = pod_seed(self.config.pod_hostname.as_deref());
        {
            let trace = store.trace_mut();
            trace.created_at = Some(now);
            trace.service_name = format!("{}-Cron-{}", self.config.service_name, short_name);
            trace.root_id = Some(codec::generate_new_root(Some(seed), now));
            trace.request_id = Some(Uuid::new_v4().to_string());
        }
        store.set_transaction_name(short_name);

        let correlation_id = store.correlation_id();
        debug!("Task {task_name} originating trace, correlation id {correlation_id}");
    }

    /// Originates a trace, runs the task body, and resets the store however
    /// the body ends. Body errors are logged and re-raised unchanged.
    pub async fn run_task<F, Fut, T, E>(
        &self,
        store: &mut ContextStore,
        task_name: &str,
        body: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&ContextStore) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut scope = ContextScope::enter(store);
        self.originate_task(&mut scope, task_name, SystemTime::now());

        let result = body(&scope).await;
        if let Err(err) = &result {
            error!("Task {task_name} failed: {err}");
        }
        result
    }
}

/// The short task name: the segment after the last `:` of a namespaced
/// task name, or the name itself.
fn task_short_name(task_name: &str) -> &str {
    task_name.rsplit(':').next().unwrap_or(task_name)
}

/// Numeric seed from the pod hostname: the token after the last `-`,
/// reduced to its leading decimal digits. `billing-api-7` seeds 7; a
/// missing hostname or a token without digits seeds 0.
fn pod_seed(hostname: Option<&str>) -> u64 {
    let hostname = hostname.unwrap_or("local");
    let token = hostname.rsplit('-').next().unwrap_or(hostname);
    let digits: String = token.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_short_name_takes_last_namespace_segment() {
        assert_eq!(task_short_name("billing:sync_invoices"), "sync_invoices");
        assert_eq!(task_short_name("sync_invoices"), "sync_invoices");
    }

    #[test]
    fn test_pod_seed_reads_trailing_ordinal() {
        assert_eq!(pod_seed(Some("billing-api-7")), 7);
        assert_eq!(pod_seed(Some("billing-api-12abc")), 12);
    }

    #[test]
    fn test_pod_seed_defaults_to_zero() {
        assert_eq!(pod_seed(None), 0);
        assert_eq!(pod_seed(Some("localhost")), 0);
        assert_eq!(pod_seed(Some("billing-api-zz")), 0);
    }
}
