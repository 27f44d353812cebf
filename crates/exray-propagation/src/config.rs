// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;

use crate::reporting::ReportingBackend;

const DEFAULT_INCOMING_HEADER: &str = "x-amzn-trace-id";
const DEFAULT_OUTGOING_HEADER: &str = "X-Amzn-Trace-Id";
const DEFAULT_QUEUE_WORKER: &str = "Worker";

/// Immutable propagation configuration, built once at startup and passed
/// explicitly to the orchestrator.
#[derive(Clone, Debug)]
pub struct Config {
    /// This process's logical service name; transport tags are appended to
    /// it per unit of work.
    pub service_name: String,
    /// HTTP header read on inbound requests.
    pub incoming_header: String,
    /// HTTP header written on outbound calls.
    pub outgoing_header: String,
    /// Name of the background-job worker, prefixed onto job-run service
    /// names.
    pub queue_worker_name: String,
    /// Pod/instance hostname; its trailing token salts task-originated
    /// root ids.
    pub pod_hostname: Option<String>,
    pub reporting_backend: ReportingBackend,
}

impl Config {
    pub fn from_env() -> Result<Config, Box<dyn std::error::Error>> {
        let service_name = env::var("EXRAY_SERVICE_NAME")
            .map_err(|_| anyhow::anyhow!("EXRAY_SERVICE_NAME environment variable is not set"))?;

        let reporting_backend = match env::var("EXRAY_REPORTING_BACKEND") {
            Ok(raw) => raw.parse::<ReportingBackend>()?,
            Err(_) => ReportingBackend::Modern,
        };

        Ok(Config {
            service_name,
            incoming_header: env::var("EXRAY_INCOMING_HEADER")
                .unwrap_or_else(|_| DEFAULT_INCOMING_HEADER.to_string()),
            outgoing_header: env::var("EXRAY_OUTGOING_HEADER")
                .unwrap_or_else(|_| DEFAULT_OUTGOING_HEADER.to_string()),
            queue_worker_name: env::var("EXRAY_QUEUE_WORKER")
                .unwrap_or_else(|_| DEFAULT_QUEUE_WORKER.to_string()),
            pod_hostname: env::var("HOSTNAME").ok(),
            reporting_backend,
        })
    }
}
