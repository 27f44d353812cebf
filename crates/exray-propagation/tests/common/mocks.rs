// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Recording implementations of the collaborator traits for integration
//! tests.

use exray_core::bridge::{BusinessBridge, ReportingSink};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Business bridge that records every call it receives.
#[derive(Default)]
pub struct RecordingBridge {
    events: Mutex<Vec<String>>,
}

impl RecordingBridge {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl BusinessBridge for RecordingBridge {
    fn set_user_id(&self, user_id: &Value) {
        self.events
            .lock()
            .unwrap()
            .push(format!("set_user_id:{user_id}"));
    }

    fn set_isp_id(&self, isp_id: &Value) {
        self.events
            .lock()
            .unwrap()
            .push(format!("set_isp_id:{isp_id}"));
    }

    fn set_correlation_id(&self, correlation_id: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("set_correlation_id:{correlation_id}"));
    }

    fn reset(&self) {
        self.events.lock().unwrap().push("reset".to_string());
    }
}

/// Reporting sink that records every call it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ReportingSink for RecordingSink {
    fn add_tags(&self, tags: &HashMap<String, Value>) {
        let mut keys: Vec<&str> = tags.keys().map(String::as_str).collect();
        keys.sort_unstable();
        self.events
            .lock()
            .unwrap()
            .push(format!("add_tags:{}", keys.join(",")));
    }

    fn add_context(&self, name: &str, _context: &Value) {
        self.events
            .lock()
            .unwrap()
            .push(format!("add_context:{name}"));
    }

    fn add_fingerprint(&self, parts: &[String]) {
        self.events
            .lock()
            .unwrap()
            .push(format!("add_fingerprint:{}", parts.join(",")));
    }

    fn set_transaction_name(&self, name: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("set_transaction_name:{name}"));
    }

    fn reset(&self) {
        self.events.lock().unwrap().push("reset".to_string());
    }
}
