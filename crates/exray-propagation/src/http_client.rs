// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use reqwest::{IntoUrl, Method};
use std::sync::Arc;
use std::time::SystemTime;

use exray_core::store::ContextStore;

use crate::propagator::Propagator;

/// Decorator over [`reqwest::Client`] that attaches the configured
/// outgoing trace header to every request built through it. Composed
/// around the real client; the client itself is untouched.
#[derive(Clone)]
pub struct TracedClient {
    inner: reqwest::Client,
    propagator: Arc<Propagator>,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client, propagator: Arc<Propagator>) -> Self {
        TracedClient { inner, propagator }
    }

    /// Starts a request. With an active trace the outgoing header is
    /// attached; without one the request is built untouched.
    pub fn request<U: IntoUrl>(
        &self,
        method: Method,
        url: U,
        store: &ContextStore,
    ) -> reqwest::RequestBuilder {
        let builder = self.inner.request(method, url);
        match self.propagator.outbound_header(store, SystemTime::now()) {
            Some(value) => builder.header(self.propagator.config.outgoing_header.as_str(), value),
            None => builder,
        }
    }

    pub fn get<U: IntoUrl>(&self, url: U, store: &ContextStore) -> reqwest::RequestBuilder {
        self.request(Method::GET, url, store)
    }

    pub fn post<U: IntoUrl>(&self, url: U, store: &ContextStore) -> reqwest::RequestBuilder {
        self.request(Method::POST, url, store)
    }

    /// The wrapped client, for calls that must not carry trace headers.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}
