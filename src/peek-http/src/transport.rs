// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Bounded-concurrency HTTP executor.
//!
//! Every exchange first takes a permit from the shared pool, so at most
//! `max_in_flight` requests reach the device at once no matter how many
//! batches or polls are outstanding. Failures come back as
//! [`TransportError`] values.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::COOKIE;
use reqwest::{Client, RequestBuilder, StatusCode};
use tokio::sync::Semaphore;
use tracing::debug;

use peek_core::TransportError;

pub const DEFAULT_MAX_IN_FLIGHT: usize = 6;
pub const DEFAULT_GET_CONNECT_TIMEOUT: Duration = Duration::from_millis(400);
pub const DEFAULT_POST_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
/// Upper bound on a whole exchange once connected.
pub const DEFAULT_REQUEST_DEADLINE: Duration = Duration::from_secs(30);

/// A completed 200 exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

pub type TransportResult = Result<HttpReply, TransportError>;

/// Shared HTTP sessions and permit pool for one device.
///
/// GETs and POSTs use separate sessions because the connect timeout is a
/// client setting in reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    get_client: Client,
    post_client: Client,
    permits: Arc<Semaphore>,
    deadline: Duration,
}

impl HttpTransport {
    pub fn new(max_in_flight: usize) -> reqwest::Result<Self> {
        Self::with_connect_timeouts(
            max_in_flight,
            DEFAULT_GET_CONNECT_TIMEOUT,
            DEFAULT_POST_CONNECT_TIMEOUT,
        )
    }

    /// `get_connect` and `post_connect` bound connection setup only; a
    /// connected device may take longer to render a page.
    pub fn with_connect_timeouts(
        max_in_flight: usize,
        get_connect: Duration,
        post_connect: Duration,
    ) -> reqwest::Result<Self> {
        Ok(Self {
            get_client: session(get_connect)?,
            post_client: session(post_connect)?,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            deadline: DEFAULT_REQUEST_DEADLINE,
        })
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// GET `url`.
    pub async fn fetch(&self, url: &str) -> TransportResult {
        debug!("GET {}", url);
        self.send(self.get_client.get(url).timeout(self.deadline)).await
    }

    /// POST `fields` form-encoded to `url`, with an optional `Cookie` header.
    pub async fn post_form(
        &self,
        url: &str,
        fields: &[(&'static str, String)],
        cookie: Option<&str>,
    ) -> TransportResult {
        debug!("POST {} {:?}", url, fields);
        let mut request = self.post_client.post(url).timeout(self.deadline).form(fields);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        self.send(request).await
    }

    async fn send(&self, request: RequestBuilder) -> TransportResult {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;
        let response = request.send().await.map_err(classify)?;
        if response.status() != StatusCode::OK {
            debug!("Unexpected status {}", response.status());
            return Err(TransportError::BadControllerType);
        }
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        Ok(HttpReply { status, body })
    }
}

fn session(connect_timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().connect_timeout(connect_timeout).build()
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if is_certificate_error(&err) {
        TransportError::BadControllerType
    } else {
        TransportError::Unreachable(err.to_string())
    }
}

/// Detect a TLS certificate failure anywhere in the error chain.
pub fn is_certificate_error(err: &(dyn Error + 'static)) -> bool {
    if err.to_string().to_ascii_lowercase().contains("certificate") {
        return true;
    }
    err.source().map(is_certificate_error).unwrap_or(false)
}
