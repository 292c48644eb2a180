// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Peek controller orchestration.
//!
//! Polls status pages and drives the set-inputs form through planned
//! batches. Batches are strictly sequential: a batch's POSTs run
//! concurrently under the transport's permit pool, and all of them complete
//! before the next batch starts. A batch that still has faults after the
//! retry budget aborts the whole stage change.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use peek_core::{
    Batch, BatchAttempt, BatchOutcome, ControllerProfile, NoRetry, PageParsers, Payload,
    PayloadVerdict, ProfileError, RetryPolicy, Stage, StageError, StagePlanner,
};

use crate::envelope::{EnvelopeError, RequestEnvelope, ResultRecord, PROTOCOL_HTTP};
use crate::page::{PageKind, PeekRoutes};
use crate::transport::HttpTransport;

pub const SET_STAGE_LABEL: &str = "set_stage";

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no controller host configured")]
    MissingHost,
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Aggregate view of a controller and its accumulated results.
#[derive(Debug, Clone, Serialize)]
pub struct ControllerResponse {
    pub host_id: Option<String>,
    pub address: String,
    pub protocol: &'static str,
    pub results: Vec<ResultRecord>,
}

/// Remote control client for one Peek controller.
pub struct PeekController {
    host_id: Option<String>,
    address: String,
    base_url: String,
    profile: Arc<ControllerProfile>,
    parsers: PageParsers,
    routes: PeekRoutes,
    transport: HttpTransport,
    retry: Arc<dyn RetryPolicy>,
    results: Vec<ResultRecord>,
}

impl PeekController {
    /// `address` is a host, `host:port` or a full base URL.
    pub fn new(
        address: impl Into<String>,
        transport: HttpTransport,
        profile: Arc<ControllerProfile>,
        parsers: PageParsers,
    ) -> Self {
        let address = address.into();
        let base_url = if address.contains("://") {
            address.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", address.trim_end_matches('/'))
        };
        Self {
            host_id: None,
            address,
            base_url,
            profile,
            parsers,
            routes: PeekRoutes::default(),
            transport,
            retry: Arc::new(NoRetry),
            results: Vec::new(),
        }
    }

    pub fn with_host_id(mut self, host_id: impl Into<String>) -> Self {
        self.host_id = Some(host_id.into());
        self
    }

    pub fn with_routes(mut self, routes: PeekRoutes) -> Self {
        self.routes = routes;
        self
    }

    pub fn with_retry(mut self, retry: Arc<dyn RetryPolicy>) -> Self {
        self.retry = retry;
        self
    }

    pub fn host_id(&self) -> Option<&str> {
        self.host_id.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn profile(&self) -> &ControllerProfile {
        &self.profile
    }

    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    /// Drain the accumulated results list.
    pub fn take_results(&mut self) -> Vec<ResultRecord> {
        std::mem::take(&mut self.results)
    }

    pub fn build_response(&self) -> ControllerResponse {
        ControllerResponse {
            host_id: self.host_id.clone(),
            address: self.address.clone(),
            protocol: PROTOCOL_HTTP,
            results: self.results.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Monitoring
    // ------------------------------------------------------------------

    /// Poll the main status page plus any `extras`, concurrently.
    pub async fn poll_status(&mut self, extras: &[PageKind]) -> Vec<ResultRecord> {
        let mut pages = vec![PageKind::MainPage];
        for page in extras {
            if !pages.contains(page) {
                pages.push(*page);
            }
        }
        self.request_pages(&pages).await
    }

    /// Poll only the inputs page.
    pub async fn poll_inputs(&mut self) -> Vec<ResultRecord> {
        self.request_pages(&[PageKind::InputsPage]).await
    }

    /// Dispatch `pages` concurrently. Records of this call are returned and
    /// also appended to the results list.
    pub async fn request_pages(&mut self, pages: &[PageKind]) -> Vec<ResultRecord> {
        debug!("Dispatching {} page request(s) to {}", pages.len(), self.base_url);

        let envelopes =
            futures::future::join_all(pages.iter().map(|page| self.page_envelope(*page).resolve()))
                .await;
        let records: Vec<ResultRecord> = envelopes
            .into_iter()
            .map(|envelope| {
                if let Some(err) = envelope.error() {
                    warn!("{} {}: {}", self.base_url, envelope.label(), err);
                }
                envelope.into_record()
            })
            .collect();
        self.results.extend(records.iter().cloned());
        records
    }

    fn page_envelope(&self, page: PageKind) -> RequestEnvelope {
        let transport = self.transport.clone();
        let url = self.url(self.routes.page(page));
        RequestEnvelope::new(
            page.label(),
            Box::pin(async move { transport.fetch(&url).await }),
        )
        .with_parser(self.parsers.for_kind(page.parser_kind()))
    }

    // ------------------------------------------------------------------
    // Management
    // ------------------------------------------------------------------

    /// Move the controller to `stage` (0 releases manual override).
    ///
    /// Exactly one result record is appended per call: the confirmed stage
    /// on success, or the failure reason.
    pub async fn set_stage(&mut self, stage: i64) -> Result<Stage, StageError> {
        let result = self.try_set_stage(stage).await;
        let record = match &result {
            Ok(stage) => {
                info!("{}: stage {} confirmed", self.base_url, stage);
                ResultRecord {
                    label: SET_STAGE_LABEL.to_string(),
                    protocol: PROTOCOL_HTTP,
                    status: None,
                    data: Some(serde_json::json!({ SET_STAGE_LABEL: stage.get() })),
                    error: None,
                }
            }
            Err(err) => {
                warn!("{}: set_stage({}) failed: {}", self.base_url, stage, err);
                ResultRecord {
                    label: SET_STAGE_LABEL.to_string(),
                    protocol: PROTOCOL_HTTP,
                    status: None,
                    data: None,
                    error: Some(err.to_string()),
                }
            }
        };
        self.results.push(record);
        result
    }

    async fn try_set_stage(&mut self, stage: i64) -> Result<Stage, StageError> {
        let stage = Stage::new(stage)?;

        // Plans are only ever built from a poll made by this call.
        let envelope = self.page_envelope(PageKind::InputsPage).resolve().await;
        if let Some(err) = envelope.error() {
            return Err(StageError::InputsUnavailable(err.to_string()));
        }
        let inputs = envelope
            .processed()
            .and_then(|page| page.inputs())
            .ok_or_else(|| StageError::InputsUnavailable("parser returned no inputs".into()))?;

        let batches = StagePlanner::new(&self.profile).plan(inputs, stage)?;
        for (n, batch) in batches.iter().enumerate() {
            if batch.is_empty() {
                debug!("Batch {} for stage {} is empty", n, stage);
                continue;
            }
            match self.send_batch(batch).await {
                BatchOutcome::Committed { succeeded } => {
                    debug!("Batch {} committed: {:?}", n, succeeded);
                }
                BatchOutcome::Faulted { faulted, .. } => {
                    return Err(StageError::Rejected { faults: faulted });
                }
            }
        }
        Ok(stage)
    }

    /// Send `batch` until an attempt has no faults or the retry budget is
    /// spent. Every attempt re-sends the whole batch.
    async fn send_batch(&self, batch: &Batch) -> BatchOutcome {
        let mut attempt = 0;
        loop {
            let outcome = self.send_batch_once(batch).await;
            match outcome {
                BatchOutcome::Committed { .. } => return outcome,
                BatchOutcome::Faulted { ref faulted, .. } if self.retry.should_retry(attempt) => {
                    warn!(
                        "Batch attempt {}/{} faulted on {:?}; retrying",
                        attempt + 1,
                        self.retry.max_attempts(),
                        faulted
                    );
                    attempt += 1;
                }
                BatchOutcome::Faulted { .. } => return outcome,
            }
        }
    }

    async fn send_batch_once(&self, batch: &Batch) -> BatchOutcome {
        let url = self.url(&self.routes.set_inputs);
        let cookie = self.profile.credentials().cookie_header();
        let mut attempt = BatchAttempt::new(batch.iter().map(Payload::name));

        let mut in_flight: FuturesUnordered<_> = batch
            .iter()
            .map(|payload| self.post_envelope(payload, &url, cookie.clone()).resolve())
            .collect();

        while let Some(envelope) = in_flight.next().await {
            let verdict = judge(&envelope);
            match &verdict {
                PayloadVerdict::Accepted => debug!("{} accepted", envelope.label()),
                PayloadVerdict::Refused(Some(alert)) => {
                    warn!("{} refused: {}", envelope.label(), alert)
                }
                PayloadVerdict::Refused(None) => {
                    warn!("{} refused without alert", envelope.label())
                }
                PayloadVerdict::Failed(err) => warn!("{} failed: {}", envelope.label(), err),
            }
            attempt.settle(envelope.label(), &verdict);
        }
        attempt.finish()
    }

    fn post_envelope(
        &self,
        payload: &Payload,
        url: &str,
        cookie: Option<String>,
    ) -> RequestEnvelope {
        let transport = self.transport.clone();
        let url = url.to_string();
        let fields = payload.fields().clone();
        RequestEnvelope::new(
            payload.name(),
            Box::pin(async move { transport.post_form(&url, &fields, cookie.as_deref()).await }),
        )
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }
}

fn judge(envelope: &RequestEnvelope) -> PayloadVerdict {
    match (envelope.error(), envelope.raw_response()) {
        (Some(EnvelopeError::Transport(err)), _) => PayloadVerdict::Failed(err.clone()),
        (None, Some(body)) => PayloadVerdict::from_reply(Ok(body)),
        _ => PayloadVerdict::Refused(None),
    }
}
