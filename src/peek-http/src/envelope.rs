// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use peek_core::{PageParser, ParseError, ProcessedPage, TransportError};

use crate::transport::TransportResult;

pub const PROTOCOL_HTTP: &str = "http";

/// Alias to reduce type complexity in RequestEnvelope.
pub type PendingOperation = Pin<Box<dyn Future<Output = TransportResult> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// One logical request to the device and, once resolved, its outcome.
///
/// Created per call and resolved exactly once; either `error` or the raw
/// response (plus parsed data when a parser is attached) is populated.
pub struct RequestEnvelope {
    label: String,
    protocol: &'static str,
    pending: Option<PendingOperation>,
    parser: Option<Arc<dyn PageParser>>,
    status: Option<u16>,
    raw_response: Option<String>,
    processed: Option<ProcessedPage>,
    error: Option<EnvelopeError>,
}

impl RequestEnvelope {
    pub fn new(label: impl Into<String>, pending: PendingOperation) -> Self {
        Self {
            label: label.into(),
            protocol: PROTOCOL_HTTP,
            pending: Some(pending),
            parser: None,
            status: None,
            raw_response: None,
            processed: None,
            error: None,
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn PageParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Run the pending operation and store its outcome. Resolving an
    /// already-resolved envelope is a no-op.
    pub async fn resolve(mut self) -> Self {
        if let Some(pending) = self.pending.take() {
            let result = pending.await;
            self.complete(result);
        }
        self
    }

    fn complete(&mut self, result: TransportResult) {
        match result {
            Err(err) => self.error = Some(err.into()),
            Ok(reply) => {
                self.status = Some(reply.status);
                if let Some(parser) = &self.parser {
                    match parser.parse(&reply.body) {
                        Ok(page) => self.processed = Some(page),
                        Err(err) => self.error = Some(err.into()),
                    }
                }
                self.raw_response = Some(reply.body);
            }
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn protocol(&self) -> &'static str {
        self.protocol
    }

    pub fn is_resolved(&self) -> bool {
        self.pending.is_none()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn raw_response(&self) -> Option<&str> {
        self.raw_response.as_deref()
    }

    pub fn processed(&self) -> Option<&ProcessedPage> {
        self.processed.as_ref()
    }

    pub fn error(&self) -> Option<&EnvelopeError> {
        self.error.as_ref()
    }

    /// Reportable summary. Raw HTML is not kept.
    pub fn into_record(self) -> ResultRecord {
        ResultRecord {
            label: self.label,
            protocol: self.protocol,
            status: self.status,
            data: self
                .processed
                .and_then(|page| serde_json::to_value(page).ok()),
            error: self.error.map(|e| e.to_string()),
        }
    }
}

impl fmt::Debug for RequestEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestEnvelope")
            .field("label", &self.label)
            .field("protocol", &self.protocol)
            .field("resolved", &self.is_resolved())
            .field("status", &self.status)
            .field("processed", &self.processed)
            .field("error", &self.error)
            .finish()
    }
}

/// Entry of a controller's results list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub label: String,
    pub protocol: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultRecord {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{inputs_page_body, FixtureInputsParser};
    use crate::transport::HttpReply;

    fn ready(result: TransportResult) -> PendingOperation {
        Box::pin(std::future::ready(result))
    }

    #[tokio::test]
    async fn test_resolve_with_parser() {
        let body = inputs_page_body(&[("MPP_MAN", 8, "0", "-")]);
        let envelope = RequestEnvelope::new(
            "inputs_page",
            ready(Ok(HttpReply { status: 200, body })),
        )
        .with_parser(Arc::new(FixtureInputsParser))
        .resolve()
        .await;

        assert!(envelope.is_resolved());
        assert!(envelope.error().is_none());
        assert_eq!(envelope.status(), Some(200));
        let inputs = envelope.processed().and_then(ProcessedPage::inputs).expect("inputs");
        assert_eq!(inputs["MPP_MAN"].index, 8);
    }

    #[tokio::test]
    async fn test_resolve_transport_error() {
        let envelope = RequestEnvelope::new("x", ready(Err(TransportError::Timeout)))
            .resolve()
            .await;
        assert_eq!(
            envelope.error(),
            Some(&EnvelopeError::Transport(TransportError::Timeout))
        );
        assert!(envelope.raw_response().is_none());
        let record = envelope.into_record();
        assert_eq!(record.error.as_deref(), Some("connection timed out"));
        assert!(!record.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_parse_error() {
        let envelope = RequestEnvelope::new(
            "inputs_page",
            ready(Ok(HttpReply {
                status: 200,
                body: "garbage".into(),
            })),
        )
        .with_parser(Arc::new(FixtureInputsParser))
        .resolve()
        .await;
        assert!(matches!(envelope.error(), Some(EnvelopeError::Parse(_))));
        assert_eq!(envelope.raw_response(), Some("garbage"));
    }

    #[tokio::test]
    async fn test_record_serialises_inputs_key() {
        let body = inputs_page_body(&[("MPP_PH1", 11, "1", "ВКЛ")]);
        let record = RequestEnvelope::new("inputs_page", ready(Ok(HttpReply { status: 200, body })))
            .with_parser(Arc::new(FixtureInputsParser))
            .resolve()
            .await
            .into_record();
        let data = record.data.expect("data");
        assert_eq!(data["inputs"]["MPP_PH1"]["actuator"], "ВКЛ");
        assert_eq!(data["inputs"]["MPP_PH1"]["state"], "1");
    }
}
