// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use thiserror::Error;

/// Failure of a single HTTP exchange with the device.
///
/// Produced by the transport and carried as data; never propagated as a
/// panic or early return past the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection timed out")]
    Timeout,
    /// Non-200 status or TLS mismatch: the host does not speak this protocol.
    #[error("bad controller type")]
    BadControllerType,
    #[error("controller unreachable: {0}")]
    Unreachable(String),
}

/// Failure reported by a page parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse {page}: {reason}")]
pub struct ParseError {
    pub page: &'static str,
    pub reason: String,
}

impl ParseError {
    pub fn new(page: &'static str, reason: impl Into<String>) -> Self {
        Self {
            page,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("input {0:?} is missing from the inputs page")]
    MissingInput(String),
}

/// Why a `set_stage` call did not confirm the requested stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("stage {stage} is out of range, expected {min}..={max}")]
    OutOfRange { stage: i64, min: u8, max: u8 },
    #[error("inputs page unavailable: {0}")]
    InputsUnavailable(String),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("failed to set inputs: {}", faults.join(", "))]
    Rejected { faults: Vec<String> },
}
