// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Bookkeeping for one dispatch attempt of a batch.
//!
//! Each payload starts pending and moves exactly once to either succeeded
//! or faulted. The attempt is finished into a [`BatchOutcome`] only after
//! nothing is pending.

use crate::error::TransportError;

/// Substring of the device response that signals an accepted command.
pub const OK_ALERT: &str = "alert_msg = \"\";";

const ALERT_PREFIX: &str = "alert_msg = \"";

/// Judgement of a single POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadVerdict {
    Accepted,
    /// Device answered but raised an alert (or no alert marker at all).
    Refused(Option<String>),
    Failed(TransportError),
}

impl PayloadVerdict {
    /// Judge a POST reply. Only a successful exchange whose body carries the
    /// empty-alert marker is accepted.
    pub fn from_reply(reply: Result<&str, &TransportError>) -> Self {
        match reply {
            Ok(body) if body.contains(OK_ALERT) => Self::Accepted,
            Ok(body) => Self::Refused(alert_message(body)),
            Err(err) => Self::Failed(err.clone()),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Extract the text of a non-empty `alert_msg = "...";` assignment.
pub fn alert_message(body: &str) -> Option<String> {
    let start = body.find(ALERT_PREFIX)? + ALERT_PREFIX.len();
    let rest = &body[start..];
    let end = rest.find('"')?;
    let msg = &rest[..end];
    if msg.is_empty() {
        None
    } else {
        Some(msg.to_string())
    }
}

/// Result of a finished attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every payload was accepted.
    Committed { succeeded: Vec<String> },
    /// At least one payload faulted.
    Faulted {
        succeeded: Vec<String>,
        faulted: Vec<String>,
    },
}

impl BatchOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// In-flight state of one attempt.
#[derive(Debug, Clone, Default)]
pub struct BatchAttempt {
    pending: Vec<String>,
    succeeded: Vec<String>,
    faulted: Vec<String>,
}

impl BatchAttempt {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pending: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Settle a pending payload. Returns `false` if `name` was not pending.
    pub fn settle(&mut self, name: &str, verdict: &PayloadVerdict) -> bool {
        let Some(pos) = self.pending.iter().position(|n| n == name) else {
            return false;
        };
        let name = self.pending.swap_remove(pos);
        if verdict.is_accepted() {
            self.succeeded.push(name);
        } else {
            self.faulted.push(name);
        }
        true
    }

    /// Close the attempt. Anything still pending counts as faulted.
    pub fn finish(self) -> BatchOutcome {
        let Self {
            pending,
            succeeded,
            mut faulted,
        } = self;
        faulted.extend(pending);
        if faulted.is_empty() {
            BatchOutcome::Committed { succeeded }
        } else {
            BatchOutcome::Faulted { succeeded, faulted }
        }
    }
}
