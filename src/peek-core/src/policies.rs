// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Retry policies for batch dispatch.
//!
//! A faulted batch is re-sent as a whole. Retries are immediate: a stale
//! command is worse than a busy controller.

/// Policy for retrying a faulted batch.
pub trait RetryPolicy: Send + Sync {
    /// Total attempts allowed for one batch, including the first.
    fn max_attempts(&self) -> u32;

    /// Whether another attempt may follow attempt number `attempt` (0-based).
    fn should_retry(&self, attempt: u32) -> bool {
        attempt.saturating_add(1) < self.max_attempts()
    }
}

/// Single attempt, no retry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn max_attempts(&self) -> u32 {
        1
    }
}

/// A fixed number of immediate attempts.
#[derive(Debug, Clone, Copy)]
pub struct FixedAttempts {
    max_attempts: u32,
}

impl FixedAttempts {
    /// `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl RetryPolicy for FixedAttempts {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}
