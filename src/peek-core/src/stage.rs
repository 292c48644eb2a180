// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::fmt;

use serde::Serialize;

use crate::error::StageError;

pub const MIN_STAGE: u8 = 0;
pub const MAX_STAGE: u8 = 8;

/// Requested signal phase. Stage 0 releases manual override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Stage(u8);

impl Stage {
    pub const RESET: Stage = Stage(0);

    pub fn new(stage: i64) -> Result<Self, StageError> {
        match u8::try_from(stage) {
            Ok(value) if (MIN_STAGE..=MAX_STAGE).contains(&value) => Ok(Self(value)),
            _ => Err(StageError::OutOfRange {
                stage,
                min: MIN_STAGE,
                max: MAX_STAGE,
            }),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_reset(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
