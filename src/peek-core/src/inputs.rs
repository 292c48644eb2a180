// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::actuator::{ActuatorMode, ActuatorToken};

/// Logical level of a controller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputState {
    #[serde(rename = "0")]
    Idle,
    #[serde(rename = "1")]
    Active,
}

impl InputState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "0",
            Self::Active => "1",
        }
    }
}

impl FromStr for InputState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Self::Idle),
            "1" => Ok(Self::Active),
            other => Err(format!("unknown input state {other:?}")),
        }
    }
}

impl fmt::Display for InputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last known status of one physical input, as read from the inputs page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Row index, used to address the input in set-inputs commands.
    pub index: u32,
    pub number: u32,
    pub name: String,
    pub state: InputState,
    pub state_time: String,
    pub actuator: ActuatorToken,
}

impl InputRecord {
    pub fn actuator_mode(&self) -> ActuatorMode {
        self.actuator.mode()
    }

    pub fn is_forced_on(&self) -> bool {
        self.actuator_mode() == ActuatorMode::On
    }
}

/// Inputs keyed by name. Rebuilt on every poll.
pub type InputsMap = BTreeMap<String, InputRecord>;
