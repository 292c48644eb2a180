// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Actuator tokens as shown on the inputs page and as sent on the wire.
//!
//! The controller UI renders an actuator with one of three labels, while
//! the set-inputs form expects one of three digits. Both alphabets describe
//! the same three modes, so every token has exactly one counterpart.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label shown for an actuator that leaves the input to the program.
pub const FLASHING_LABEL: &str = "-";
/// Label shown for an actuator forced off.
pub const OFF_LABEL: &str = "ВЫКЛ";
/// Label shown for an actuator forced on.
pub const ON_LABEL: &str = "ВКЛ";

pub const FLASHING_VALUE: &str = "0";
pub const OFF_VALUE: &str = "1";
pub const ON_VALUE: &str = "2";

/// Marker used by [`pretty_print`] for flashing actuators.
pub const FLASHING_MARKER: &str = "ВФ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown actuator token {0:?}")]
pub struct ActuatorError(pub String);

/// What an actuator does with its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorMode {
    Flashing,
    Off,
    On,
}

/// One of the six literal actuator tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActuatorToken {
    /// Display label, as parsed from the inputs page.
    Label(ActuatorMode),
    /// Protocol value, as posted in `par_value`.
    Value(ActuatorMode),
}

impl ActuatorToken {
    pub const ALL: [ActuatorToken; 6] = [
        Self::Label(ActuatorMode::Flashing),
        Self::Label(ActuatorMode::Off),
        Self::Label(ActuatorMode::On),
        Self::Value(ActuatorMode::Flashing),
        Self::Value(ActuatorMode::Off),
        Self::Value(ActuatorMode::On),
    ];

    pub fn mode(self) -> ActuatorMode {
        match self {
            Self::Label(mode) | Self::Value(mode) => mode,
        }
    }

    /// Protocol form. Idempotent for protocol values.
    pub fn to_protocol(self) -> Self {
        Self::Value(self.mode())
    }

    /// Display form. Idempotent for labels.
    pub fn to_label(self) -> Self {
        Self::Label(self.mode())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Label(ActuatorMode::Flashing) => FLASHING_LABEL,
            Self::Label(ActuatorMode::Off) => OFF_LABEL,
            Self::Label(ActuatorMode::On) => ON_LABEL,
            Self::Value(ActuatorMode::Flashing) => FLASHING_VALUE,
            Self::Value(ActuatorMode::Off) => OFF_VALUE,
            Self::Value(ActuatorMode::On) => ON_VALUE,
        }
    }
}

impl FromStr for ActuatorToken {
    type Err = ActuatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|token| token.as_str() == s)
            .ok_or_else(|| ActuatorError(s.to_string()))
    }
}

impl TryFrom<String> for ActuatorToken {
    type Error = ActuatorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ActuatorToken> for String {
    fn from(value: ActuatorToken) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ActuatorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render `<name>=<value>` for logs and fault lists.
///
/// Flashing tokens of either alphabet render as [`FLASHING_MARKER`];
/// everything else renders as its display label.
pub fn pretty_print(name: &str, token: ActuatorToken) -> String {
    let value = match token.mode() {
        ActuatorMode::Flashing => FLASHING_MARKER,
        _ => token.to_label().as_str(),
    };
    format!("{name}={value}")
}
