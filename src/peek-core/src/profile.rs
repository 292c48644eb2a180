// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Immutable description of a controller's input layout.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::stage::MAX_STAGE;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("manual override input {0:?} is not in the input set")]
    ManualNotInInputs(String),
    #[error("stage input {0:?} is not in the input set")]
    StageNotInInputs(String),
    #[error("stage input {0:?} does not end with a phase number")]
    MissingPhaseNumber(String),
    #[error("stage input {name:?} has phase {phase}, expected 1..={max}")]
    PhaseOutOfRange { name: String, phase: u8, max: u8 },
    #[error("stage inputs {0:?} and {1:?} share a phase number")]
    DuplicatePhase(String, String),
}

/// Static cookie pair accepted by the device web UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub name: String,
    pub value: String,
}

impl Credentials {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// `Cookie` header value, or `None` when no credentials are configured.
    pub fn cookie_header(&self) -> Option<String> {
        if self.name.is_empty() {
            None
        } else {
            Some(format!("{}={}", self.name, self.value))
        }
    }
}

/// Input names, prefixes and credentials for one controller type.
///
/// Built once from configuration and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerProfile {
    all_inputs: BTreeSet<String>,
    stage_inputs: BTreeMap<String, u8>,
    manual_input: String,
    phase_prefix: String,
    field_prefix: String,
    credentials: Credentials,
}

impl ControllerProfile {
    /// Build a profile, deriving each stage input's phase number from the
    /// trailing digits of its name.
    pub fn new<I, S>(
        all_inputs: I,
        stage_inputs: &[S],
        manual_input: impl Into<String>,
        phase_prefix: impl Into<String>,
        field_prefix: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self, ProfileError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
        S: AsRef<str>,
    {
        let all_inputs: BTreeSet<String> = all_inputs.into_iter().map(Into::into).collect();
        let manual_input = manual_input.into();
        if !all_inputs.contains(&manual_input) {
            return Err(ProfileError::ManualNotInInputs(manual_input));
        }

        let mut by_phase: BTreeMap<u8, String> = BTreeMap::new();
        let mut stages = BTreeMap::new();
        for name in stage_inputs {
            let name = name.as_ref();
            if !all_inputs.contains(name) {
                return Err(ProfileError::StageNotInInputs(name.to_string()));
            }
            let phase = phase_number(name)?;
            if let Some(other) = by_phase.insert(phase, name.to_string()) {
                return Err(ProfileError::DuplicatePhase(other, name.to_string()));
            }
            stages.insert(name.to_string(), phase);
        }

        Ok(Self {
            all_inputs,
            stage_inputs: stages,
            manual_input,
            phase_prefix: phase_prefix.into(),
            field_prefix: field_prefix.into(),
            credentials,
        })
    }

    pub fn all_inputs(&self) -> &BTreeSet<String> {
        &self.all_inputs
    }

    /// Stage input name to phase number, in name order.
    pub fn stage_inputs(&self) -> &BTreeMap<String, u8> {
        &self.stage_inputs
    }

    pub fn manual_input(&self) -> &str {
        &self.manual_input
    }

    pub fn phase_prefix(&self) -> &str {
        &self.phase_prefix
    }

    pub fn field_prefix(&self) -> &str {
        &self.field_prefix
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Name of the input that selects phase `phase`.
    pub fn phase_input(&self, phase: u8) -> String {
        format!("{}{}", self.phase_prefix, phase)
    }
}

fn phase_number(name: &str) -> Result<u8, ProfileError> {
    let digits_at = name
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)
        .ok_or_else(|| ProfileError::MissingPhaseNumber(name.to_string()))?;
    let phase: u8 = name[digits_at..]
        .parse()
        .map_err(|_| ProfileError::MissingPhaseNumber(name.to_string()))?;
    if phase == 0 || phase > MAX_STAGE {
        return Err(ProfileError::PhaseOutOfRange {
            name: name.to_string(),
            phase,
            max: MAX_STAGE,
        });
    }
    Ok(phase)
}
