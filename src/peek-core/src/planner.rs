// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Stage transition planning.
//!
//! Turns a freshly polled inputs map and a requested stage into ordered
//! batches of set-inputs commands. Every command in a batch may be sent
//! concurrently, but a batch must be fully resolved before the next one is
//! dispatched: the first batch settles the phase inputs, and only then is
//! manual override engaged (or, for a reset, override is released before
//! the phase inputs are touched).

use tracing::debug;

use crate::actuator::{ActuatorMode, ActuatorToken};
use crate::error::PlanError;
use crate::inputs::{InputRecord, InputState, InputsMap};
use crate::payload::{build_payload, Payload};
use crate::profile::ControllerProfile;
use crate::stage::Stage;

/// Commands dispatched together and jointly awaited.
pub type Batch = Vec<Payload>;

/// Plans batches against a fixed controller profile.
#[derive(Debug, Clone, Copy)]
pub struct StagePlanner<'a> {
    profile: &'a ControllerProfile,
}

impl<'a> StagePlanner<'a> {
    pub fn new(profile: &'a ControllerProfile) -> Self {
        Self { profile }
    }

    /// Plan the transition to `stage`. Always returns two batches, either of
    /// which may be empty when the device is already in the wanted state.
    pub fn plan(&self, inputs: &InputsMap, stage: Stage) -> Result<Vec<Batch>, PlanError> {
        let batches = if stage.is_reset() {
            self.plan_reset(inputs)?
        } else {
            self.plan_stage(inputs, stage)?
        };
        debug!(
            "Planned stage {}: {:?}",
            stage,
            batches
                .iter()
                .map(|b| b.iter().map(Payload::name).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        );
        Ok(batches)
    }

    fn plan_reset(&self, inputs: &InputsMap) -> Result<Vec<Batch>, PlanError> {
        let manual = lookup(inputs, self.profile.manual_input())?;
        let release_manual: Batch = reset_command(manual)
            .map(|mode| self.command(manual, mode))
            .into_iter()
            .collect();

        let mut release_phases = Batch::new();
        for name in self.profile.stage_inputs().keys() {
            let record = lookup(inputs, name)?;
            if let Some(mode) = reset_command(record) {
                release_phases.push(self.command(record, mode));
            }
        }

        Ok(vec![release_manual, release_phases])
    }

    fn plan_stage(&self, inputs: &InputsMap, stage: Stage) -> Result<Vec<Batch>, PlanError> {
        let target_name = self.profile.phase_input(stage.get());
        let target = lookup(inputs, &target_name)?;

        let mut phases = Batch::new();
        if !target.is_forced_on() {
            phases.push(self.command(target, ActuatorMode::On));
        }
        for name in self.profile.stage_inputs().keys() {
            if *name == target_name {
                continue;
            }
            let record = lookup(inputs, name)?;
            if record.state != InputState::Idle || record.is_forced_on() {
                phases.push(self.command(record, ActuatorMode::Off));
            }
        }

        let manual = lookup(inputs, self.profile.manual_input())?;
        let engage_manual: Batch = if manual.is_forced_on() {
            Batch::new()
        } else {
            vec![self.command(manual, ActuatorMode::On)]
        };

        Ok(vec![phases, engage_manual])
    }

    fn command(&self, record: &InputRecord, mode: ActuatorMode) -> Payload {
        build_payload(
            record.index,
            self.profile.field_prefix(),
            ActuatorToken::Value(mode),
            &record.name,
        )
    }
}

/// Release policy applied to each input when resetting manual override.
///
/// An active flashing input is switched off, an active forced-on input or
/// an idle forced-off input is returned to flashing. Anything else is left
/// alone.
fn reset_command(record: &InputRecord) -> Option<ActuatorMode> {
    match (record.state, record.actuator_mode()) {
        (InputState::Active, ActuatorMode::Flashing) => Some(ActuatorMode::Off),
        (InputState::Active, ActuatorMode::On) => Some(ActuatorMode::Flashing),
        (InputState::Idle, ActuatorMode::Off) => Some(ActuatorMode::Flashing),
        _ => None,
    }
}

fn lookup<'m>(inputs: &'m InputsMap, name: &str) -> Result<&'m InputRecord, PlanError> {
    inputs
        .get(name)
        .ok_or_else(|| PlanError::MissingInput(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::ActuatorToken::Label;
    use crate::profile::Credentials;

    const STAGES: [&str; 8] = [
        "MPP_PH1", "MPP_PH2", "MPP_PH3", "MPP_PH4", "MPP_PH5", "MPP_PH6", "MPP_PH7", "MPP_PH8",
    ];

    fn profile() -> ControllerProfile {
        let mut all: Vec<&str> = STAGES.to_vec();
        all.extend(["MPP_MAN", "MPP_FL", "MPP_OFF"]);
        ControllerProfile::new(all, &STAGES, "MPP_MAN", "MPP_PH", "SIGNAL_", Credentials::default())
            .expect("profile")
    }

    fn idle_inputs() -> InputsMap {
        let mut names: Vec<&str> = vec!["MPP_MAN", "MPP_FL", "MPP_OFF"];
        names.extend(STAGES);
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                (
                    name.to_string(),
                    InputRecord {
                        index: i as u32,
                        number: i as u32 + 1,
                        name: name.to_string(),
                        state: InputState::Idle,
                        state_time: "2345563".to_string(),
                        actuator: Label(ActuatorMode::Flashing),
                    },
                )
            })
            .collect()
    }

    fn set(inputs: &mut InputsMap, name: &str, state: InputState, mode: ActuatorMode) {
        let record = inputs.get_mut(name).expect("input");
        record.state = state;
        record.actuator = Label(mode);
    }

    fn names(batch: &Batch) -> Vec<&str> {
        batch.iter().map(Payload::name).collect()
    }

    #[test]
    fn test_reset_active_flashing_manual_switches_off() {
        let profile = profile();
        let mut inputs = idle_inputs();
        set(&mut inputs, "MPP_MAN", InputState::Active, ActuatorMode::Flashing);

        let batches = StagePlanner::new(&profile).plan(&inputs, Stage::RESET).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[0][0].name(), "MPP_MAN=ВЫКЛ");
        assert_eq!(batches[0][0].fields()[1].1, "1");
        assert!(batches[1].is_empty());
    }

    #[test]
    fn test_reset_policy_cases() {
        let profile = profile();
        let mut inputs = idle_inputs();
        set(&mut inputs, "MPP_MAN", InputState::Active, ActuatorMode::On);
        set(&mut inputs, "MPP_PH2", InputState::Active, ActuatorMode::On);
        set(&mut inputs, "MPP_PH3", InputState::Idle, ActuatorMode::Off);
        set(&mut inputs, "MPP_PH4", InputState::Active, ActuatorMode::Off);
        set(&mut inputs, "MPP_PH5", InputState::Idle, ActuatorMode::On);

        let batches = StagePlanner::new(&profile).plan(&inputs, Stage::RESET).unwrap();
        assert_eq!(names(&batches[0]), vec!["MPP_MAN=ВФ"]);
        assert_eq!(names(&batches[1]), vec!["MPP_PH2=ВФ", "MPP_PH3=ВФ"]);
    }

    #[test]
    fn test_reset_nothing_to_do() {
        let profile = profile();
        let batches = StagePlanner::new(&profile)
            .plan(&idle_inputs(), Stage::RESET)
            .unwrap();
        assert!(batches.iter().all(Vec::is_empty));
    }

    #[test]
    fn test_stage_turns_target_on_and_engages_manual() {
        let profile = profile();
        let inputs = idle_inputs();
        let batches = StagePlanner::new(&profile)
            .plan(&inputs, Stage::new(3).unwrap())
            .unwrap();
        assert_eq!(names(&batches[0]), vec!["MPP_PH3=ВКЛ"]);
        assert_eq!(names(&batches[1]), vec!["MPP_MAN=ВКЛ"]);
        let index = inputs["MPP_PH3"].index;
        assert_eq!(batches[0][0].fields()[0].1, format!("SIGNAL_{index}"));
    }

    #[test]
    fn test_stage_target_already_on_still_clears_competitors() {
        let profile = profile();
        let mut inputs = idle_inputs();
        set(&mut inputs, "MPP_PH2", InputState::Active, ActuatorMode::On);
        set(&mut inputs, "MPP_PH1", InputState::Active, ActuatorMode::Flashing);
        set(&mut inputs, "MPP_PH6", InputState::Idle, ActuatorMode::On);
        set(&mut inputs, "MPP_PH7", InputState::Idle, ActuatorMode::Off);

        let batches = StagePlanner::new(&profile)
            .plan(&inputs, Stage::new(2).unwrap())
            .unwrap();
        assert_eq!(names(&batches[0]), vec!["MPP_PH1=ВЫКЛ", "MPP_PH6=ВЫКЛ"]);
        assert!(batches[0].iter().all(|p| p.fields()[1].1 == "1"));
        assert_eq!(names(&batches[1]), vec!["MPP_MAN=ВКЛ"]);
    }

    #[test]
    fn test_stage_manual_already_on() {
        let profile = profile();
        let mut inputs = idle_inputs();
        set(&mut inputs, "MPP_MAN", InputState::Active, ActuatorMode::On);
        set(&mut inputs, "MPP_PH8", InputState::Active, ActuatorMode::On);

        let batches = StagePlanner::new(&profile)
            .plan(&inputs, Stage::new(8).unwrap())
            .unwrap();
        assert!(batches[0].is_empty());
        assert!(batches[1].is_empty());
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let profile = profile();
        let mut inputs = idle_inputs();
        inputs.remove("MPP_PH4");
        let err = StagePlanner::new(&profile)
            .plan(&inputs, Stage::new(4).unwrap())
            .unwrap_err();
        assert_eq!(err, PlanError::MissingInput("MPP_PH4".into()));
    }
}
