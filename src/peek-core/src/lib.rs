// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod actuator;
pub mod batch;
pub mod error;
pub mod inputs;
pub mod parser;
pub mod payload;
pub mod planner;
pub mod policies;
pub mod profile;
pub mod stage;

pub use actuator::{pretty_print, ActuatorError, ActuatorMode, ActuatorToken};
pub use batch::{BatchAttempt, BatchOutcome, PayloadVerdict, OK_ALERT};
pub use error::{ParseError, PlanError, StageError, TransportError};
pub use inputs::{InputRecord, InputState, InputsMap};
pub use parser::{MainStatus, PageParser, PageParsers, ParserKind, ProcessedPage};
pub use payload::{build_payload, Payload};
pub use planner::{Batch, StagePlanner};
pub use policies::{FixedAttempts, NoRetry, RetryPolicy};
pub use profile::{ControllerProfile, Credentials, ProfileError};
pub use stage::Stage;
