// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod config;
pub mod controller;
pub mod envelope;
pub mod page;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::PeekClientConfig;
pub use controller::{ControllerResponse, PeekController, SetupError, SET_STAGE_LABEL};
pub use envelope::{EnvelopeError, RequestEnvelope, ResultRecord};
pub use page::{PageKind, PeekRoutes};
pub use transport::{HttpReply, HttpTransport, TransportResult};
