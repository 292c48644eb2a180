// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use serde::Serialize;

use crate::actuator::{pretty_print, ActuatorToken};

/// Form field carrying the target input parameter.
pub const PAR_NAME: &str = "par_name";
/// Form field carrying the protocol actuator value.
pub const PAR_VALUE: &str = "par_value";

/// A single set-inputs command, posted as a form body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payload {
    name: String,
    fields: [(&'static str, String); 2],
}

impl Payload {
    /// Display name, e.g. `MPP_PH3=ВКЛ`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Form fields in wire order.
    pub fn fields(&self) -> &[(&'static str, String); 2] {
        &self.fields
    }
}

/// Build the command setting input `index` to `desired`.
///
/// `desired` may be given in either alphabet; the posted value is always
/// the protocol digit.
pub fn build_payload(index: u32, prefix: &str, desired: ActuatorToken, name: &str) -> Payload {
    let value = desired.to_protocol();
    Payload {
        name: pretty_print(name, value),
        fields: [
            (PAR_NAME, format!("{prefix}{index}")),
            (PAR_VALUE, value.as_str().to_string()),
        ],
    }
}
