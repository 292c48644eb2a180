// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Page parser doubles for tests.
//!
//! Fixture pages are plain text: the inputs page has one
//! `index;number;name;state;time;actuator` row per input, the main page has
//! one `key=value` line per field.

use std::sync::Arc;

use peek_core::{
    InputRecord, InputsMap, MainStatus, PageParser, PageParsers, ParseError, ProcessedPage,
};

pub struct FixtureInputsParser;

impl PageParser for FixtureInputsParser {
    fn parse(&self, raw: &str) -> Result<ProcessedPage, ParseError> {
        let mut inputs = InputsMap::new();
        for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let cols: Vec<&str> = line.split(';').collect();
            let [index, number, name, state, time, actuator] = cols.as_slice() else {
                return Err(ParseError::new("inputs page", format!("bad row {line:?}")));
            };
            let bad =
                |what: &str| ParseError::new("inputs page", format!("bad {what} in {line:?}"));
            let record = InputRecord {
                index: index.parse().map_err(|_| bad("index"))?,
                number: number.parse().map_err(|_| bad("number"))?,
                name: name.to_string(),
                state: state.parse().map_err(|_| bad("state"))?,
                state_time: time.to_string(),
                actuator: actuator.parse().map_err(|_| bad("actuator"))?,
            };
            inputs.insert(record.name.clone(), record);
        }
        if inputs.is_empty() {
            return Err(ParseError::new("inputs page", "no inputs"));
        }
        Ok(ProcessedPage::Inputs { inputs })
    }
}

pub struct FixtureMainParser;

impl PageParser for FixtureMainParser {
    fn parse(&self, raw: &str) -> Result<ProcessedPage, ParseError> {
        let mut status = MainStatus::new();
        for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| ParseError::new("main page", format!("bad line {line:?}")))?;
            status.insert(key.to_string(), value.to_string());
        }
        Ok(ProcessedPage::Main(status))
    }
}

pub fn fixture_parsers() -> PageParsers {
    PageParsers::new(Arc::new(FixtureMainParser), Arc::new(FixtureInputsParser))
}

/// Render an inputs page from `(name, index, state, actuator)` rows.
pub fn inputs_page_body(rows: &[(&str, u32, &str, &str)]) -> String {
    rows.iter()
        .map(|(name, index, state, actuator)| {
            format!("{index};{};{name};{state};2345563;{actuator}\n", index + 1)
        })
        .collect()
}
