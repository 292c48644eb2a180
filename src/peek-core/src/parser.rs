// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Contracts for the page parsers that turn device HTML into records.
//!
//! Parsers are supplied by the embedding application; this crate only
//! relies on the shape of their output.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::ParseError;
use crate::inputs::InputsMap;

/// Which parser a page needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    MainPage,
    InputsPage,
}

/// Summary fields of the main status page.
pub type MainStatus = BTreeMap<String, String>;

/// Normalised output of a page parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProcessedPage {
    Main(MainStatus),
    Inputs { inputs: InputsMap },
}

impl ProcessedPage {
    pub fn inputs(&self) -> Option<&InputsMap> {
        match self {
            Self::Inputs { inputs } => Some(inputs),
            Self::Main(_) => None,
        }
    }
}

/// Parses raw page text into its normalised form.
pub trait PageParser: Send + Sync {
    fn parse(&self, raw: &str) -> Result<ProcessedPage, ParseError>;
}

/// The parser set a controller is built with.
#[derive(Clone)]
pub struct PageParsers {
    pub main: Arc<dyn PageParser>,
    pub inputs: Arc<dyn PageParser>,
}

impl PageParsers {
    pub fn new(main: Arc<dyn PageParser>, inputs: Arc<dyn PageParser>) -> Self {
        Self { main, inputs }
    }

    pub fn for_kind(&self, kind: ParserKind) -> Arc<dyn PageParser> {
        match kind {
            ParserKind::MainPage => Arc::clone(&self.main),
            ParserKind::InputsPage => Arc::clone(&self.inputs),
        }
    }
}

impl std::fmt::Debug for PageParsers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageParsers").finish_non_exhaustive()
    }
}
