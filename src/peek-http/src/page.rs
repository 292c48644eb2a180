// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use serde::{Deserialize, Serialize};

use peek_core::ParserKind;

pub const MAIN_PAGE_ROUTE: &str = "/hvi?file=m001a.hvi&pos1=0&pos2=-1";
pub const INPUTS_PAGE_ROUTE: &str = "/hvi?file=cell1020.hvi&pos1=0&pos2=-1";
pub const SET_INPUTS_ROUTE: &str = "/hvi?file=data.hvi&page=cell1020.hvi";

/// Readable pages of the controller web UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    MainPage,
    InputsPage,
}

impl PageKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::MainPage => "main_page",
            Self::InputsPage => "inputs_page",
        }
    }

    pub fn parser_kind(self) -> ParserKind {
        match self {
            Self::MainPage => ParserKind::MainPage,
            Self::InputsPage => ParserKind::InputsPage,
        }
    }
}

/// Routes of the controller web UI, relative to the device base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeekRoutes {
    pub main_page: String,
    pub inputs_page: String,
    pub set_inputs: String,
}

impl Default for PeekRoutes {
    fn default() -> Self {
        Self {
            main_page: MAIN_PAGE_ROUTE.to_string(),
            inputs_page: INPUTS_PAGE_ROUTE.to_string(),
            set_inputs: SET_INPUTS_ROUTE.to_string(),
        }
    }
}

impl PeekRoutes {
    pub fn page(&self, kind: PageKind) -> &str {
        match kind {
            PageKind::MainPage => &self.main_page,
            PageKind::InputsPage => &self.inputs_page,
        }
    }
}
