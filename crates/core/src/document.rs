// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text form of a [`Section`] tree
//!
//! Documents are TOML. A fixed comment header is written above the data
//! and ignored on parse.

use crate::section::{Section, Table};
use thiserror::Error;

/// Errors converting between a document and its text blob
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("render error: {0}")]
    Render(#[from] toml::ser::Error),
}

/// A root section plus the header comment rendered above it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    header: Vec<String>,
    root: Section,
}

impl Document {
    pub fn new(header: &str, root: Section) -> Self {
        Self {
            header: header.lines().map(str::to_string).collect(),
            root,
        }
    }

    /// Parse a text blob into its root section
    pub fn parse(text: &str) -> Result<Section, DocumentError> {
        let table: Table = toml::from_str(text)?;
        Ok(Section::from_table(table))
    }

    pub fn root(&self) -> &Section {
        &self.root
    }

    pub fn into_root(self) -> Section {
        self.root
    }

    /// Render the header comment followed by the data
    pub fn render(&self) -> Result<String, DocumentError> {
        let body = toml::to_string(self.root.as_table())?;
        let mut out = String::with_capacity(body.len() + 64 * self.header.len());
        for line in &self.header {
            if line.is_empty() {
                out.push_str("#\n");
            } else {
                out.push_str("# ");
                out.push_str(line);
                out.push('\n');
            }
        }
        if !self.header.is_empty() {
            out.push('\n');
        }
        out.push_str(&body);
        Ok(out)
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
