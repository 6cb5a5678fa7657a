// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! String-keyed structured data tree
//!
//! A [`Section`] is the unit entities serialise themselves into. It holds
//! scalars, arrays and nested tables under string keys, and supports
//! dotted-path access (`"owner.name"`) for nested values.

use thiserror::Error;
pub use toml::{Table, Value};

/// Errors from path-based mutation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionError {
    #[error("empty path")]
    EmptyPath,
    #[error("path segment {segment:?} of {path:?} is not a table")]
    NotATable { path: String, segment: String },
}

/// A mutable tree of string-keyed values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    table: Table,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(table: Table) -> Self {
        Self { table }
    }

    pub fn as_table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.table.get(key)
    }

    /// Insert a value, returning the one it replaced
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.table.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.table.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    /// All top-level keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.table.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_integer)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// A copy of the nested table under `key`
    pub fn child(&self, key: &str) -> Option<Section> {
        self.get(key)
            .and_then(Value::as_table)
            .map(|t| Section::from_table(t.clone()))
    }

    pub fn set_child(&mut self, key: impl Into<String>, child: Section) -> Option<Value> {
        self.set(key, Value::Table(child.table))
    }

    /// Look up a value by dotted path
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.table.get(first)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }

    /// Set a value by dotted path, creating intermediate tables as needed
    pub fn set_path(
        &mut self,
        path: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, SectionError> {
        let (parents, leaf) = split_path(path)?;
        let mut table = &mut self.table;
        for segment in parents {
            let entry = table
                .entry(segment.to_string())
                .or_insert_with(|| Value::Table(Table::new()));
            table = match entry {
                Value::Table(t) => t,
                _ => {
                    return Err(SectionError::NotATable {
                        path: path.to_string(),
                        segment: segment.to_string(),
                    })
                }
            };
        }
        Ok(table.insert(leaf.to_string(), value.into()))
    }

    /// Remove a value by dotted path; missing paths are not an error
    pub fn remove_path(&mut self, path: &str) -> Option<Value> {
        let (parents, leaf) = split_path(path).ok()?;
        let mut table = &mut self.table;
        for segment in parents {
            table = table.get_mut(segment)?.as_table_mut()?;
        }
        table.remove(leaf)
    }
}

fn split_path(path: &str) -> Result<(Vec<&str>, &str), SectionError> {
    let mut segments: Vec<&str> = path.split('.').collect();
    match segments.pop() {
        Some(leaf) if !leaf.is_empty() => Ok((segments, leaf)),
        _ => Err(SectionError::EmptyPath),
    }
}

impl From<Table> for Section {
    fn from(table: Table) -> Self {
        Self::from_table(table)
    }
}

impl From<Section> for Value {
    fn from(section: Section) -> Self {
        Value::Table(section.table)
    }
}

#[cfg(test)]
#[path = "section_tests.rs"]
mod tests;
