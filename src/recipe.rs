//! Recipe parsing.
//!
//! A recipe is an ordered list of utterance records, one per non-blank line,
//! each a whitespace-separated run of `key=value` tokens (e.g. the audio
//! file, its lna output name, the transcript path). Downstream tools consume
//! the recipe as a positional stream sliced by batch index ranges, so both
//! field order within a record and record order in the file are preserved
//! exactly.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AlignError, AlignResult};

/// One utterance: ordered `key=value` fields with unique keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Value of `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Fields in their original textual order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// An ordered utterance list loaded from a recipe file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub path: PathBuf,
    records: Vec<Record>,
}

impl Recipe {
    /// Load and parse a recipe file.
    ///
    /// Blank lines are skipped. A token without `=`, an empty key, or a
    /// duplicate key within one record is a fatal format error naming the
    /// offending line and token.
    pub fn load(path: &Path) -> AlignResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(path, &text)
    }

    fn parse(path: &Path, text: &str) -> AlignResult<Self> {
        let mut records = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields: Vec<(String, String)> = Vec::new();
            for token in line.split_whitespace() {
                let malformed = || AlignError::RecipeFormat {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    token: token.to_owned(),
                };
                let (key, value) = token.split_once('=').ok_or_else(malformed)?;
                if key.is_empty() || fields.iter().any(|(k, _)| k == key) {
                    return Err(malformed());
                }
                fields.push((key.to_owned(), value.to_owned()));
            }
            records.push(Record { fields });
        }
        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    /// Records in their original file order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            writeln!(f, "{record}")?;
        }
        Ok(())
    }
}
