//! Puzzle identifiers

use crate::error::IdentifierError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// First supported puzzle year
pub const MIN_YEAR: u16 = 2015;
/// Last supported puzzle year
pub const MAX_YEAR: u16 = 2100;

/// Address of exactly one problem: `{source}/{year}/{author}/{set}/{problem}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    pub source: String,
    pub year: u16,
    pub author: String,
    pub set_name: String,
    pub problem_name: String,
}

impl Identifier {
    /// Build a validated identifier
    ///
    /// # Returns
    /// * `Ok(Identifier)` - All names are non-empty and the year is within range
    /// * `Err(IdentifierError)` - The first violated constraint
    pub fn new(
        source: impl Into<String>,
        year: u16,
        author: impl Into<String>,
        set_name: impl Into<String>,
        problem_name: impl Into<String>,
    ) -> Result<Self, IdentifierError> {
        let id = Self {
            source: source.into(),
            year,
            author: author.into(),
            set_name: set_name.into(),
            problem_name: problem_name.into(),
        };
        id.validate()?;
        Ok(id)
    }

    /// Check the year range and that no name component is empty
    pub fn validate(&self) -> Result<(), IdentifierError> {
        if !year_in_range(self.year) {
            return Err(IdentifierError::YearOutOfRange(self.year));
        }
        for (field, value) in [
            ("source", &self.source),
            ("author", &self.author),
            ("setName", &self.set_name),
            ("problemName", &self.problem_name),
        ] {
            if value.trim().is_empty() {
                return Err(IdentifierError::EmptyField(field));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.source, self.year, self.author, self.set_name, self.problem_name
        )
    }
}

#[inline]
pub(crate) fn year_in_range(year: u16) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&year)
}
