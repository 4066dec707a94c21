//! Conversion statistics
//!
//! Counters over information-lossy constructs encountered during a
//! conversion run. Stats are owned by the converter instance and returned to
//! the caller alongside the document, so independent conversions never share
//! mutable state and can run in parallel.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Counters of lossy constructs encountered during conversion.
///
/// `oneOf`/`anyOf` encounters record the branch count of each occurrence so
/// the number of silently discarded branches stays auditable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStats {
    /// Branch counts of every `oneOf` encounter
    pub one_of_encounters: Vec<usize>,
    /// Branch counts of every `anyOf` encounter
    pub any_of_encounters: Vec<usize>,
    /// Number of `not` schemas replaced by the error marker
    pub not_encounters: usize,
    /// Number of reference cycles broken by the recursion terminator
    pub terminated_cyclic_references: usize,
}

impl ConversionStats {
    /// Create a fresh stats object.
    pub fn new() -> Self {
        ConversionStats::default()
    }

    /// Number of `oneOf` occurrences.
    pub fn one_of_count(&self) -> usize {
        self.one_of_encounters.len()
    }

    /// Number of `anyOf` occurrences.
    pub fn any_of_count(&self) -> usize {
        self.any_of_encounters.len()
    }

    /// Sub-schemas inside `oneOf` occurrences that were discarded because
    /// only the first branch is converted.
    pub fn missed_one_of_sub_schemas(&self) -> usize {
        self.one_of_encounters
            .iter()
            .map(|count| count.saturating_sub(1))
            .sum()
    }

    /// Sub-schemas inside `anyOf` occurrences that were discarded because
    /// only the first branch is converted.
    pub fn missed_any_of_sub_schemas(&self) -> usize {
        self.any_of_encounters
            .iter()
            .map(|count| count.saturating_sub(1))
            .sum()
    }

    /// Fold another stats object into this one, for aggregating multiple
    /// document conversions.
    pub fn merge(&mut self, other: ConversionStats) {
        self.one_of_encounters.extend(other.one_of_encounters);
        self.any_of_encounters.extend(other.any_of_encounters);
        self.not_encounters += other.not_encounters;
        self.terminated_cyclic_references += other.terminated_cyclic_references;
    }
}

impl fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "---------------------------- STATS ----------------------------"
        )?;
        writeln!(
            f,
            "- \"not\" encounters:                 {}",
            self.not_encounters
        )?;
        writeln!(
            f,
            "- terminated cyclic references:     {}",
            self.terminated_cyclic_references
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "- \"anyOf\" count:                    {}",
            self.any_of_count()
        )?;
        writeln!(
            f,
            "- \"oneOf\" count:                    {}",
            self.one_of_count()
        )?;
        writeln!(
            f,
            "- total:                            {}",
            self.any_of_count() + self.one_of_count()
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "- missed \"anyOf\" sub-schemas:       {}",
            self.missed_any_of_sub_schemas()
        )?;
        writeln!(
            f,
            "- missed \"oneOf\" sub-schemas:       {}",
            self.missed_one_of_sub_schemas()
        )?;
        writeln!(
            f,
            "- total missed sub-schemas:         {}",
            self.missed_any_of_sub_schemas() + self.missed_one_of_sub_schemas()
        )?;
        write!(
            f,
            "---------------------------------------------------------------"
        )
    }
}
