//! Shared in-memory genealogy model produced by both grammar parsers.
//!
//! Parsers build `GenealogyPerson` and `GenealogyFamily` records keyed by
//! document-local identifiers. Nothing here knows about graph nodes or layout;
//! the converter consumes a finished [`ParseResult`] and never mutates it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::detect::Format;

// =============================================================================
// DATES AND PLACES
// =============================================================================

/// Qualifier attached to a partially-known date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateModifier {
    #[default]
    Exact,
    About,
    Before,
    After,
    /// A range; the end year lives in [`GenealogyDate::end_year`].
    Between,
}

/// A calendar date where any component may be unknown.
///
/// `raw` always holds the source text, even when nothing numeric parsed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenealogyDate {
    pub day: Option<u8>,
    pub month: Option<u8>,
    pub year: Option<i32>,
    pub modifier: DateModifier,
    pub end_year: Option<i32>,
    pub raw: String,
}

impl GenealogyDate {
    /// An unparsed date that only carries its source text.
    #[must_use]
    pub fn raw_only(raw: &str) -> Self {
        Self { raw: raw.to_owned(), ..Self::default() }
    }

    /// True when at least one numeric component was recovered.
    #[must_use]
    pub fn has_components(&self) -> bool {
        self.year.is_some() || self.month.is_some() || self.day.is_some()
    }

    /// Sort key for chronological comparison. Unknown month/day sort first.
    #[must_use]
    pub fn sort_key(&self) -> Option<(i32, u8, u8)> {
        self.year
            .map(|year| (year, self.month.unwrap_or(0), self.day.unwrap_or(0)))
    }
}

/// Signed decimal latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A named place, optionally geocoded.
///
/// Coordinates are stored as a pair so a place is never half-geocoded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenealogyPlace {
    pub name: String,
    pub coordinates: Option<Coordinates>,
}

impl GenealogyPlace {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self { name: name.trim().to_owned(), coordinates: None }
    }

    /// Attach coordinates only when both halves are known.
    #[must_use]
    pub fn with_coordinates(mut self, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        self.coordinates = match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
            _ => None,
        };
        self
    }
}

/// A period of residence: a date (usually a `between` range) and a place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Residence {
    pub date: Option<GenealogyDate>,
    pub place: Option<GenealogyPlace>,
}

// =============================================================================
// PERSONS AND FAMILIES
// =============================================================================

/// Biological sex as recorded in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[default]
    #[serde(rename = "U")]
    Unknown,
}

impl Sex {
    /// Parse the single-letter GEDCOM/GeneWeb code. Anything else is unknown.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "M" | "H" => Self::Male,
            "F" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

/// One individual extracted from a source file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenealogyPerson {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub sex: Sex,
    pub birth_date: Option<GenealogyDate>,
    pub birth_place: Option<GenealogyPlace>,
    pub death_date: Option<GenealogyDate>,
    pub death_place: Option<GenealogyPlace>,
    pub occupation: Option<String>,
    pub nickname: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub residences: Vec<Residence>,
    /// Family this person was born into.
    pub child_of_family: Option<String>,
    /// Families where this person is a husband or wife.
    pub spouse_of_families: Vec<String>,
}

impl GenealogyPerson {
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self { id: id.to_owned(), ..Self::default() }
    }

    /// "First Last", skipping whichever half is empty.
    #[must_use]
    pub fn display_name(&self) -> String {
        [self.first_name.as_str(), self.last_name.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Copy every field of `other` that is still unset on `self`.
    ///
    /// Never overwrites. Residences and spouse families are appended.
    pub fn fill_missing_from(&mut self, other: GenealogyPerson) {
        if self.first_name.is_empty() {
            self.first_name = other.first_name;
        }
        if self.last_name.is_empty() {
            self.last_name = other.last_name;
        }
        if self.sex == Sex::Unknown {
            self.sex = other.sex;
        }
        fill(&mut self.birth_date, other.birth_date);
        fill(&mut self.birth_place, other.birth_place);
        fill(&mut self.death_date, other.death_date);
        fill(&mut self.death_place, other.death_place);
        fill(&mut self.occupation, other.occupation);
        fill(&mut self.nickname, other.nickname);
        fill(&mut self.title, other.title);
        fill(&mut self.notes, other.notes);
        fill(&mut self.child_of_family, other.child_of_family);
        self.residences.extend(other.residences);
        for family in other.spouse_of_families {
            if !self.spouse_of_families.contains(&family) {
                self.spouse_of_families.push(family);
            }
        }
    }
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

/// One conjugal unit: up to two parents and any number of children.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenealogyFamily {
    pub id: String,
    pub husband_id: Option<String>,
    pub wife_id: Option<String>,
    pub children_ids: Vec<String>,
    pub marriage_date: Option<GenealogyDate>,
    pub marriage_place: Option<GenealogyPlace>,
    pub divorce_date: Option<GenealogyDate>,
    pub notes: Option<String>,
}

impl GenealogyFamily {
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self { id: id.to_owned(), ..Self::default() }
    }
}

// =============================================================================
// PARSE RESULT
// =============================================================================

/// File-level header information, filled best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileMetadata {
    pub format: Option<Format>,
    pub version: Option<String>,
    pub source: Option<String>,
    pub language: Option<String>,
    pub encoding: Option<String>,
}

/// Everything one parser call produced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParseResult {
    pub persons: Vec<GenealogyPerson>,
    pub families: Vec<GenealogyFamily>,
    pub metadata: FileMetadata,
    pub warnings: Vec<String>,
}

impl ParseResult {
    /// Drop family references to persons that do not exist in this result.
    ///
    /// Each removed reference is recorded as a warning.
    pub fn enforce_references(&mut self) {
        let known: HashSet<&str> = self.persons.iter().map(|p| p.id.as_str()).collect();
        let mut warnings = Vec::new();

        for family in &mut self.families {
            for (role, slot) in [("husband", &mut family.husband_id), ("wife", &mut family.wife_id)] {
                if let Some(id) = slot.as_deref() {
                    if !known.contains(id) {
                        warnings.push(format!("family {}: {role} {id} not found", family.id));
                        *slot = None;
                    }
                }
            }
            family.children_ids.retain(|id| {
                let found = known.contains(id.as_str());
                if !found {
                    warnings.push(format!("family {}: child {id} not found", family.id));
                }
                found
            });
        }

        self.warnings.extend(warnings);
    }

    /// True when any place in the result carries coordinates.
    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        let person_places = self.persons.iter().flat_map(|p| {
            [p.birth_place.as_ref(), p.death_place.as_ref()]
                .into_iter()
                .chain(p.residences.iter().map(|r| r.place.as_ref()))
        });
        let family_places = self.families.iter().map(|f| f.marriage_place.as_ref());
        person_places
            .chain(family_places)
            .flatten()
            .any(|place| place.coordinates.is_some())
    }

    /// Earliest and latest year across all birth and death dates.
    #[must_use]
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let years = self
            .persons
            .iter()
            .flat_map(|p| [p.birth_date.as_ref(), p.death_date.as_ref()])
            .flatten()
            .filter_map(|d| d.year);
        years.fold(None, |range, year| match range {
            None => Some((year, year)),
            Some((lo, hi)) => Some((lo.min(year), hi.max(year))),
        })
    }
}

// =============================================================================
// EXTRACTION OUTCOME
// =============================================================================

/// Outcome of extracting one optional field from a source record.
///
/// Keeps "tag absent" apart from "tag present but unusable" so the latter can
/// become a warning.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<T> {
    Found(T),
    Absent,
    Malformed(String),
}

impl<T> Extraction<T> {
    /// Collapse to an `Option`, pushing a warning for malformed input.
    pub fn into_option(self, context: &str, warnings: &mut Vec<String>) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Absent => None,
            Self::Malformed(reason) => {
                warnings.push(format!("{context}: {reason}"));
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
