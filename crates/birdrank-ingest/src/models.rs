//! Domain types for hotspot ranking and regional species lists
//!
//! All entities are values: enrichment builds a new value instead of mutating one in
//! place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use birdrank_common::BirdrankError;

/// Checklist baseline that target frequencies are computed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Observer's lifetime list
    #[default]
    Life,
    /// Observer's current-year list
    Year,
}

impl Period {
    /// Query-string code used by the targets page
    pub fn code(self) -> &'static str {
        match self {
            Period::Life => "life",
            Period::Year => "year",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Period {
    type Err = BirdrankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "life" => Ok(Period::Life),
            "year" => Ok(Period::Year),
            _ => Err(BirdrankError::config(format!(
                "Invalid period '{}', expected 'life' or 'year'",
                s
            ))),
        }
    }
}

/// Evidence filter for target-species queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    None,
    Photo,
    Audio,
}

impl MediaType {
    /// Query-string code used by the targets page
    pub fn code(self) -> &'static str {
        match self {
            MediaType::None => "",
            MediaType::Photo => "P",
            MediaType::Audio => "A",
        }
    }

    /// Query variants for a run: the unfiltered query, then the media-filtered one
    pub fn variants(self) -> Vec<MediaType> {
        match self {
            MediaType::None => vec![MediaType::None],
            media => vec![MediaType::None, media],
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::None => f.write_str("none"),
            MediaType::Photo => f.write_str("photo"),
            MediaType::Audio => f.write_str("audio"),
        }
    }
}

impl FromStr for MediaType {
    type Err = BirdrankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "" => Ok(MediaType::None),
            "photo" | "p" => Ok(MediaType::Photo),
            "audio" | "a" => Ok(MediaType::Audio),
            _ => Err(BirdrankError::config(format!(
                "Invalid media type '{}', expected 'none', 'photo' or 'audio'",
                s
            ))),
        }
    }
}

/// A species predicted at a location with some frequency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSpecies {
    pub name: String,

    /// Share of checklists in the window that record the species, in [0, 1]
    pub frequency: f64,
}

impl TargetSpecies {
    pub fn new(name: impl Into<String>, frequency: f64) -> Self {
        Self {
            name: name.into(),
            frequency,
        }
    }
}

/// A birding location and the target species found for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub id: String,
    pub name: String,

    /// Checklists behind the last accepted query variant
    pub checklists: u32,

    /// Ordered by descending frequency
    pub target_species: Vec<TargetSpecies>,
}

impl Hotspot {
    /// Raw hotspot as listed for a region, not yet enriched
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            checklists: 0,
            target_species: Vec::new(),
        }
    }

    /// Replace checklists and target species in one step
    pub fn with_targets(self, checklists: u32, target_species: Vec<TargetSpecies>) -> Self {
        Self {
            checklists,
            target_species,
            ..self
        }
    }

    /// Sum of target species frequencies
    pub fn score(&self) -> f64 {
        self.target_species.iter().map(|t| t.frequency).sum()
    }

    pub fn is_scored(&self) -> bool {
        self.score() > 0.0
    }
}

/// Taxonomy of a species; all fields absent means not fetched or failed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    #[serde(rename = "comName")]
    pub common_name: Option<String>,
    #[serde(rename = "sciName")]
    pub scientific_name: Option<String>,
    #[serde(rename = "familyComName")]
    pub family_common_name: Option<String>,
    #[serde(rename = "familySciName")]
    pub family_scientific_name: Option<String>,
    pub order: Option<String>,
}

impl Taxonomy {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// IUCN Red List category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConservationStatus {
    /// Least Concern
    LC,
    /// Near Threatened
    NT,
    /// Vulnerable
    VU,
    /// Endangered
    EN,
    /// Critically Endangered
    CR,
}

impl fmt::Display for ConservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            ConservationStatus::LC => "LC",
            ConservationStatus::NT => "NT",
            ConservationStatus::VU => "VU",
            ConservationStatus::EN => "EN",
            ConservationStatus::CR => "CR",
        };
        f.write_str(code)
    }
}

impl FromStr for ConservationStatus {
    type Err = BirdrankError;

    /// Accepts both `VU` and the `IUCN_VU` form used by the status API
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        let code = code.strip_prefix("IUCN_").unwrap_or(code);
        match code {
            "LC" => Ok(ConservationStatus::LC),
            "NT" => Ok(ConservationStatus::NT),
            "VU" => Ok(ConservationStatus::VU),
            "EN" => Ok(ConservationStatus::EN),
            "CR" => Ok(ConservationStatus::CR),
            _ => Err(BirdrankError::parse(format!(
                "Unknown conservation status '{}'",
                s
            ))),
        }
    }
}

/// Regional observation counts; `-1` in every field means unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationCounts {
    pub obs_count: i64,
    pub user_obs_count: i64,
    pub user_year_obs_count: i64,
}

impl ObservationCounts {
    pub const UNKNOWN: ObservationCounts = ObservationCounts {
        obs_count: -1,
        user_obs_count: -1,
        user_year_obs_count: -1,
    };

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

impl Default for ObservationCounts {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// A species on a region's list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    /// Chronological rank of the first regional observation
    pub number: Option<u32>,

    /// Stable external species code; empty when the site does not recognize the entry
    pub code: String,

    pub name: String,
    pub taxonomy: Taxonomy,
    pub status: Option<ConservationStatus>,
    pub obs_counts: ObservationCounts,
}

impl Species {
    /// Raw species as listed for a region, not yet enriched
    pub fn new(number: Option<u32>, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            number,
            code: code.into(),
            name: name.into(),
            taxonomy: Taxonomy::default(),
            status: None,
            obs_counts: ObservationCounts::UNKNOWN,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !self.code.trim().is_empty()
    }

    /// Replace all enrichable fields in one step
    pub fn enriched(
        self,
        taxonomy: Taxonomy,
        status: Option<ConservationStatus>,
        obs_counts: ObservationCounts,
    ) -> Self {
        Self {
            taxonomy,
            status,
            obs_counts,
            ..self
        }
    }
}
