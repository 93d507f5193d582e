//! Enrichment of raw hotspots and species with remote data

pub mod hotspot;
pub mod species;

use std::collections::HashSet;

use crate::models::TargetSpecies;

pub use hotspot::{merge_target_species, HotspotEnricher};
pub use species::SpeciesEnricher;

/// Which fetched target species count towards a hotspot's score
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SpeciesFilter {
    #[default]
    All,
    /// Only species with one of these names
    Named(HashSet<String>),
}

impl SpeciesFilter {
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Named(names.into_iter().map(Into::into).collect())
    }

    pub fn accepts(&self, species: &TargetSpecies) -> bool {
        match self {
            SpeciesFilter::All => true,
            SpeciesFilter::Named(names) => names.contains(&species.name),
        }
    }
}
