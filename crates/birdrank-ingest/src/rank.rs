//! Deterministic ordering of enriched hotspots and species

use crate::models::{Hotspot, Species};

/// Drop unscored hotspots and sort the rest by descending score; equal scores keep input order
pub fn rank_hotspots(hotspots: Vec<Hotspot>) -> Vec<Hotspot> {
    let mut ranked: Vec<Hotspot> = hotspots.into_iter().filter(Hotspot::is_scored).collect();
    ranked.sort_by(|a, b| b.score().total_cmp(&a.score()));
    ranked
}

/// Sort by ascending catalog number, uncatalogued species last in input order
pub fn rank_species(mut species: Vec<Species>) -> Vec<Species> {
    species.sort_by_key(|s| (s.number.is_none(), s.number));
    species
}
