//! Remote eBird queries
//!
//! [`RemoteFetcher`] is the boundary the enrichers and pipelines talk to. [`EbirdClient`]
//! implements it against the eBird web site and JSON APIs; tests substitute their own
//! implementation.

pub mod client;
pub mod endpoints;
pub mod html;
pub mod json;

use async_trait::async_trait;

use birdrank_common::Result;

use crate::models::{
    ConservationStatus, Hotspot, MediaType, ObservationCounts, Period, Species, TargetSpecies,
    Taxonomy,
};
use crate::window::MonthWindow;

pub use client::EbirdClient;

/// Parameters of one target-species query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetQuery {
    /// Hotspot id or region code
    pub location: String,
    pub window: MonthWindow,
    pub period: Period,
    pub media: MediaType,
}

/// Answer to a target-species query
#[derive(Debug, Clone, PartialEq)]
pub struct TargetResult {
    /// Checklists the frequencies were computed from
    pub checklists: u32,
    pub species: Vec<TargetSpecies>,
}

/// Credentials a run depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Logged-in web session for target pages
    TargetPages,
    /// API key for taxonomy and observation counts
    Api,
}

/// One query against the remote source per call; no retries
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Fails with a config error when the credentials for `access` are missing.
    ///
    /// Pipelines call this before their first request.
    fn check_access(&self, access: Access) -> Result<()> {
        let _ = access;
        Ok(())
    }

    /// Hotspots of a region in site order, not enriched
    async fn hotspots(&self, region: &str) -> Result<Vec<Hotspot>>;

    /// Target species for a location and window
    async fn target_species(&self, query: &TargetQuery) -> Result<TargetResult>;

    /// Species observed in a region in site order, including unrecognized entries
    async fn region_species(&self, region: &str, locale: Option<&str>) -> Result<Vec<Species>>;

    /// Taxonomy of a species; empty when the API knows no such code
    async fn taxonomy(&self, code: &str) -> Result<Taxonomy>;

    /// IUCN category; `None` when no category is published
    async fn conservation_status(&self, code: &str) -> Result<Option<ConservationStatus>>;

    /// Observation counts of a species in a region, optionally for one user
    async fn observation_counts(
        &self,
        code: &str,
        region: &str,
        username: Option<&str>,
    ) -> Result<ObservationCounts>;
}
