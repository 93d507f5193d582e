//! Species enrichment with taxonomy, conservation status and observation counts

use std::sync::Arc;
use tracing::error;

use birdrank_common::Result;

use crate::models::{ObservationCounts, Species, Taxonomy};
use crate::remote::RemoteFetcher;

/// Fetches the three species fields concurrently; each one falls back independently
pub struct SpeciesEnricher {
    fetcher: Arc<dyn RemoteFetcher>,
    /// Padded user id for personalized counts
    username: Option<String>,
}

impl SpeciesEnricher {
    pub fn new(fetcher: Arc<dyn RemoteFetcher>) -> Self {
        Self {
            fetcher,
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Enrich one species; a failed field keeps its default and is logged.
    ///
    /// Configuration errors are returned instead.
    pub async fn enrich(&self, species: Species, region: &str) -> Result<Species> {
        let code = species.code.as_str();

        let (taxonomy, status, obs_counts) = tokio::join!(
            self.fetcher.taxonomy(code),
            self.fetcher.conservation_status(code),
            self.fetcher.observation_counts(code, region, self.username.as_deref())
        );

        let taxonomy = match taxonomy {
            Ok(taxonomy) => taxonomy,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!(species = %code, error = %e, "Failed to fetch taxonomy");
                Taxonomy::default()
            },
        };
        let status = match status {
            Ok(status) => status,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!(species = %code, error = %e, "Failed to fetch conservation status");
                None
            },
        };
        let obs_counts = match obs_counts {
            Ok(counts) => counts,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!(
                    species = %code,
                    region = %region,
                    error = %e,
                    "Failed to fetch observation counts"
                );
                ObservationCounts::UNKNOWN
            },
        };

        Ok(species.enriched(taxonomy, status, obs_counts))
    }
}
