//! Hotspot enrichment from target-species queries
//!
//! A hotspot is queried once per media variant, in order. Each successful variant whose
//! checklist count meets the threshold is filtered and merged into the species gathered
//! so far; failed or gated variants leave the hotspot as it was. Only a configuration
//! error stops enrichment.

use futures::stream::{self, TryStreamExt};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, error};

use birdrank_common::{BirdrankError, Result};

use crate::config::HotspotRunConfig;
use crate::enrich::SpeciesFilter;
use crate::models::{Hotspot, MediaType, Period, TargetSpecies};
use crate::remote::{RemoteFetcher, TargetQuery, TargetResult};
use crate::throttle::Throttle;
use crate::window::MonthWindow;

pub struct HotspotEnricher {
    fetcher: Arc<dyn RemoteFetcher>,
    throttle: Throttle,
    window: MonthWindow,
    period: Period,
    variants: Vec<MediaType>,
    min_checklists: u32,
    species_filter: SpeciesFilter,
}

impl HotspotEnricher {
    pub fn new(
        fetcher: Arc<dyn RemoteFetcher>,
        window: MonthWindow,
        run: &HotspotRunConfig,
    ) -> Self {
        Self {
            fetcher,
            throttle: Throttle::from_secs(run.pause_secs),
            window,
            period: run.period,
            variants: run.media.variants(),
            min_checklists: run.min_checklists,
            species_filter: run.species_filter.clone(),
        }
    }

    /// Replace the delay gate, e.g. with one that does not sleep
    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn window(&self) -> MonthWindow {
        self.window
    }

    pub fn variants(&self) -> &[MediaType] {
        &self.variants
    }

    /// Enrich one hotspot; fetch and parse errors are logged per variant
    pub async fn enrich(&self, hotspot: Hotspot) -> Result<Hotspot> {
        stream::iter(self.variants.iter().copied().map(Ok::<_, BirdrankError>))
            .try_fold(hotspot, |hotspot, media| self.apply_variant(hotspot, media))
            .await
    }

    async fn apply_variant(&self, hotspot: Hotspot, media: MediaType) -> Result<Hotspot> {
        self.throttle.wait().await;

        let query = TargetQuery {
            location: hotspot.id.clone(),
            window: self.window,
            period: self.period,
            media,
        };

        match self.fetcher.target_species(&query).await {
            Ok(result) => Ok(self.merge_result(hotspot, result, media)),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                error!(
                    hotspot = %hotspot.id,
                    media = %media,
                    error = %e,
                    "Failed to fetch target species"
                );
                Ok(hotspot)
            },
        }
    }

    fn merge_result(&self, hotspot: Hotspot, result: TargetResult, media: MediaType) -> Hotspot {
        if result.checklists < self.min_checklists {
            debug!(
                hotspot = %hotspot.id,
                media = %media,
                checklists = result.checklists,
                min_checklists = self.min_checklists,
                "Too few checklists, ignoring variant"
            );
            return hotspot;
        }

        let fetched: Vec<TargetSpecies> = result
            .species
            .into_iter()
            .filter(|species| self.species_filter.accepts(species))
            .collect();
        let merged = merge_target_species(&hotspot.target_species, fetched);

        hotspot.with_targets(result.checklists, merged)
    }
}

/// Concatenate and stable-sort by descending frequency; on ties prior entries come first.
///
/// Species present in both lists are kept twice.
pub fn merge_target_species(
    prior: &[TargetSpecies],
    fetched: Vec<TargetSpecies>,
) -> Vec<TargetSpecies> {
    let mut merged = Vec::with_capacity(prior.len() + fetched.len());
    merged.extend_from_slice(prior);
    merged.extend(fetched);
    merged.sort_by(|a, b| descending_frequency(a, b));
    merged
}

fn descending_frequency(a: &TargetSpecies, b: &TargetSpecies) -> Ordering {
    b.frequency.total_cmp(&a.frequency)
}
