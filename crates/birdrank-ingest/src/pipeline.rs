//! End-to-end runs: fetch the raw list, enrich every entry, rank
//!
//! Constructors fail with a config error when the fetcher lacks the credentials the run
//! needs, so a misconfigured run sends no request.
//!
//! # Hotspots
//!
//! 1. Fetch the region's hotspots (failure aborts the run)
//! 2. Skip block-listed names, keep the first `count`
//! 3. Enrich one hotspot at a time behind the delay gate
//! 4. Drop unscored hotspots and rank by score
//!
//! # Species
//!
//! 1. Fetch the region's species list (failure aborts the run)
//! 2. Keep recognized species
//! 3. Enrich with bounded concurrency
//! 4. Rank by catalog number

use chrono::NaiveDate;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};

use birdrank_common::Result;

use crate::config::{EbirdConfig, HotspotRunConfig, SpeciesRunConfig};
use crate::enrich::{HotspotEnricher, SpeciesEnricher};
use crate::models::{Hotspot, MediaType, Period, Species};
use crate::rank::{rank_hotspots, rank_species};
use crate::region::region_title;
use crate::remote::json::pad_username;
use crate::remote::{Access, RemoteFetcher};
use crate::throttle::Throttle;
use crate::ticker::Ticker;
use crate::window::MonthWindow;

/// Ranked hotspots with the parameters they were computed for
#[derive(Debug, Clone, Serialize)]
pub struct HotspotReport {
    pub region: String,
    pub region_title: String,
    pub window: MonthWindow,
    pub period: Period,
    pub media: MediaType,
    /// Hotspots enriched, scored or not
    pub processed: usize,
    pub hotspots: Vec<Hotspot>,
}

/// Ranked species of a region
#[derive(Debug, Clone, Serialize)]
pub struct SpeciesReport {
    pub region: String,
    pub region_title: String,
    pub processed: usize,
    pub species: Vec<Species>,
}

/// Skip block-listed names, then keep at most `count` hotspots in list order
pub fn select_hotspots(
    hotspots: Vec<Hotspot>,
    excluded: &HashSet<String>,
    count: usize,
) -> Vec<Hotspot> {
    hotspots
        .into_iter()
        .filter(|hotspot| !excluded.contains(&hotspot.name))
        .take(count)
        .collect()
}

pub struct HotspotPipeline<W: Write + Send = io::Stderr> {
    fetcher: Arc<dyn RemoteFetcher>,
    run: HotspotRunConfig,
    enricher: HotspotEnricher,
    ticker: Ticker<W>,
}

impl HotspotPipeline<io::Stderr> {
    /// Pipeline for a run on `today`, which fixes the month window
    pub fn new(
        fetcher: Arc<dyn RemoteFetcher>,
        run: HotspotRunConfig,
        today: NaiveDate,
    ) -> Result<Self> {
        run.validate()?;
        fetcher.check_access(Access::TargetPages)?;
        let window = MonthWindow::around(today, run.month_span)?;
        let enricher = HotspotEnricher::new(fetcher.clone(), window, &run);

        Ok(Self {
            fetcher,
            run,
            enricher,
            ticker: Ticker::default(),
        })
    }
}

impl<W: Write + Send> HotspotPipeline<W> {
    /// Report progress to another sink
    pub fn with_ticker<V: Write + Send>(self, ticker: Ticker<V>) -> HotspotPipeline<V> {
        HotspotPipeline {
            fetcher: self.fetcher,
            run: self.run,
            enricher: self.enricher,
            ticker,
        }
    }

    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.enricher = self.enricher.with_throttle(throttle);
        self
    }

    pub fn ticker(&self) -> &Ticker<W> {
        &self.ticker
    }

    pub async fn run(&self) -> Result<HotspotReport> {
        let region = self.run.region.as_str();
        let window = self.enricher.window();

        info!(region = %region, title = %region_title(region), "Finding top hotspots");

        let raw = self.fetcher.hotspots(region).await.map_err(|e| {
            error!(region = %region, error = %e, "Failed to fetch hotspot list");
            e
        })?;
        let selected = select_hotspots(raw, &self.run.excluded, self.run.count);

        info!(
            hotspots = selected.len(),
            period = %self.run.period,
            media = %self.run.media,
            window = %window,
            "Finding target species"
        );

        let enriched: Vec<Hotspot> = stream::iter(selected)
            .then(|hotspot| async move {
                let hotspot = self.enricher.enrich(hotspot).await;
                self.ticker.tick();
                hotspot
            })
            .try_collect()
            .await?;
        self.ticker.finish();

        let ranked = rank_hotspots(enriched);

        info!(
            processed = self.ticker.count(),
            ranked = ranked.len(),
            "Hotspot ranking complete"
        );

        Ok(HotspotReport {
            region: region.to_string(),
            region_title: region_title(region).to_string(),
            window,
            period: self.run.period,
            media: self.run.media,
            processed: self.ticker.count(),
            hotspots: ranked,
        })
    }
}

pub struct SpeciesPipeline<W: Write + Send = io::Stderr> {
    fetcher: Arc<dyn RemoteFetcher>,
    run: SpeciesRunConfig,
    enricher: SpeciesEnricher,
    ticker: Ticker<W>,
}

impl SpeciesPipeline<io::Stderr> {
    /// `config` supplies the user id, which personalized runs require
    pub fn new(
        fetcher: Arc<dyn RemoteFetcher>,
        run: SpeciesRunConfig,
        config: &EbirdConfig,
    ) -> Result<Self> {
        run.validate()?;
        fetcher.check_access(Access::Api)?;

        let mut enricher = SpeciesEnricher::new(fetcher.clone());
        if run.personalized {
            enricher = enricher.with_username(pad_username(config.require_username()?)?);
        }

        Ok(Self {
            fetcher,
            run,
            enricher,
            ticker: Ticker::default(),
        })
    }
}

impl<W: Write + Send> SpeciesPipeline<W> {
    pub fn with_ticker<V: Write + Send>(self, ticker: Ticker<V>) -> SpeciesPipeline<V> {
        SpeciesPipeline {
            fetcher: self.fetcher,
            run: self.run,
            enricher: self.enricher,
            ticker,
        }
    }

    pub fn ticker(&self) -> &Ticker<W> {
        &self.ticker
    }

    pub async fn run(&self) -> Result<SpeciesReport> {
        let region = self.run.region.as_str();

        info!(region = %region, title = %region_title(region), "Fetching bird species");

        let raw = self
            .fetcher
            .region_species(region, self.run.locale.as_deref())
            .await
            .map_err(|e| {
                error!(region = %region, error = %e, "Failed to fetch species list");
                e
            })?;
        let listed = raw.len();
        let recognized: Vec<Species> = raw.into_iter().filter(Species::is_recognized).collect();

        info!(
            listed,
            recognized = recognized.len(),
            concurrency = self.run.concurrency,
            "Enriching species data"
        );

        let mut enriched: Vec<(usize, Species)> = stream::iter(recognized.into_iter().enumerate())
            .map(|(position, species)| async move {
                let species = self.enricher.enrich(species, region).await;
                self.ticker.tick();
                species.map(|species| (position, species))
            })
            .buffer_unordered(self.run.concurrency)
            .try_collect()
            .await?;
        self.ticker.finish();

        // Completion order is arbitrary; ranking is stable against list order
        enriched.sort_by_key(|(position, _)| *position);
        let ranked = rank_species(enriched.into_iter().map(|(_, species)| species).collect());

        info!(
            processed = self.ticker.count(),
            ranked = ranked.len(),
            "Species list complete"
        );

        Ok(SpeciesReport {
            region: region.to_string(),
            region_title: region_title(region).to_string(),
            processed: self.ticker.count(),
            species: ranked,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn hotspot(id: &str, name: &str) -> Hotspot {
        Hotspot::new(id, name)
    }

    #[test]
    fn test_select_hotspots_excludes_before_truncating() {
        let excluded: HashSet<String> = ["Ada Ciganlija".to_string()].into_iter().collect();
        let selected = select_hotspots(
            vec![
                hotspot("L1", "Ada Ciganlija"),
                hotspot("L2", "Carska bara"),
                hotspot("L3", "Obedska bara"),
                hotspot("L4", "Zasavica"),
            ],
            &excluded,
            2,
        );

        let ids: Vec<_> = selected.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["L2", "L3"]);
    }

    #[test]
    fn test_select_hotspots_count_larger_than_list() {
        let selected = select_hotspots(vec![hotspot("L1", "Zasavica")], &HashSet::new(), 25);
        assert_eq!(selected.len(), 1);
    }
}
