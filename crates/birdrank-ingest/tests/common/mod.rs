//! Shared fixtures for the integration tests
#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use birdrank_common::{BirdrankError, Result};
use birdrank_ingest::models::{
    ConservationStatus, Hotspot, MediaType, ObservationCounts, Species, TargetSpecies, Taxonomy,
};
use birdrank_ingest::remote::{RemoteFetcher, TargetQuery, TargetResult};

pub const HOTSPOTS_HTML: &str = r#"
<html><body>
  <table id="results">
    <tr class="Table-row"><td><span class="Heading">
      <a href="/hotspot/L2412411?yr=all&m=">Carska bara</a></span></td></tr>
    <tr class="Table-row"><td><span class="Heading">
      <a href="/hotspot/L1143321?yr=all&m=">Obedska bara</a></span></td></tr>
  </table>
</body></html>
"#;

pub const TARGETS_HTML: &str = r#"
<html><body>
  <p class="u-text-3">Based on 87 complete checklists</p>
  <div id="targets-results">
    <div class="ResultsStats">
      <div class="SpecimenHeader"><a href="/species/pygcor2">Pygmy Cormorant
        <em class="sci">Microcarbo pygmeus</em></a></div>
      <div class="ResultsStats-stats"><div class="StatsIcon">31.0%</div></div>
    </div>
    <div class="ResultsStats">
      <div class="SpecimenHeader"><a href="/species/ferduc">Ferruginous Duck
        <em class="sci">Aythya nyroca</em></a></div>
      <div class="ResultsStats-stats"><div class="StatsIcon">12.5%</div></div>
    </div>
  </div>
</body></html>
"#;

pub const SPECIES_HTML: &str = r#"
<html><body>
  <section class="Observation Observation--placeSpeciesObserved">
    <div class="Observation-numberObserved"><span>No.</span><span>2.</span></div>
    <div class="Observation-species"><a data-species-code="eurjay1">
      <span class="Heading-main">Sojka</span></a></div>
  </section>
  <section class="Observation Observation--placeSpeciesObserved">
    <div class="Observation-numberObserved"><span>No.</span><span>1.</span></div>
    <div class="Observation-species"><a data-species-code="mallar3">
      <span class="Heading-main">Gluvara</span></a></div>
  </section>
  <section class="Observation Observation--placeSpeciesObserved">
    <div class="Observation-numberObserved"><span>No.</span><span></span></div>
    <div class="Observation-species"><a>
      <span class="Heading-main">galeb sp.</span></a></div>
  </section>
</body></html>
"#;

pub fn targets(checklists: u32, species: &[(&str, f64)]) -> TargetResult {
    TargetResult {
        checklists,
        species: species
            .iter()
            .map(|(name, frequency)| TargetSpecies::new(*name, *frequency))
            .collect(),
    }
}

pub fn taxonomy(common_name: &str, scientific_name: &str) -> Taxonomy {
    Taxonomy {
        common_name: Some(common_name.to_string()),
        scientific_name: Some(scientific_name.to_string()),
        ..Default::default()
    }
}

/// In-memory [`RemoteFetcher`]; anything not scripted fails like a missing page
#[derive(Default)]
pub struct FakeFetcher {
    pub hotspots: Option<Vec<Hotspot>>,
    pub targets: HashMap<(String, MediaType), TargetResult>,
    pub species: Option<Vec<Species>>,
    pub taxonomies: HashMap<String, Taxonomy>,
    pub statuses: HashMap<String, ConservationStatus>,
    pub counts: HashMap<String, ObservationCounts>,

    /// Simulated latency of observation-count queries
    pub count_latency: Duration,

    pub target_queries: Mutex<Vec<TargetQuery>>,
    pub usernames: Mutex<Vec<Option<String>>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeFetcher {
    pub fn with_target(mut self, id: &str, media: MediaType, result: TargetResult) -> Self {
        self.targets.insert((id.to_string(), media), result);
        self
    }

    pub fn target_query_count(&self) -> usize {
        self.target_queries.lock().unwrap().len()
    }
}

fn not_found(what: &str, key: &str) -> BirdrankError {
    BirdrankError::fetch(format!("fake://{}/{}", what, key), "HTTP status 404 Not Found")
}

#[async_trait]
impl RemoteFetcher for FakeFetcher {
    async fn hotspots(&self, region: &str) -> Result<Vec<Hotspot>> {
        self.hotspots.clone().ok_or_else(|| not_found("hotspots", region))
    }

    async fn target_species(&self, query: &TargetQuery) -> Result<TargetResult> {
        self.target_queries.lock().unwrap().push(query.clone());
        self.targets
            .get(&(query.location.clone(), query.media))
            .cloned()
            .ok_or_else(|| not_found("targets", &query.location))
    }

    async fn region_species(&self, region: &str, _locale: Option<&str>) -> Result<Vec<Species>> {
        self.species.clone().ok_or_else(|| not_found("region", region))
    }

    async fn taxonomy(&self, code: &str) -> Result<Taxonomy> {
        self.taxonomies
            .get(code)
            .cloned()
            .ok_or_else(|| not_found("taxonomy", code))
    }

    async fn conservation_status(&self, code: &str) -> Result<Option<ConservationStatus>> {
        Ok(self.statuses.get(code).copied())
    }

    async fn observation_counts(
        &self,
        code: &str,
        _region: &str,
        username: Option<&str>,
    ) -> Result<ObservationCounts> {
        self.usernames.lock().unwrap().push(username.map(str::to_string));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.count_latency.is_zero() {
            tokio::time::sleep(self.count_latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.counts
            .get(code)
            .copied()
            .ok_or_else(|| not_found("obsstats", code))
    }
}
