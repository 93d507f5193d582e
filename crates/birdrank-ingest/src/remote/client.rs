//! HTTP client for the eBird web site and APIs

use async_trait::async_trait;
use reqwest::header::{COOKIE, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::debug;

use birdrank_common::{BirdrankError, Result};

use crate::config::EbirdConfig;
use crate::models::{ConservationStatus, Hotspot, ObservationCounts, Species, Taxonomy};
use crate::remote::{endpoints, html, json, Access, RemoteFetcher, TargetQuery, TargetResult};

/// Header carrying the eBird API key
pub const API_TOKEN_HEADER: &str = "X-eBirdApiToken";

/// Cookie of a logged-in web session
pub const SESSION_COOKIE: &str = "EBIRD_SESSIONID";

/// Cookie selecting the language of species names
pub const LANGUAGE_COOKIE: &str = "I18N_LANGUAGE";

/// [`RemoteFetcher`] backed by the live eBird services
pub struct EbirdClient {
    client: Client,
    config: EbirdConfig,
}

impl EbirdClient {
    pub fn new(config: EbirdConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &EbirdConfig {
        &self.config
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header(USER_AGENT, self.config.user_agent.as_str())
    }

    fn get_with_token(&self, url: &str) -> Result<RequestBuilder> {
        let token = self.config.require_api_token()?;
        Ok(self.get(url).header(API_TOKEN_HEADER, token))
    }

    /// Send a request and return the body of a successful, non-empty response
    async fn fetch_body(&self, request: RequestBuilder, url: &str) -> Result<String> {
        debug!(url = %url, "Fetching");

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BirdrankError::fetch(url, format!("HTTP status {}", status)));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(BirdrankError::fetch(url, "Empty response body"));
        }

        Ok(body)
    }
}

#[async_trait]
impl RemoteFetcher for EbirdClient {
    fn check_access(&self, access: Access) -> Result<()> {
        match access {
            Access::TargetPages => self.config.require_session_id().map(drop),
            Access::Api => self.config.require_api_token().map(drop),
        }
    }

    async fn hotspots(&self, region: &str) -> Result<Vec<Hotspot>> {
        let url = endpoints::hotspots_url(&self.config.web_url, region);
        let body = self.fetch_body(self.get(&url), &url).await?;
        html::parse_hotspots(&body)
    }

    async fn target_species(&self, query: &TargetQuery) -> Result<TargetResult> {
        let session_id = self.config.require_session_id()?;
        let url = endpoints::targets_url(&self.config.web_url, query);
        let request = self
            .get(&url)
            .header(COOKIE, format!("{}={}", SESSION_COOKIE, session_id));

        let body = self.fetch_body(request, &url).await?;
        html::parse_targets(&body)
    }

    async fn region_species(&self, region: &str, locale: Option<&str>) -> Result<Vec<Species>> {
        let url = endpoints::region_species_url(&self.config.web_url, region);
        let mut request = self.get(&url);
        if let Some(locale) = locale {
            request = request.header(COOKIE, format!("{}={}", LANGUAGE_COOKIE, locale));
        }

        let body = self.fetch_body(request, &url).await?;
        html::parse_region_species(&body)
    }

    async fn taxonomy(&self, code: &str) -> Result<Taxonomy> {
        let url = endpoints::taxonomy_url(&self.config.api_url, code);
        let body = self.fetch_body(self.get_with_token(&url)?, &url).await?;
        json::parse_taxonomy(&body)
    }

    async fn conservation_status(&self, code: &str) -> Result<Option<ConservationStatus>> {
        let url = endpoints::conservation_status_url(&self.config.bow_url, code);
        let body = self.fetch_body(self.get(&url), &url).await?;
        json::parse_conservation_status(&body)
    }

    async fn observation_counts(
        &self,
        code: &str,
        region: &str,
        username: Option<&str>,
    ) -> Result<ObservationCounts> {
        let url = endpoints::observation_counts_url(
            &self.config.api_url,
            code,
            region,
            username.unwrap_or_default(),
        );
        let body = self.fetch_body(self.get_with_token(&url)?, &url).await?;
        json::parse_observation_counts(&body)
    }
}
