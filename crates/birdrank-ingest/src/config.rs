//! Configuration for the eBird client and for the two runs
//!
//! Endpoints and credentials come from the environment (a `.env` file is honored by the
//! binary); run parameters come from the command line.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use birdrank_common::{BirdrankError, Result};

use crate::enrich::SpeciesFilter;
use crate::models::{MediaType, Period};
use crate::region::DEFAULT_REGION;
use crate::throttle::DEFAULT_PAUSE_SECS;

// ============================================================================
// eBird Client Constants
// ============================================================================

/// eBird web site, source of the HTML pages
pub const DEFAULT_WEB_URL: &str = "https://ebird.org";

/// eBird JSON API
pub const DEFAULT_API_URL: &str = "https://api.ebird.org";

/// Birds of the World API, source of conservation status
pub const DEFAULT_BOW_URL: &str = "https://species.birds.cornell.edu";

/// Default timeout for a single request in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_USER_AGENT: &str = concat!("birdrank/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Run Defaults
// ============================================================================

pub const DEFAULT_HOTSPOT_COUNT: usize = 25;
pub const DEFAULT_MONTH_SPAN: u32 = 2;
pub const DEFAULT_MIN_CHECKLISTS: u32 = 2;
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Endpoints and credentials for the eBird services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EbirdConfig {
    pub web_url: String,
    pub api_url: String,
    pub bow_url: String,

    /// `EBIRD_SESSIONID` cookie of a logged-in browser session, needed for target pages
    pub session_id: Option<String>,

    /// eBird API key, needed for taxonomy and observation counts
    pub api_token: Option<String>,

    /// eBird user id for personalized observation counts
    pub username: Option<String>,

    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for EbirdConfig {
    fn default() -> Self {
        Self {
            web_url: DEFAULT_WEB_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            bow_url: DEFAULT_BOW_URL.to_string(),
            session_id: None,
            api_token: None,
            username: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl EbirdConfig {
    /// Load config from environment variables
    ///
    /// - `EBIRD_WEB_URL`, `EBIRD_API_URL`, `EBIRD_BOW_URL`: service base URLs
    /// - `EBIRD_SESSION_ID`: session cookie for target pages
    /// - `EBIRD_API_TOKEN`: API key
    /// - `EBIRD_USERNAME`: user id for personalized counts
    /// - `BIRDRANK_HTTP_TIMEOUT_SECS`: request timeout
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("EBIRD_WEB_URL") {
            config.web_url = url;
        }

        if let Ok(url) = std::env::var("EBIRD_API_URL") {
            config.api_url = url;
        }

        if let Ok(url) = std::env::var("EBIRD_BOW_URL") {
            config.bow_url = url;
        }

        config.session_id = non_blank_var("EBIRD_SESSION_ID");
        config.api_token = non_blank_var("EBIRD_API_TOKEN");
        config.username = non_blank_var("EBIRD_USERNAME");

        if let Ok(timeout) = std::env::var("BIRDRANK_HTTP_TIMEOUT_SECS") {
            config.timeout_secs = timeout.parse().map_err(|_| {
                BirdrankError::config(format!(
                    "BIRDRANK_HTTP_TIMEOUT_SECS must be a number of seconds, got '{}'",
                    timeout
                ))
            })?;
        }

        Ok(config)
    }

    pub fn builder() -> EbirdConfigBuilder {
        EbirdConfigBuilder::default()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("web", &self.web_url),
            ("API", &self.api_url),
            ("Birds of the World", &self.bow_url),
        ] {
            if url.trim().is_empty() {
                return Err(BirdrankError::config(format!("eBird {} URL cannot be empty", name)));
            }
        }

        if self.timeout_secs == 0 {
            return Err(BirdrankError::config("Timeout must be greater than 0"));
        }

        Ok(())
    }

    /// Session cookie, required before any target-species query
    pub fn require_session_id(&self) -> Result<&str> {
        self.session_id.as_deref().ok_or_else(|| {
            BirdrankError::config("EBIRD_SESSION_ID must be set for hotspot ranking")
        })
    }

    /// API key, required before any taxonomy or observation-count query
    pub fn require_api_token(&self) -> Result<&str> {
        self.api_token
            .as_deref()
            .ok_or_else(|| BirdrankError::config("EBIRD_API_TOKEN must be set for species lists"))
    }

    /// User id, required for personalized observation counts
    pub fn require_username(&self) -> Result<&str> {
        self.username.as_deref().ok_or_else(|| {
            BirdrankError::config("EBIRD_USERNAME must be set for personalized counts")
        })
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Builder for EbirdConfig
#[derive(Debug, Default)]
pub struct EbirdConfigBuilder {
    web_url: Option<String>,
    api_url: Option<String>,
    bow_url: Option<String>,
    session_id: Option<String>,
    api_token: Option<String>,
    username: Option<String>,
    timeout_secs: Option<u64>,
}

impl EbirdConfigBuilder {
    /// Point all three services at one base URL, e.g. a mock server
    pub fn base_url(self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.web_url(url.clone()).api_url(url.clone()).bow_url(url)
    }

    pub fn web_url(mut self, url: impl Into<String>) -> Self {
        self.web_url = Some(url.into());
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn bow_url(mut self, url: impl Into<String>) -> Self {
        self.bow_url = Some(url.into());
        self
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn build(self) -> EbirdConfig {
        let default = EbirdConfig::default();

        EbirdConfig {
            web_url: self.web_url.unwrap_or(default.web_url),
            api_url: self.api_url.unwrap_or(default.api_url),
            bow_url: self.bow_url.unwrap_or(default.bow_url),
            session_id: self.session_id,
            api_token: self.api_token,
            username: self.username,
            timeout_secs: self.timeout_secs.unwrap_or(default.timeout_secs),
            user_agent: default.user_agent,
        }
    }
}

/// Parameters of a hotspot ranking run
#[derive(Debug, Clone)]
pub struct HotspotRunConfig {
    pub region: String,

    /// Hotspots to enrich, taken from the top of the region's list
    pub count: usize,

    /// Hotspot names to skip before taking `count`
    pub excluded: HashSet<String>,

    pub period: Period,

    /// Optional evidence filter queried after the unfiltered variant
    pub media: MediaType,

    pub month_span: u32,
    pub min_checklists: u32,
    pub species_filter: SpeciesFilter,

    /// Pause before every target-species query
    pub pause_secs: u64,
}

impl Default for HotspotRunConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            count: DEFAULT_HOTSPOT_COUNT,
            excluded: HashSet::new(),
            period: Period::Life,
            media: MediaType::None,
            month_span: DEFAULT_MONTH_SPAN,
            min_checklists: DEFAULT_MIN_CHECKLISTS,
            species_filter: SpeciesFilter::All,
            pause_secs: DEFAULT_PAUSE_SECS,
        }
    }
}

impl HotspotRunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(BirdrankError::config("Region code cannot be empty"));
        }

        if self.count == 0 {
            return Err(BirdrankError::config("Hotspot count must be greater than 0"));
        }

        if !(1..=12).contains(&self.month_span) {
            return Err(BirdrankError::config(format!(
                "Month span must be between 1 and 12, got {}",
                self.month_span
            )));
        }

        Ok(())
    }
}

/// Parameters of a regional species list run
#[derive(Debug, Clone)]
pub struct SpeciesRunConfig {
    pub region: String,

    /// Site language for species names, e.g. "sr"
    pub locale: Option<String>,

    /// Include the configured user's own counts
    pub personalized: bool,

    /// Species enriched at the same time
    pub concurrency: usize,
}

impl Default for SpeciesRunConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            locale: None,
            personalized: false,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl SpeciesRunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(BirdrankError::config("Region code cannot be empty"));
        }

        if self.concurrency == 0 {
            return Err(BirdrankError::config("Concurrency must be greater than 0"));
        }

        Ok(())
    }
}
