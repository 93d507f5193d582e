//! Birdrank Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Ranks eBird hotspots by how likely a visit is to add new species, and builds enriched
//! species lists for a region.
//!
//! # Runs
//!
//! - **Hotspots**: target species per hotspot, merged across media variants and scored
//! - **Species**: taxonomy, IUCN status and observation counts per regional species
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use birdrank_ingest::config::{EbirdConfig, HotspotRunConfig};
//! use birdrank_ingest::pipeline::HotspotPipeline;
//! use birdrank_ingest::remote::EbirdClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = EbirdClient::new(EbirdConfig::from_env()?)?;
//!     let today = chrono::Local::now().date_naive();
//!     let pipeline = HotspotPipeline::new(Arc::new(client), HotspotRunConfig::default(), today)?;
//!     let report = pipeline.run().await?;
//!     println!("{} hotspots ranked", report.hotspots.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod enrich;
pub mod models;
pub mod pipeline;
pub mod rank;
pub mod region;
pub mod remote;
pub mod report;
pub mod throttle;
pub mod ticker;
pub mod window;
