//! Birdrank - eBird hotspot ranking and regional species lists

use anyhow::Result;
use birdrank_common::logging::{init_logging, LogConfig, LogLevel};
use birdrank_ingest::config::{
    EbirdConfig, HotspotRunConfig, SpeciesRunConfig, DEFAULT_CONCURRENCY, DEFAULT_HOTSPOT_COUNT,
    DEFAULT_MIN_CHECKLISTS, DEFAULT_MONTH_SPAN,
};
use birdrank_ingest::enrich::SpeciesFilter;
use birdrank_ingest::models::{MediaType, Period};
use birdrank_ingest::pipeline::{HotspotPipeline, SpeciesPipeline};
use birdrank_ingest::region::DEFAULT_REGION;
use birdrank_ingest::remote::EbirdClient;
use birdrank_ingest::report::{write_hotspots, write_species, ReportFormat};
use birdrank_ingest::throttle::DEFAULT_PAUSE_SECS;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "birdrank")]
#[command(author, version, about = "Rank eBird hotspots and build regional species lists")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Report format (text, csv, json)
    #[arg(short, long, global = true, env = "BIRDRANK_FORMAT", default_value = "text")]
    format: ReportFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank hotspots by the target species they offer
    Hotspots {
        /// Region code, e.g. RS or RS-VO
        #[arg(short, long, env = "BIRDRANK_REGION", default_value = DEFAULT_REGION)]
        region: String,

        /// Hotspots to analyse, from the top of the region's list
        #[arg(short, long, default_value_t = DEFAULT_HOTSPOT_COUNT)]
        count: usize,

        /// Hotspot name to skip (repeatable)
        #[arg(short = 'x', long = "exclude")]
        excluded: Vec<String>,

        /// Target period (life, year)
        #[arg(short, long, default_value = "life")]
        period: Period,

        /// Extra media variant to query after the unfiltered one (none, photo, audio)
        #[arg(short, long, default_value = "none")]
        media: MediaType,

        /// Months in the query window around today
        #[arg(long, default_value_t = DEFAULT_MONTH_SPAN)]
        month_span: u32,

        /// Variants backed by fewer checklists are ignored
        #[arg(long, default_value_t = DEFAULT_MIN_CHECKLISTS)]
        min_checklists: u32,

        /// Only count these species (repeatable); all species when omitted
        #[arg(short, long = "species")]
        species: Vec<String>,

        /// Pause before each target-species query
        #[arg(long, env = "BIRDRANK_PAUSE_SECS", default_value_t = DEFAULT_PAUSE_SECS)]
        pause_secs: u64,
    },

    /// List a region's species with taxonomy, status and observation counts
    Species {
        /// Region code, e.g. RS or RS-VO
        #[arg(short, long, env = "BIRDRANK_REGION", default_value = DEFAULT_REGION)]
        region: String,

        /// Site language for species names, e.g. sr
        #[arg(short, long, env = "BIRDRANK_LOCALE")]
        locale: Option<String>,

        /// Include counts for the configured EBIRD_USERNAME
        #[arg(long)]
        personalized: bool,

        /// Species enriched concurrently
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::for_app("birdrank")
        .with_level(log_level)
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    let ebird = EbirdConfig::from_env()?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Command::Hotspots {
            region,
            count,
            excluded,
            period,
            media,
            month_span,
            min_checklists,
            species,
            pause_secs,
        } => {
            let run = HotspotRunConfig {
                region,
                count,
                excluded: excluded.into_iter().collect(),
                period,
                media,
                month_span,
                min_checklists,
                species_filter: if species.is_empty() {
                    SpeciesFilter::All
                } else {
                    SpeciesFilter::named(species)
                },
                pause_secs,
            };

            let client = Arc::new(EbirdClient::new(ebird)?);
            let today = chrono::Local::now().date_naive();
            let report = HotspotPipeline::new(client, run, today)?.run().await?;

            write_hotspots(&mut out, &report, cli.format)?;
        },
        Command::Species {
            region,
            locale,
            personalized,
            concurrency,
        } => {
            let run = SpeciesRunConfig {
                region,
                locale,
                personalized,
                concurrency,
            };

            let client = Arc::new(EbirdClient::new(ebird)?);
            let report = SpeciesPipeline::new(client.clone(), run, client.config())?
                .run()
                .await?;

            write_species(&mut out, &report, cli.format)?;
        },
    }

    info!("Done");
    Ok(())
}
