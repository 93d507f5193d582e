//! Rendering of ranked hotspots and species

use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use birdrank_common::{BirdrankError, Result};

use crate::models::{Hotspot, Species, TargetSpecies};
use crate::pipeline::{HotspotReport, SpeciesReport};
use crate::window::MonthWindow;

/// Width of the `*` columns framing a banner
const BANNER_FRAME: usize = 3;

pub const SPECIES_CSV_HEADER: [&str; 11] = [
    "No",
    "Code",
    "Name",
    "EnglishName",
    "SciName",
    "Status",
    "ObsCount",
    "UserObsCount",
    "FamilyName",
    "FamilySciName",
    "Order",
];

pub const HOTSPOT_CSV_HEADER: [&str; 7] =
    ["Rank", "Id", "Name", "Score", "Checklists", "Species", "Frequency"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Csv,
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Csv => write!(f, "csv"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = BirdrankError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            _ => Err(BirdrankError::config(format!(
                "Invalid report format: {}. Use text, csv or json",
                s
            ))),
        }
    }
}

/// Three-line banner framed with `*`
pub fn banner(title: &str) -> String {
    let frame = "*".repeat(BANNER_FRAME);
    let rule = "*".repeat(title.chars().count() + (BANNER_FRAME + 1) * 2);
    format!("{rule}\n{frame} {title} {frame}\n{rule}\n")
}

pub fn write_hotspots(
    out: &mut impl Write,
    report: &HotspotReport,
    format: ReportFormat,
) -> Result<()> {
    match format {
        ReportFormat::Text => write_hotspots_text(out, report),
        ReportFormat::Csv => write_hotspots_csv(out, report),
        ReportFormat::Json => write_json(out, &HotspotReportView::from(report)),
    }
}

pub fn write_species(
    out: &mut impl Write,
    report: &SpeciesReport,
    format: ReportFormat,
) -> Result<()> {
    match format {
        ReportFormat::Text => {
            write!(out, "{}", banner(&format!("Birds of {}", report.region_title)))?;
            writeln!(out)?;
            write_species_csv(out, report)
        },
        ReportFormat::Csv => write_species_csv(out, report),
        ReportFormat::Json => write_json(out, report),
    }
}

fn write_hotspots_text(out: &mut impl Write, report: &HotspotReport) -> Result<()> {
    write!(out, "{}", banner("Top Hotspots by Score"))?;
    writeln!(
        out,
        "\nRegion: {}, period {}, media {}, months {}",
        report.region_title, report.period, report.media, report.window
    )?;
    writeln!(out, "{} hotspots processed", report.processed)?;

    for hotspot in &report.hotspots {
        writeln!(
            out,
            "\n{} - {:.2} ({})",
            hotspot.name,
            hotspot.score(),
            hotspot.checklists
        )?;
        for species in &hotspot.target_species {
            writeln!(out, "  {} - {:.2}%", species.name, species.frequency * 100.0)?;
        }
    }

    Ok(())
}

fn write_hotspots_csv(out: &mut impl Write, report: &HotspotReport) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HOTSPOT_CSV_HEADER).map_err(csv_error)?;

    for (rank, hotspot) in report.hotspots.iter().enumerate() {
        let rank = (rank + 1).to_string();
        let score = format!("{:.4}", hotspot.score());
        let checklists = hotspot.checklists.to_string();
        for species in &hotspot.target_species {
            writer
                .write_record([
                    rank.as_str(),
                    hotspot.id.as_str(),
                    hotspot.name.as_str(),
                    score.as_str(),
                    checklists.as_str(),
                    species.name.as_str(),
                    format!("{:.4}", species.frequency).as_str(),
                ])
                .map_err(csv_error)?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn write_species_csv(out: &mut impl Write, report: &SpeciesReport) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(SPECIES_CSV_HEADER).map_err(csv_error)?;

    for species in &report.species {
        writer.write_record(species_row(species)).map_err(csv_error)?;
    }

    writer.flush()?;
    Ok(())
}

fn species_row(species: &Species) -> [String; 11] {
    let taxonomy = &species.taxonomy;
    let text = |value: &Option<String>| value.clone().unwrap_or_default();

    [
        species.number.map(|n| n.to_string()).unwrap_or_default(),
        species.code.clone(),
        species.name.clone(),
        text(&taxonomy.common_name),
        text(&taxonomy.scientific_name),
        species.status.map(|s| s.to_string()).unwrap_or_default(),
        species.obs_counts.obs_count.to_string(),
        species.obs_counts.user_obs_count.to_string(),
        text(&taxonomy.family_common_name),
        text(&taxonomy.family_scientific_name),
        text(&taxonomy.order),
    ]
}

fn csv_error(e: csv::Error) -> BirdrankError {
    BirdrankError::Io(std::io::Error::from(e))
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Hotspot report with scores spelled out
#[derive(Serialize)]
struct HotspotReportView<'a> {
    region: &'a str,
    region_title: &'a str,
    window: MonthWindow,
    period: String,
    media: String,
    processed: usize,
    hotspots: Vec<HotspotView<'a>>,
}

#[derive(Serialize)]
struct HotspotView<'a> {
    id: &'a str,
    name: &'a str,
    score: f64,
    checklists: u32,
    target_species: &'a [TargetSpecies],
}

impl<'a> From<&'a Hotspot> for HotspotView<'a> {
    fn from(hotspot: &'a Hotspot) -> Self {
        Self {
            id: &hotspot.id,
            name: &hotspot.name,
            score: hotspot.score(),
            checklists: hotspot.checklists,
            target_species: &hotspot.target_species,
        }
    }
}

impl<'a> From<&'a HotspotReport> for HotspotReportView<'a> {
    fn from(report: &'a HotspotReport) -> Self {
        Self {
            region: &report.region,
            region_title: &report.region_title,
            window: report.window,
            period: report.period.to_string(),
            media: report.media.to_string(),
            processed: report.processed,
            hotspots: report.hotspots.iter().map(HotspotView::from).collect(),
        }
    }
}
