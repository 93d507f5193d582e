//! Parsers for eBird HTML pages

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use birdrank_common::{BirdrankError, Result};

use crate::models::{Hotspot, Species, TargetSpecies};
use crate::remote::TargetResult;

const HOTSPOT_LINK: &str = "#results tr.Table-row span.Heading > a";
const TARGETS_SUMMARY: &str = "p.u-text-3";
const TARGET_ENTRY: &str = "#targets-results div.ResultsStats";
const TARGET_NAME: &str = "div.SpecimenHeader a";
const TARGET_FREQUENCY: &str = "div.ResultsStats-stats div.StatsIcon";
const SPECIES_ENTRY: &str = "section.Observation--placeSpeciesObserved";
const SPECIES_NUMBER: &str = "div.Observation-numberObserved > span:nth-child(2)";
const SPECIES_LINK: &str = "div.Observation-species a";
const SPECIES_NAME: &str = "div.Observation-species span.Heading-main";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| BirdrankError::parse(format!("Invalid selector '{}': {:?}", css, e)))
}

/// Element text with whitespace runs collapsed to single spaces
fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of every match, joined by spaces
fn select_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope
        .select(selector)
        .map(normalized_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse the region hotspot list into raw hotspots, in page order
pub fn parse_hotspots(html: &str) -> Result<Vec<Hotspot>> {
    let document = Html::parse_document(html);
    let link = selector(HOTSPOT_LINK)?;

    document
        .select(&link)
        .map(|anchor| {
            let href = anchor
                .value()
                .attr("href")
                .ok_or_else(|| BirdrankError::parse("Hotspot link without href"))?;
            Ok(Hotspot::new(hotspot_id(href)?, normalized_text(anchor)))
        })
        .collect()
}

/// Hotspot id from a link like `/hotspot/L2412411?yr=all`
fn hotspot_id(href: &str) -> Result<String> {
    href.split(['?', '#'])
        .next()
        .and_then(|path| path.trim_end_matches('/').rsplit('/').next())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| BirdrankError::parse(format!("No hotspot id in link '{}'", href)))
}

/// Parse a target species page
pub fn parse_targets(html: &str) -> Result<TargetResult> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let summary = select_text(root, &selector(TARGETS_SUMMARY)?);
    let checklists = parse_checklist_count(&summary)?;

    let entry = selector(TARGET_ENTRY)?;
    let name = selector(TARGET_NAME)?;
    let frequency = selector(TARGET_FREQUENCY)?;

    let species = root
        .select(&entry)
        .map(|element| {
            let species_name = element
                .select(&name)
                .next()
                .and_then(first_text_node)
                .ok_or_else(|| BirdrankError::parse("Target species without a name"))?;
            let species_frequency = parse_frequency(&select_text(element, &frequency))?;
            Ok(TargetSpecies::new(species_name, species_frequency))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TargetResult {
        checklists,
        species,
    })
}

/// First direct text child, trimmed; the header link also wraps the scientific name
fn first_text_node(element: ElementRef<'_>) -> Option<String> {
    element
        .children()
        .find_map(|node| node.value().as_text().map(|text| text.trim().to_string()))
        .filter(|text| !text.is_empty())
}

/// Checklist count from a summary like "Based on 1,234 complete checklists"
fn parse_checklist_count(summary: &str) -> Result<u32> {
    summary
        .split_whitespace()
        .find(|token| token.chars().any(|c| c.is_ascii_digit()))
        .and_then(|token| token.replace(',', "").parse().ok())
        .ok_or_else(|| {
            BirdrankError::parse(format!("No checklist count in summary '{}'", summary))
        })
}

/// Frequency from a stat like "42.5%", scaled to [0, 1]
fn parse_frequency(stat: &str) -> Result<f64> {
    let percent = stat
        .split_once('%')
        .map(|(number, _)| number.trim())
        .ok_or_else(|| BirdrankError::parse(format!("No percentage in '{}'", stat)))?;
    let value: f64 = percent
        .parse()
        .map_err(|_| BirdrankError::parse(format!("Invalid percentage '{}'", percent)))?;

    if !(0.0..=100.0).contains(&value) {
        return Err(BirdrankError::parse(format!(
            "Percentage out of range: {}",
            value
        )));
    }

    Ok(value * 0.01)
}

/// Parse the region species list, in page order, including entries without a code
pub fn parse_region_species(html: &str) -> Result<Vec<Species>> {
    let document = Html::parse_document(html);
    let entry = selector(SPECIES_ENTRY)?;
    let number = selector(SPECIES_NUMBER)?;
    let link = selector(SPECIES_LINK)?;
    let name = selector(SPECIES_NAME)?;

    let species = document
        .select(&entry)
        .map(|element| {
            let code = element
                .select(&link)
                .next()
                .and_then(|a| a.value().attr("data-species-code"))
                .unwrap_or_default()
                .trim()
                .to_string();
            let species_name = select_text(element, &name);
            let species_number = parse_catalog_number(&select_text(element, &number), &code);
            Species::new(species_number, code, species_name)
        })
        .collect();

    Ok(species)
}

/// Catalog number like "17."; blank means not catalogued yet
fn parse_catalog_number(text: &str, code: &str) -> Option<u32> {
    let text = text.trim().trim_end_matches('.');
    if text.is_empty() {
        return None;
    }

    match text.replace(',', "").parse() {
        Ok(number) => Some(number),
        Err(_) => {
            warn!(
                species = %code,
                number = %text,
                "Unparseable catalog number, treating as absent"
            );
            None
        },
    }
}
