//! Parsers for eBird and Birds of the World JSON responses

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::Deserialize;

use birdrank_common::{BirdrankError, Result};

use crate::models::{ConservationStatus, ObservationCounts, Taxonomy};

const IUCN_FIELD: &str = "IUCN_status";

/// Accepts user ids with or without trailing padding
const USER_ID_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// One attribute of the auxiliary species endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuxField {
    field_name: Option<String>,
    value: Option<serde_json::Value>,
}

/// First taxonomy entry, or empty when the code is unknown to the API
pub fn parse_taxonomy(body: &str) -> Result<Taxonomy> {
    let entries: Vec<Taxonomy> = serde_json::from_str(body)?;
    Ok(entries.into_iter().next().unwrap_or_default())
}

/// IUCN category from the auxiliary species attributes
pub fn parse_conservation_status(body: &str) -> Result<Option<ConservationStatus>> {
    let fields: Vec<AuxField> = serde_json::from_str(body)?;

    let value = fields
        .into_iter()
        .find(|field| field.field_name.as_deref() == Some(IUCN_FIELD))
        .and_then(|field| field.value);

    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(status)) => status.parse().map(Some),
        Some(other) => Err(BirdrankError::parse(format!(
            "Unexpected conservation status value: {}",
            other
        ))),
    }
}

pub fn parse_observation_counts(body: &str) -> Result<ObservationCounts> {
    Ok(serde_json::from_str(body)?)
}

/// Pad an obfuscated user id to a multiple of four characters.
///
/// The stats endpoint expects the padded base64 form, while profile links show it
/// unpadded.
pub fn pad_username(username: &str) -> Result<String> {
    let username = username.trim();
    let raw = USER_ID_ENGINE.decode(username).map_err(|e| {
        BirdrankError::config(format!(
            "Username '{}' is not an eBird user id: {}",
            username, e
        ))
    })?;
    Ok(USER_ID_ENGINE.encode(raw))
}
