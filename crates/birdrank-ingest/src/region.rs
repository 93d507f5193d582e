//! Known regions and their display titles

/// (code, title) for regions with a friendly name
pub const KNOWN_REGIONS: &[(&str, &str)] = &[
    ("RS", "Serbia"),
    ("RS-00", "Belgrade"),
    ("RS-VO", "Vojvodina"),
    ("RS-08", "Mačva"),
    ("RS-09", "Kolubara"),
    ("RS-10", "Podunavlje"),
    ("RS-11", "Braničevo"),
    ("RS-12", "Šumadija"),
];

/// Default region for both commands
pub const DEFAULT_REGION: &str = "RS";

/// Display title for a region code, or the code itself when unknown
pub fn region_title(code: &str) -> &str {
    KNOWN_REGIONS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, title)| *title)
        .unwrap_or(code)
}
