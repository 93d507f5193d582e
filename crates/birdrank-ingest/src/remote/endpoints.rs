//! eBird endpoint URL builders

use crate::remote::TargetQuery;

/// Region's hotspot list page
pub fn hotspots_url(web_url: &str, region: &str) -> String {
    format!("{}/region/{}/hotspots", web_url, region)
}

/// Target species page; the comparison region is always the whole world
pub fn targets_url(web_url: &str, query: &TargetQuery) -> String {
    format!(
        "{}/targets?r1={}&bmo={}&emo={}&r2=world&t2={}&mediaType={}",
        web_url,
        query.location,
        query.window.begin,
        query.window.end,
        query.period.code(),
        query.media.code()
    )
}

/// Region's all-time species list ranked by first observation
pub fn region_species_url(web_url: &str, region: &str) -> String {
    format!(
        "{}/region/{}?yr=all&m=&rank=lrec&hs_sortBy=date&hs_o=asc",
        web_url, region
    )
}

pub fn taxonomy_url(api_url: &str, code: &str) -> String {
    format!("{}/v2/ref/taxonomy/ebird?fmt=json&species={}", api_url, code)
}

pub fn conservation_status_url(bow_url: &str, code: &str) -> String {
    format!(
        "{}/bow/api/v1/auxspecies/{}?category=conservation_status",
        bow_url, code
    )
}

/// Observation stats; an empty username returns region-wide counts only
pub fn observation_counts_url(api_url: &str, code: &str, region: &str, username: &str) -> String {
    format!(
        "{}/v2/product/obsstats/{}/{}?username={}",
        api_url, code, region, username
    )
}
