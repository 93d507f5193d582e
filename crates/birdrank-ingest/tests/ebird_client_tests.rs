//! Tests for the eBird HTTP client against a mock server
//!
//! These tests validate:
//! - Request URLs, cookies and API headers
//! - Parsing of the served pages and JSON
//! - Fetch errors for bad statuses and empty bodies
//! - A species run end to end over HTTP

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use birdrank_common::BirdrankError;
use birdrank_ingest::config::{EbirdConfig, HotspotRunConfig, SpeciesRunConfig};
use birdrank_ingest::models::{ConservationStatus, MediaType, Period};
use birdrank_ingest::pipeline::{HotspotPipeline, SpeciesPipeline};
use birdrank_ingest::remote::{EbirdClient, RemoteFetcher, TargetQuery};
use birdrank_ingest::ticker::Ticker;
use birdrank_ingest::window::MonthWindow;

use common::{HOTSPOTS_HTML, SPECIES_HTML, TARGETS_HTML};

const SESSION_ID: &str = "5F03A2DA1B";
const API_TOKEN: &str = "test-token";

fn client(server: &MockServer) -> EbirdClient {
    let config = EbirdConfig::builder()
        .base_url(server.uri())
        .session_id(SESSION_ID)
        .api_token(API_TOKEN)
        .timeout_secs(5)
        .build();
    EbirdClient::new(config).unwrap()
}

fn target_query(media: MediaType) -> TargetQuery {
    TargetQuery {
        location: "L2412411".to_string(),
        window: MonthWindow { begin: 12, end: 1 },
        period: Period::Life,
        media,
    }
}

#[tokio::test]
async fn test_hotspots() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/region/RS-VO/hotspots"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HOTSPOTS_HTML))
        .mount(&mock_server)
        .await;

    let hotspots = client(&mock_server).hotspots("RS-VO").await.unwrap();

    assert_eq!(hotspots.len(), 2);
    assert_eq!(hotspots[0].id, "L2412411");
    assert_eq!(hotspots[0].name, "Carska bara");
    assert_eq!(hotspots[1].id, "L1143321");
}

#[tokio::test]
async fn test_target_species_sends_session_cookie() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/targets"))
        .and(query_param("r1", "L2412411"))
        .and(query_param("bmo", "12"))
        .and(query_param("emo", "1"))
        .and(query_param("r2", "world"))
        .and(query_param("t2", "life"))
        .and(query_param("mediaType", "P"))
        .and(header("cookie", "EBIRD_SESSIONID=5F03A2DA1B"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TARGETS_HTML))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client(&mock_server)
        .target_species(&target_query(MediaType::Photo))
        .await
        .unwrap();

    assert_eq!(result.checklists, 87);
    assert_eq!(result.species.len(), 2);
    assert_eq!(result.species[0].name, "Pygmy Cormorant");
    assert!((result.species[0].frequency - 0.31).abs() < 1e-9);
    assert!((result.species[1].frequency - 0.125).abs() < 1e-9);
}

#[tokio::test]
async fn test_target_species_without_session_is_config_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/targets"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TARGETS_HTML))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = EbirdConfig::builder().base_url(mock_server.uri()).build();
    let err = EbirdClient::new(config)
        .unwrap()
        .target_species(&target_query(MediaType::None))
        .await
        .unwrap_err();

    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_non_success_status_is_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/targets"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .target_species(&target_query(MediaType::None))
        .await
        .unwrap_err();

    match err {
        BirdrankError::Fetch { url, reason } => {
            assert!(url.contains("/targets?r1=L2412411"));
            assert!(reason.contains("403"));
        },
        other => panic!("expected fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_body_is_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/ref/taxonomy/ebird"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).taxonomy("eurjay1").await.unwrap_err();
    assert!(matches!(err, BirdrankError::Fetch { .. }));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_region_species_with_locale() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/region/RS"))
        .and(query_param("yr", "all"))
        .and(query_param("rank", "lrec"))
        .and(header("cookie", "I18N_LANGUAGE=sr"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SPECIES_HTML))
        .mount(&mock_server)
        .await;

    let species = client(&mock_server)
        .region_species("RS", Some("sr"))
        .await
        .unwrap();

    assert_eq!(species.len(), 3);
    assert_eq!(species[0].code, "eurjay1");
    assert_eq!(species[0].number, Some(2));
    assert_eq!(species[0].name, "Sojka");
    assert!(!species[2].is_recognized());
}

#[tokio::test]
async fn test_taxonomy_sends_api_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/ref/taxonomy/ebird"))
        .and(query_param("fmt", "json"))
        .and(query_param("species", "eurjay1"))
        .and(header("X-eBirdApiToken", API_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "sciName": "Garrulus glandarius",
                "comName": "Eurasian Jay",
                "speciesCode": "eurjay1",
                "order": "Passeriformes",
                "familyComName": "Crows, Jays, and Magpies",
                "familySciName": "Corvidae"
            }
        ])))
        .mount(&mock_server)
        .await;

    let taxonomy = client(&mock_server).taxonomy("eurjay1").await.unwrap();

    assert_eq!(taxonomy.common_name.as_deref(), Some("Eurasian Jay"));
    assert_eq!(taxonomy.family_common_name.as_deref(), Some("Crows, Jays, and Magpies"));
}

#[tokio::test]
async fn test_conservation_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bow/api/v1/auxspecies/ferduc"))
        .and(query_param("category", "conservation_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "fieldName": "IUCN_status", "value": "IUCN_NT" }
        ])))
        .mount(&mock_server)
        .await;

    let status = client(&mock_server).conservation_status("ferduc").await.unwrap();
    assert_eq!(status, Some(ConservationStatus::NT));
}

#[tokio::test]
async fn test_observation_counts_with_username() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/product/obsstats/eurjay1/RS"))
        .and(query_param("username", "MjUxODE0Nw=="))
        .and(header("X-eBirdApiToken", API_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "obsCount": 1520,
            "userObsCount": 12,
            "userYearObsCount": 3
        })))
        .mount(&mock_server)
        .await;

    let counts = client(&mock_server)
        .observation_counts("eurjay1", "RS", Some("MjUxODE0Nw=="))
        .await
        .unwrap();

    assert_eq!(counts.obs_count, 1520);
    assert_eq!(counts.user_obs_count, 12);
    assert_eq!(counts.user_year_obs_count, 3);
}

#[tokio::test]
async fn test_species_run_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/region/RS"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SPECIES_HTML))
        .mount(&mock_server)
        .await;

    // Taxonomy service is down for the whole run
    Mock::given(method("GET"))
        .and(path("/v2/ref/taxonomy/ebird"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bow/api/v1/auxspecies/eurjay1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "fieldName": "IUCN_status", "value": "IUCN_LC" }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bow/api/v1/auxspecies/mallar3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    for (code, obs_count) in [("eurjay1", 900), ("mallar3", 5000)] {
        Mock::given(method("GET"))
            .and(path(format!("/v2/product/obsstats/{}/RS", code)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "obsCount": obs_count,
                "userObsCount": 0,
                "userYearObsCount": 0
            })))
            .mount(&mock_server)
            .await;
    }

    let fetcher = Arc::new(client(&mock_server));
    let config = fetcher.config().clone();
    let pipeline = SpeciesPipeline::new(fetcher, SpeciesRunConfig::default(), &config)
        .unwrap()
        .with_ticker(Ticker::with_sink(1, 100, Vec::new()));
    let report = pipeline.run().await.unwrap();

    let codes: Vec<_> = report.species.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(codes, vec!["mallar3", "eurjay1"]);

    let mallard = &report.species[0];
    assert!(mallard.taxonomy.is_empty());
    assert_eq!(mallard.status, None);
    assert_eq!(mallard.obs_counts.obs_count, 5000);

    let jay = &report.species[1];
    assert_eq!(jay.status, Some(ConservationStatus::LC));
    assert_eq!(jay.obs_counts.obs_count, 900);
}

#[tokio::test]
async fn test_hotspot_run_without_session_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HOTSPOTS_HTML))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = EbirdConfig::builder()
        .base_url(mock_server.uri())
        .api_token(API_TOKEN)
        .build();
    let fetcher = Arc::new(EbirdClient::new(config).unwrap());
    let today = chrono::NaiveDate::from_ymd_opt(2024, 12, 20).unwrap();

    let err = HotspotPipeline::new(fetcher, HotspotRunConfig::default(), today)
        .err()
        .unwrap();

    match err {
        BirdrankError::Config(msg) => assert!(msg.contains("EBIRD_SESSION_ID")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_species_run_without_token_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SPECIES_HTML))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = EbirdConfig::builder()
        .base_url(mock_server.uri())
        .session_id(SESSION_ID)
        .build();
    let fetcher = Arc::new(EbirdClient::new(config.clone()).unwrap());

    let err = SpeciesPipeline::new(fetcher, SpeciesRunConfig::default(), &config)
        .err()
        .unwrap();
    assert!(err.is_fatal());
}
