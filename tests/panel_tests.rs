//! Panel listing, snapshot refresh and confidence filtering.

use std::fs;

use ferro_bed::http::MockTransport;
use ferro_bed::store::{PanelStore, SqliteStore};
use ferro_bed::{EndpointConfig, PanelService};

const LISTING: &str = "https://panelapp.genomicsengland.co.uk/api/v1/panels/signedoff/";
const PAGE_2: &str = "https://panelapp.genomicsengland.co.uk/api/v1/panels/signedoff/?page=2";

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{}", name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e))
}

fn detail_url(panel_id: u64) -> String {
    format!(
        "https://panelapp.genomicsengland.co.uk/api/v1/panels/{}/",
        panel_id
    )
}

/// Listing over two pages plus details for two of the three panels
fn mock_panelapp() -> MockTransport {
    let mock = MockTransport::new();
    mock.respond_json(LISTING, &[], 200, &fixture("panelapp_page1.json"));
    mock.respond_json(PAGE_2, &[], 200, &fixture("panelapp_page2.json"));
    mock.respond_json(&detail_url(635), &[], 200, &fixture("panelapp_detail_635.json"));
    mock.respond_json(&detail_url(158), &[], 200, &fixture("panelapp_detail_158.json"));
    mock
}

#[test]
fn test_fetch_all_panels_follows_next() {
    let mock = mock_panelapp();
    let store = SqliteStore::in_memory().unwrap();
    let service = PanelService::new(&mock, &store, EndpointConfig::default());

    let fetch = service.fetch_all_panels();
    assert!(fetch.complete);
    assert!(fetch.error.is_none());

    let names: Vec<String> = fetch.panels.iter().map(|p| p.display_name()).collect();
    assert_eq!(
        names,
        vec![
            "R444 - Adult solid tumours cancer susceptibility",
            "Hereditary breast cancer",
            "R29 - Intellectual disability",
        ]
    );
    assert_eq!(fetch.panels[2].version.as_deref(), Some("5"));
}

#[test]
fn test_fetch_all_panels_signals_partial_result() {
    let mock = MockTransport::new();
    mock.respond_json(LISTING, &[], 200, &fixture("panelapp_page1.json"));
    mock.respond_json(PAGE_2, &[], 500, "");
    let store = SqliteStore::in_memory().unwrap();
    let service = PanelService::new(&mock, &store, EndpointConfig::default());

    let fetch = service.fetch_all_panels();
    assert_eq!(fetch.panels.len(), 2);
    assert!(!fetch.complete);
    assert!(fetch.error.unwrap().is_upstream_error());
}

#[test]
fn test_refresh_replaces_snapshot() {
    let mock = mock_panelapp();
    let store = SqliteStore::in_memory().unwrap();
    let service = PanelService::new(&mock, &store, EndpointConfig::default());

    let report = service.refresh_panels().unwrap();
    assert_eq!(report.panels, 3);
    assert_eq!(report.genes, 6);
    assert!(!report.complete);
    assert_eq!(report.failed_panels, vec![245]);

    let stored = service.cached_panels().unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(
        stored[0].last_refreshed, stored[2].last_refreshed,
        "one timestamp per refresh"
    );

    // A second refresh replaces rather than accumulates
    service.refresh_panels().unwrap();
    assert_eq!(store.counts().unwrap().panels, 3);
    assert_eq!(store.counts().unwrap().panel_genes, 6);
}

#[test]
fn test_failed_listing_keeps_snapshot() {
    let mock = mock_panelapp();
    let store = SqliteStore::in_memory().unwrap();
    PanelService::new(&mock, &store, EndpointConfig::default())
        .refresh_panels()
        .unwrap();

    let broken = MockTransport::new();
    broken.respond_json(LISTING, &[], 503, "");
    let service = PanelService::new(&broken, &store, EndpointConfig::default());

    assert!(service.refresh_panels().is_err());
    assert_eq!(store.panels().unwrap().len(), 3);
}

#[test]
fn test_genes_for_panel_filters_confidence() {
    let mock = mock_panelapp();
    let store = SqliteStore::in_memory().unwrap();
    let service = PanelService::new(&mock, &store, EndpointConfig::default());

    let symbols = |amber, red| -> Vec<String> {
        service
            .genes_for_panel(635, amber, red)
            .unwrap()
            .into_iter()
            .map(|g| g.symbol)
            .collect()
    };

    assert_eq!(symbols(false, false), vec!["BRCA1", "BRCA2"]);
    assert_eq!(symbols(true, false), vec!["BRCA1", "BRCA2", "CHEK2"]);
    assert_eq!(symbols(false, true), vec!["BRCA1", "BRCA2", "NBN"]);
    assert_eq!(symbols(true, true), vec!["BRCA1", "BRCA2", "CHEK2", "NBN"]);

    // Nothing stored yet, so every call went to the detail endpoint
    assert_eq!(mock.count_matching(&detail_url(635)), 4);
    assert_eq!(store.counts().unwrap().panel_genes, 0);
}

#[test]
fn test_genes_for_panel_prefers_snapshot() {
    let mock = mock_panelapp();
    let store = SqliteStore::in_memory().unwrap();
    let service = PanelService::new(&mock, &store, EndpointConfig::default());
    service.refresh_panels().unwrap();
    let before = mock.request_count();

    let genes = service.genes_for_panel(635, true, true).unwrap();
    let mut symbols: Vec<&str> = genes.iter().map(|g| g.symbol.as_str()).collect();
    symbols.sort_unstable();

    assert_eq!(symbols, vec!["BRCA1", "BRCA2", "CHEK2", "NBN"]);
    assert_eq!(mock.request_count(), before);
}

#[test]
fn test_genes_for_unknown_panel_is_empty() {
    let mock = MockTransport::new();
    let store = SqliteStore::in_memory().unwrap();
    let service = PanelService::new(&mock, &store, EndpointConfig::default());

    assert!(service.genes_for_panel(99999, true, true).unwrap().is_empty());
}

#[test]
fn test_genes_for_panel_keeps_payload_order_across_refresh() {
    let mock = MockTransport::new();
    mock.respond_json(LISTING, &[], 200, &fixture("panelapp_page2.json"));
    mock.respond_json(
        &detail_url(245),
        &[],
        200,
        r#"{
            "id": 245,
            "name": "Intellectual disability",
            "genes": [
                {"gene_data": {"gene_symbol": "SYNGAP1"}, "confidence_level": "3"},
                {"gene_data": {"gene_symbol": "ARID1B"}, "confidence_level": "3"},
                {"gene_data": {"gene_symbol": "MECP2"}, "confidence_level": "3"}
            ]
        }"#,
    );
    let store = SqliteStore::in_memory().unwrap();
    let service = PanelService::new(&mock, &store, EndpointConfig::default());

    let symbols = || -> Vec<String> {
        service
            .genes_for_panel(245, false, false)
            .unwrap()
            .into_iter()
            .map(|g| g.symbol)
            .collect()
    };

    let remote = symbols();
    assert_eq!(remote, vec!["SYNGAP1", "ARID1B", "MECP2"]);

    service.refresh_panels().unwrap();
    let before = mock.request_count();
    assert_eq!(symbols(), remote);
    assert_eq!(mock.request_count(), before);
}
