//! End-to-end resolution tests against canned upstream payloads.
//!
//! Every test runs on a `MockTransport` and an in-memory (or temporary
//! on-disk) cache, so request counts can be asserted exactly.

use std::fs;
use std::sync::Arc;

use ferro_bed::http::{MockTransport, RetryPolicy, RetryingTransport, SharedTransport};
use ferro_bed::store::{RegionStore, SqliteStore, StoreCounts};
use ferro_bed::tark::{TarkTranscript, SEARCH_EXPAND};
use ferro_bed::{
    Assembly, BedError, EndpointConfig, Padding, RecordSource, ResolveRequest, Resolver,
    SkipReason,
};

const TARK_SEARCH: &str = "https://tark.ensembl.org/api/transcript/search/";
const VEP_GRCH38: &str = "https://rest.ensembl.org/vep/human/id/";
const VEP_QUERY: &[(&str, &str)] = &[
    ("refseq", "true"),
    ("canonical", "true"),
    ("content-type", "application/json"),
];

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{}", name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e))
}

fn tark_query(identifier: &str) -> [(&str, &str); 2] {
    [("identifier_field", identifier), ("expand", SEARCH_EXPAND)]
}

fn mock_tark(mock: &MockTransport, identifier: &str, fixture_name: &str) {
    mock.respond_json(
        TARK_SEARCH,
        &tark_query(identifier),
        200,
        &fixture(fixture_name),
    );
}

fn starts(records: &[ferro_bed::RegionRecord]) -> Vec<u64> {
    records.iter().map(|r| r.start).collect()
}

#[test]
fn test_miss_writes_through_then_hits_cache() {
    let mock = MockTransport::new();
    let store = SqliteStore::in_memory().unwrap();
    mock_tark(&mock, "BRCA1", "tark_brca1.json");
    let resolver = Resolver::new(&mock, &store, EndpointConfig::default());
    let request = ResolveRequest::new("BRCA1", Assembly::GRCh38).with_padding(Padding::new(10, 20));

    // First call: one search, exons in payload order
    let first = resolver.resolve(&request).unwrap();
    assert_eq!(mock.count_matching(TARK_SEARCH), 1);
    assert_eq!(first.records.len(), 3);
    assert!(first.skipped.is_empty());
    assert_eq!(
        starts(&first.records),
        vec![43115726 - 10, 43124017 - 10, 43106456 - 10]
    );
    for record in &first.records {
        assert_eq!(record.accession, "NM_007294.4");
        assert_eq!(record.gene, "BRCA1");
        assert_eq!(record.entrez_id.as_deref(), Some("672"));
        assert_eq!(record.source, RecordSource::Remote);
    }
    assert_eq!(first.records[0].end, 43115779 + 20);

    // Whole payload persisted, other assembly included
    assert_eq!(
        store.counts().unwrap(),
        StoreCounts {
            genes: 2,
            transcripts: 4,
            exons: 5,
            release_sets: 2,
            panels: 0,
            panel_genes: 0,
        }
    );

    // Second call: served from the cache in exon order, no network
    let second = resolver.resolve(&request).unwrap();
    assert_eq!(mock.request_count(), 1);
    assert_eq!(
        starts(&second.records),
        vec![43124017 - 10, 43115726 - 10, 43106456 - 10]
    );
    let orders: Vec<u32> = second
        .records
        .iter()
        .map(|r| r.exon.as_ref().unwrap().exon_order)
        .collect();
    assert_eq!(orders, vec![1, 2, 3]);
    assert!(second
        .records
        .iter()
        .all(|r| r.source == RecordSource::Cache && r.accession == "NM_007294.4"));
}

#[test]
fn test_cached_gene_needs_mane_select_for_hit() {
    let mock = MockTransport::new();
    let store = SqliteStore::in_memory().unwrap();
    mock_tark(&mock, "TIEGENE", "tark_tiebreak.json");
    let resolver = Resolver::new(&mock, &store, EndpointConfig::default());
    let request = ResolveRequest::new("TIEGENE", Assembly::GRCh38);

    let first = resolver.resolve(&request).unwrap();
    let transcripts = store.counts().unwrap().transcripts;
    let second = resolver.resolve(&request).unwrap();

    // No MANE Select transcript, so the search repeats with the same outcome
    assert_eq!(mock.count_matching(TARK_SEARCH), 2);
    assert_eq!(first, second);
    assert_eq!(store.counts().unwrap().transcripts, transcripts);
}

#[test]
fn test_highest_nm_version_wins() {
    let mock = MockTransport::new();
    let store = SqliteStore::in_memory().unwrap();
    mock_tark(&mock, "TIEGENE", "tark_tiebreak.json");
    let resolver = Resolver::new(&mock, &store, EndpointConfig::default());

    let outcome = resolver
        .resolve(&ResolveRequest::new("TIEGENE", Assembly::GRCh38))
        .unwrap();

    assert_eq!(outcome.records.len(), 2);
    assert!(outcome
        .records
        .iter()
        .all(|r| r.accession == "NM_999999.5" && r.entrez_id.as_deref() == Some("1234")));
}

#[test]
fn test_padding_floors_start_at_zero() {
    let mock = MockTransport::new();
    let store = SqliteStore::in_memory().unwrap();
    mock_tark(&mock, "TIEGENE", "tark_tiebreak.json");
    let resolver = Resolver::new(&mock, &store, EndpointConfig::default());

    let outcome = resolver
        .resolve(
            &ResolveRequest::new("TIEGENE", Assembly::GRCh38).with_padding(Padding::new(10, 0)),
        )
        .unwrap();

    assert_eq!(outcome.records[0].start, 0);
    assert_eq!(outcome.records[0].end, 60);
    assert_eq!(outcome.records[1].start, 890);
}

#[test]
fn test_assembly_selects_transcript() {
    let mock = MockTransport::new();
    let store = SqliteStore::in_memory().unwrap();
    mock_tark(&mock, "BRCA1", "tark_brca1.json");
    let resolver = Resolver::new(&mock, &store, EndpointConfig::default());

    let outcome = resolver
        .resolve(&ResolveRequest::new("BRCA1", Assembly::GRCh37))
        .unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].accession, "NM_007294.9");
    assert_eq!(outcome.records[0].start, 41276034);
}

#[test]
fn test_rsid_records_are_not_padded() {
    let mock = MockTransport::new();
    let store = SqliteStore::in_memory().unwrap();
    mock.respond_json(
        &format!("{}rs80357906", VEP_GRCH38),
        VEP_QUERY,
        200,
        &fixture("vep_rs80357906.json"),
    );
    let resolver = Resolver::new(&mock, &store, EndpointConfig::default());

    let outcome = resolver
        .resolve(
            &ResolveRequest::new("rs80357906", Assembly::GRCh38)
                .with_padding(Padding::new(100, 100)),
        )
        .unwrap();

    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!((record.start, record.end), (43057062, 43057063));
    assert_eq!(record.accession, "NM_007294.4");
    assert_eq!(record.rsid.as_deref(), Some("rs80357906"));
    assert_eq!(record.source, RecordSource::Variant);
    // Variant lookups never touch the transcript cache
    assert_eq!(store.counts().unwrap().transcripts, 0);
}

#[test]
fn test_output_order_and_skips() {
    let mock = MockTransport::new();
    let store = SqliteStore::in_memory().unwrap();
    mock_tark(&mock, "BRCA1", "tark_brca1.json");
    mock.respond_json(TARK_SEARCH, &tark_query("NOSUCHGENE"), 200, "[]");
    mock.respond_json(
        &format!("{}rs80357906", VEP_GRCH38),
        VEP_QUERY,
        200,
        &fixture("vep_rs80357906.json"),
    );
    let resolver = Resolver::new(&mock, &store, EndpointConfig::default());

    let request = ResolveRequest::new("NOSUCHGENE,rs80357906\nBRCA1 rs999", Assembly::GRCh38)
        .with_coordinates("chr2:100-200");
    let outcome = resolver.resolve(&request).unwrap();

    let sources: Vec<RecordSource> = outcome.records.iter().map(|r| r.source).collect();
    assert_eq!(
        sources,
        vec![
            RecordSource::Coordinate,
            RecordSource::Variant,
            RecordSource::Remote,
            RecordSource::Remote,
            RecordSource::Remote,
        ]
    );
    assert_eq!(outcome.records[0].region, "2");

    assert_eq!(outcome.skipped.len(), 2);
    assert_eq!(outcome.skipped[0].identifier, "NOSUCHGENE");
    assert_eq!(outcome.skipped[0].reason, SkipReason::NoData);
    assert_eq!(outcome.skipped[1].identifier, "rs999");
    assert!(matches!(outcome.skipped[1].reason, SkipReason::Failed(_)));
}

#[test]
fn test_write_through_is_idempotent() {
    let store = SqliteStore::in_memory().unwrap();
    let results: Vec<TarkTranscript> =
        serde_json::from_str(&fixture("tark_brca1.json")).unwrap();
    let bundles: Vec<_> = results.iter().filter_map(|t| t.to_bundle()).collect();

    let first = store.write_bundles(&bundles).unwrap();
    let counts = store.counts().unwrap();
    let second = store.write_bundles(&bundles).unwrap();

    assert_eq!(first.transcripts, 4);
    assert_eq!(second.total(), 0);
    assert_eq!(store.counts().unwrap(), counts);
}

#[test]
fn test_retries_transient_upstream_errors() {
    let mock = MockTransport::new();
    let store = SqliteStore::in_memory().unwrap();
    mock.respond_json(TARK_SEARCH, &tark_query("BRCA1"), 503, "");
    mock_tark(&mock, "BRCA1", "tark_brca1.json");
    let transport = RetryingTransport::new(&mock, RetryPolicy::immediate(2));
    let resolver = Resolver::new(&transport, &store, EndpointConfig::default());

    let outcome = resolver
        .resolve(&ResolveRequest::new("BRCA1", Assembly::GRCh38))
        .unwrap();

    assert_eq!(outcome.records.len(), 3);
    assert_eq!(mock.request_count(), 2);
    assert_eq!(transport.stats().retries, 1);
}

#[test]
fn test_shared_handles_and_persistent_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.sqlite3");

    {
        let mock = Arc::new(MockTransport::new());
        mock_tark(&mock, "BRCA1", "tark_brca1.json");
        let transport: SharedTransport = mock.clone();
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let resolver = Resolver::new(transport, Arc::clone(&store), EndpointConfig::default());
        resolver
            .resolve(&ResolveRequest::new("BRCA1", Assembly::GRCh38))
            .unwrap();
        assert_eq!(mock.request_count(), 1);
    }

    // A fresh process with no upstream still resolves from disk
    let mock = MockTransport::new();
    let store = SqliteStore::open(&path).unwrap();
    let resolver = Resolver::new(&mock, &store, EndpointConfig::default());
    let outcome = resolver
        .resolve(&ResolveRequest::new("BRCA1", Assembly::GRCh38))
        .unwrap();

    assert_eq!(outcome.records.len(), 3);
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn test_repeat_lookup_prefers_refseq_gene_over_ensembl() {
    let mock = MockTransport::new();
    let store = SqliteStore::in_memory().unwrap();
    mock_tark(&mock, "BRCA1", "tark_mixed_sources.json");
    let resolver = Resolver::new(&mock, &store, EndpointConfig::default());
    let request = ResolveRequest::new("BRCA1", Assembly::GRCh38);

    let first = resolver.resolve(&request).unwrap();
    let second = resolver.resolve(&request).unwrap();
    assert_eq!(mock.count_matching(TARK_SEARCH), 1);

    let labels = |records: &[ferro_bed::RegionRecord]| -> Vec<(String, Option<String>)> {
        records
            .iter()
            .map(|r| (r.accession.clone(), r.entrez_id.clone()))
            .collect()
    };
    assert_eq!(labels(&first.records), labels(&second.records));
    assert_eq!(second.records.len(), 2);
    for record in &second.records {
        assert_eq!(record.accession, "NM_007294.4");
        assert_eq!(record.entrez_id.as_deref(), Some("672"));
        assert_eq!(record.source, RecordSource::Cache);
    }
}

#[test]
fn test_cached_exons_without_location_fall_back_to_search() {
    let mock = MockTransport::new();
    let store = SqliteStore::in_memory().unwrap();
    mock_tark(&mock, "BRCA2", "tark_unlocated_exons.json");
    let resolver = Resolver::new(&mock, &store, EndpointConfig::default());
    let request = ResolveRequest::new("BRCA2", Assembly::GRCh38);

    for expected_searches in 1..=2 {
        let outcome = resolver.resolve(&request).unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.skipped.len(), 1);
        assert!(matches!(
            outcome.skipped[0].reason,
            SkipReason::Failed(BedError::MalformedResponse { .. })
        ));
        assert_eq!(mock.count_matching(TARK_SEARCH), expected_searches);
    }
    assert_eq!(store.counts().unwrap().exons, 2);
}
