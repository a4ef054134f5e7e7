//! Transcript resolution: local cache first, Tark transcript search second.
//!
//! A gene symbol or accession resolves to one [`RegionRecord`] per exon of
//! its canonical transcript. The cache is consulted first (gene by name,
//! then its MANE Select transcript, then exons by `exon_order`). On a miss
//! the identifier is searched remotely, the whole payload is written
//! through to the cache, and the exons of the selected RefSeq transcript
//! are returned in payload order.
//!
//! Records are returned unpadded.

mod types;

pub use types::{TarkExon, TarkGene, TarkLocation, TarkReleaseSet, TarkTranscript};

use crate::assembly::Assembly;
use crate::config::EndpointConfig;
use crate::error::BedError;
use crate::http::{get_json, Transport};
use crate::region::{ExonInfo, RecordSource, RegionRecord};
use crate::store::{RegionStore, TranscriptBundle};

const SERVICE: &str = "Tark";

/// Sub-resources requested with every search
pub const SEARCH_EXPAND: &str = "transcript_release_set,genes,exons";

/// Pick the RefSeq transcript to resolve to.
///
/// Candidates are results in `assembly` whose `stable_id` starts with `NM`
/// and that carry a version. The candidate with the greatest
/// `stable_id_version` wins; on equal versions the earliest in payload
/// order is kept, since a later candidate only replaces the current one
/// when its version is strictly greater.
pub fn select_refseq_transcript(
    results: &[TarkTranscript],
    assembly: Assembly,
) -> Option<&TarkTranscript> {
    let mut best: Option<(&TarkTranscript, u32)> = None;
    for item in results {
        if item.assembly.as_deref() != Some(assembly.as_str()) {
            continue;
        }
        if !item
            .stable_id
            .as_deref()
            .is_some_and(|id| id.starts_with("NM"))
        {
            continue;
        }
        let Some(version) = item.stable_id_version else {
            continue;
        };
        if best.map_or(true, |(_, best_version)| version > best_version) {
            best = Some((item, version));
        }
    }
    best.map(|(item, _)| item)
}

/// Resolves gene symbols and accessions to exon records
#[derive(Debug, Clone)]
pub struct TranscriptResolver<T, S> {
    transport: T,
    store: S,
    endpoints: EndpointConfig,
}

impl<T: Transport, S: RegionStore> TranscriptResolver<T, S> {
    pub fn new(transport: T, store: S, endpoints: EndpointConfig) -> Self {
        Self {
            transport,
            store,
            endpoints,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Search endpoint URL
    pub fn search_url(&self) -> String {
        format!(
            "{}/transcript/search/",
            self.endpoints.tark.trim_end_matches('/')
        )
    }

    /// Resolve one identifier to exon records.
    ///
    /// An empty vector means neither the cache nor the service knew a
    /// RefSeq transcript for it.
    pub fn resolve_identifier(
        &self,
        identifier: &str,
        assembly: Assembly,
    ) -> Result<Vec<RegionRecord>, BedError> {
        if let Some(records) = self.cached_records(identifier, assembly)? {
            tracing::debug!(
                "Cache hit for {} ({}): {} exons",
                identifier,
                assembly,
                records.len()
            );
            return Ok(records);
        }

        tracing::debug!("Cache miss for {} ({}), searching Tark", identifier, assembly);
        self.remote_records(identifier, assembly)
    }

    /// Cached MANE Select exons, or `None` when the cache cannot answer
    fn cached_records(
        &self,
        identifier: &str,
        assembly: Assembly,
    ) -> Result<Option<Vec<RegionRecord>>, BedError> {
        let Some(gene) = self.store.find_gene(identifier, assembly)? else {
            return Ok(None);
        };
        let Some(transcript) = self.store.find_mane_select(&gene.key)? else {
            tracing::debug!("{} is cached without a MANE Select transcript", identifier);
            return Ok(None);
        };
        let exons = self.store.exons_for(&transcript.key)?;
        if exons.is_empty() {
            return Ok(None);
        }

        let accession = transcript.key.accession();
        let label = gene.name.clone().unwrap_or_else(|| identifier.to_string());
        let mut records = Vec::with_capacity(exons.len());
        for exon in exons {
            let (Some(region), Some(start), Some(end)) =
                (exon.location.region.clone(), exon.location.start, exon.location.end)
            else {
                tracing::warn!(
                    "Cached exon {} of {} has no location, skipping",
                    exon.exon_id,
                    accession
                );
                continue;
            };
            records.push(RegionRecord {
                region,
                start,
                end,
                accession: accession.clone(),
                gene: label.clone(),
                entrez_id: Some(gene.key.stable_id.clone()),
                rsid: None,
                exon: Some(ExonInfo {
                    exon_order: exon.exon_order,
                    stable_id: exon.accession(),
                }),
                source: RecordSource::Cache,
            });
        }
        if records.is_empty() {
            return Ok(None);
        }
        Ok(Some(records))
    }

    /// Raw search results for an identifier
    pub fn search(&self, identifier: &str) -> Result<Vec<TarkTranscript>, BedError> {
        get_json(
            &self.transport,
            SERVICE,
            &self.search_url(),
            &[("identifier_field", identifier), ("expand", SEARCH_EXPAND)],
        )
    }

    fn remote_records(
        &self,
        identifier: &str,
        assembly: Assembly,
    ) -> Result<Vec<RegionRecord>, BedError> {
        let results = self.search(identifier)?;

        let bundles: Vec<TranscriptBundle> =
            results.iter().filter_map(TarkTranscript::to_bundle).collect();
        if !bundles.is_empty() {
            let summary = self.store.write_bundles(&bundles)?;
            tracing::debug!(
                "Cached {} new rows for {} ({} genes, {} transcripts, {} exons)",
                summary.total(),
                identifier,
                summary.genes,
                summary.transcripts,
                summary.exons
            );
        }

        let Some(selected) = select_refseq_transcript(&results, assembly) else {
            tracing::info!("No results found for {} in {}", identifier, assembly);
            return Ok(Vec::new());
        };

        let accession = selected.accession().unwrap_or_default();
        let entrez_id = selected.entrez_id();
        selected
            .exons
            .iter()
            .enumerate()
            .map(|(i, exon)| {
                let loc = &exon.location;
                let (Some(region), Some(start), Some(end)) =
                    (loc.loc_region.clone(), loc.loc_start, loc.loc_end)
                else {
                    return Err(BedError::MalformedResponse {
                        service: SERVICE.to_string(),
                        msg: format!("exon {} of {} has no location", i + 1, accession),
                    });
                };
                Ok(RegionRecord {
                    region,
                    start,
                    end,
                    accession: accession.clone(),
                    gene: identifier.to_string(),
                    entrez_id: entrez_id.clone(),
                    rsid: None,
                    exon: Some(ExonInfo {
                        exon_order: exon.exon_order.unwrap_or(i as u32 + 1),
                        stable_id: exon.stable_id.clone(),
                    }),
                    source: RecordSource::Remote,
                })
            })
            .collect()
    }
}
