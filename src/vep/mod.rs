//! Variant resolution through the Ensembl VEP REST endpoint.
//!
//! An rsID resolves to the genomic span reported by VEP, labelled with the
//! first canonical RefSeq (`NM_`) transcript consequence in response order.
//! Variant-derived records are never padded.

mod types;

pub use types::{TranscriptConsequence, VepAnnotation};

use crate::assembly::Assembly;
use crate::config::EndpointConfig;
use crate::error::BedError;
use crate::http::{get_json, Transport};
use crate::region::{RecordSource, RegionRecord};

const SERVICE: &str = "VEP";

/// Pick the annotation/consequence pair used to label a variant.
///
/// Annotations are scanned in response order and, within each, consequences
/// in response order; the first consequence that is canonical and whose
/// transcript id starts with `NM` wins. No other ranking is applied, so the
/// result depends on the order the service returns.
pub fn select_canonical_refseq(
    annotations: &[VepAnnotation],
) -> Option<(&VepAnnotation, &TranscriptConsequence)> {
    annotations.iter().find_map(|annotation| {
        annotation
            .transcript_consequences
            .iter()
            .find(|c| c.is_canonical_refseq())
            .map(|c| (annotation, c))
    })
}

/// Resolves rsIDs to region records
#[derive(Debug, Clone)]
pub struct VariantResolver<T> {
    transport: T,
    endpoints: EndpointConfig,
}

impl<T: Transport> VariantResolver<T> {
    pub fn new(transport: T, endpoints: EndpointConfig) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Endpoint URL for an rsID in an assembly
    pub fn url(&self, rsid: &str, assembly: Assembly) -> String {
        format!(
            "{}/vep/human/id/{}",
            self.endpoints.vep_base(assembly).trim_end_matches('/'),
            urlencoding::encode(rsid)
        )
    }

    /// Resolve one rsID.
    ///
    /// Returns `Ok(None)` when the service answered but has no canonical
    /// RefSeq consequence for the variant, and `Err` when the request or the
    /// payload failed. A single request is made; retries are the
    /// transport's concern.
    pub fn resolve_variant(
        &self,
        rsid: &str,
        assembly: Assembly,
    ) -> Result<Option<RegionRecord>, BedError> {
        let url = self.url(rsid, assembly);
        let annotations: Vec<VepAnnotation> = get_json(
            &self.transport,
            SERVICE,
            &url,
            &[
                ("refseq", "true"),
                ("canonical", "true"),
                ("content-type", "application/json"),
            ],
        )?;

        if annotations.is_empty() {
            tracing::info!("No data found for rsID {}", rsid);
            return Ok(None);
        }

        let Some((annotation, consequence)) = select_canonical_refseq(&annotations) else {
            tracing::info!("No canonical RefSeq transcript for rsID {}", rsid);
            return Ok(None);
        };

        let malformed = |field: &str| BedError::MalformedResponse {
            service: SERVICE.to_string(),
            msg: format!("annotation for {} has no {}", rsid, field),
        };

        let record = RegionRecord {
            region: annotation
                .seq_region_name
                .clone()
                .ok_or_else(|| malformed("seq_region_name"))?,
            start: annotation.start.ok_or_else(|| malformed("start"))?,
            end: annotation.end.ok_or_else(|| malformed("end"))?,
            accession: consequence
                .transcript_id
                .clone()
                .ok_or_else(|| malformed("transcript_id"))?,
            gene: consequence
                .gene_symbol
                .clone()
                .ok_or_else(|| malformed("gene_symbol"))?,
            entrez_id: consequence.gene_id.clone(),
            rsid: Some(rsid.to_string()),
            exon: None,
            source: RecordSource::Variant,
        };

        tracing::debug!(
            "Resolved {} to {}:{}-{} ({})",
            rsid,
            record.region,
            record.start,
            record.end,
            record.accession
        );
        Ok(Some(record))
    }
}
