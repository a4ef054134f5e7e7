//! Response shapes of the Tark transcript search endpoint.

use serde::Deserialize;

use crate::json;
use crate::store::{
    ExonRow, GeneRow, Location, ReleaseSetRow, StableKey, TranscriptBundle, TranscriptRow, Utr,
};

/// One transcript from `/transcript/search/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TarkTranscript {
    #[serde(default)]
    pub stable_id: Option<String>,
    #[serde(default, deserialize_with = "json::opt_u32")]
    pub stable_id_version: Option<u32>,
    #[serde(default)]
    pub assembly: Option<String>,
    #[serde(flatten)]
    pub location: TarkLocation,
    #[serde(default)]
    pub biotype: Option<String>,
    #[serde(default)]
    pub transcript_checksum: Option<String>,
    #[serde(default)]
    pub sequence: Option<String>,
    #[serde(default)]
    pub five_prime_utr_start: Option<u64>,
    #[serde(default)]
    pub five_prime_utr_end: Option<u64>,
    #[serde(default)]
    pub five_prime_utr_seq: Option<String>,
    #[serde(default)]
    pub three_prime_utr_start: Option<u64>,
    #[serde(default)]
    pub three_prime_utr_end: Option<u64>,
    #[serde(default)]
    pub three_prime_utr_seq: Option<String>,
    #[serde(default)]
    pub mane_transcript: Option<String>,
    #[serde(default)]
    pub mane_transcript_type: Option<String>,
    #[serde(default)]
    pub genes: Vec<TarkGene>,
    #[serde(default)]
    pub exons: Vec<TarkExon>,
    #[serde(default)]
    pub transcript_release_set: Vec<TarkReleaseSet>,
}

/// `loc_*` fields shared by transcripts, genes and exons
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TarkLocation {
    #[serde(default, deserialize_with = "json::opt_string")]
    pub loc_region: Option<String>,
    #[serde(default)]
    pub loc_start: Option<u64>,
    #[serde(default)]
    pub loc_end: Option<u64>,
    #[serde(default)]
    pub loc_strand: Option<i8>,
    #[serde(default)]
    pub loc_checksum: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TarkGene {
    /// Entrez id for RefSeq genes
    #[serde(default, deserialize_with = "json::opt_string")]
    pub stable_id: Option<String>,
    #[serde(default, deserialize_with = "json::opt_u32")]
    pub stable_id_version: Option<u32>,
    #[serde(default)]
    pub assembly: Option<String>,
    #[serde(flatten)]
    pub location: TarkLocation,
    #[serde(default)]
    pub gene_checksum: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TarkExon {
    #[serde(default)]
    pub exon_id: Option<i64>,
    #[serde(default)]
    pub stable_id: Option<String>,
    #[serde(default, deserialize_with = "json::opt_u32")]
    pub stable_id_version: Option<u32>,
    #[serde(flatten)]
    pub location: TarkLocation,
    #[serde(default)]
    pub exon_checksum: Option<String>,
    #[serde(default, deserialize_with = "json::opt_u32")]
    pub exon_order: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TarkReleaseSet {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub shortname: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl From<&TarkLocation> for Location {
    fn from(loc: &TarkLocation) -> Self {
        Location {
            region: loc.loc_region.clone(),
            start: loc.loc_start,
            end: loc.loc_end,
            strand: loc.loc_strand,
            checksum: loc.loc_checksum.clone(),
        }
    }
}

impl TarkTranscript {
    /// `stable_id.version`, when both are present
    pub fn accession(&self) -> Option<String> {
        Some(format!(
            "{}.{}",
            self.stable_id.as_deref()?,
            self.stable_id_version?
        ))
    }

    /// Cache key, when the payload carries enough identity to build one
    pub fn key(&self) -> Option<StableKey> {
        Some(StableKey {
            stable_id: self.stable_id.clone()?,
            stable_id_version: self.stable_id_version?,
            assembly: self.assembly.clone()?,
        })
    }

    /// First gene's id, reported as the Entrez id of derived records
    pub fn entrez_id(&self) -> Option<String> {
        self.genes.first().and_then(|g| g.stable_id.clone())
    }

    /// Rows this transcript contributes to the cache.
    ///
    /// Returns `None` for transcripts without a complete key. Genes without
    /// an id or version are dropped, as are exons without an `exon_id`; an
    /// exon without `exon_order` takes its 1-based payload position.
    pub fn to_bundle(&self) -> Option<TranscriptBundle> {
        let key = self.key()?;

        let genes: Vec<GeneRow> = self
            .genes
            .iter()
            .filter_map(|gene| {
                Some(GeneRow {
                    key: StableKey {
                        stable_id: gene.stable_id.clone()?,
                        stable_id_version: gene.stable_id_version?,
                        assembly: gene.assembly.clone().unwrap_or_else(|| key.assembly.clone()),
                    },
                    location: Location::from(&gene.location),
                    checksum: gene.gene_checksum.clone(),
                    name: gene.name.clone(),
                })
            })
            .collect();

        let transcript = TranscriptRow {
            key: key.clone(),
            location: Location::from(&self.location),
            biotype: self.biotype.clone(),
            checksum: self.transcript_checksum.clone(),
            sequence: self.sequence.clone(),
            five_prime_utr: Utr {
                start: self.five_prime_utr_start,
                end: self.five_prime_utr_end,
                sequence: self.five_prime_utr_seq.clone(),
            },
            three_prime_utr: Utr {
                start: self.three_prime_utr_start,
                end: self.three_prime_utr_end,
                sequence: self.three_prime_utr_seq.clone(),
            },
            mane_transcript: self.mane_transcript.clone(),
            mane_transcript_type: self.mane_transcript_type.clone(),
            gene: genes.first().map(|g| g.key.clone()),
        };

        let exons = self
            .exons
            .iter()
            .enumerate()
            .filter_map(|(i, exon)| {
                Some(ExonRow {
                    exon_id: exon.exon_id?,
                    stable_id: exon.stable_id.clone(),
                    stable_id_version: exon.stable_id_version,
                    location: Location::from(&exon.location),
                    checksum: exon.exon_checksum.clone(),
                    exon_order: exon.exon_order.unwrap_or(i as u32 + 1),
                    transcript: key.clone(),
                })
            })
            .collect();

        let release_sets = self
            .transcript_release_set
            .iter()
            .filter_map(|rs| {
                Some(ReleaseSetRow {
                    transcript: key.clone(),
                    source: rs.source.clone()?,
                    shortname: rs.shortname.clone()?,
                    description: rs.description.clone(),
                    release_date: rs.release_date.clone(),
                })
            })
            .collect();

        Some(TranscriptBundle {
            transcript,
            genes,
            exons,
            release_sets,
        })
    }
}
