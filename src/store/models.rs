//! Row types persisted by the region cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assembly::Assembly;

/// `mane_transcript_type` value marking the canonical transcript
pub const MANE_SELECT: &str = "MANE SELECT";

/// Versioned identity of a gene or transcript within one assembly
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StableKey {
    pub stable_id: String,
    pub stable_id_version: u32,
    pub assembly: String,
}

impl StableKey {
    pub fn new(stable_id: impl Into<String>, stable_id_version: u32, assembly: Assembly) -> Self {
        Self {
            stable_id: stable_id.into(),
            stable_id_version,
            assembly: assembly.as_str().to_string(),
        }
    }

    /// Dotted `stable_id.version` form
    pub fn accession(&self) -> String {
        format!("{}.{}", self.stable_id, self.stable_id_version)
    }
}

/// Genomic location shared by genes, transcripts and exons
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub region: Option<String>,
    pub start: Option<u64>,
    pub end: Option<u64>,
    pub strand: Option<i8>,
    pub checksum: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneRow {
    pub key: StableKey,
    pub location: Location,
    pub checksum: Option<String>,
    /// Display name (gene symbol)
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utr {
    pub start: Option<u64>,
    pub end: Option<u64>,
    pub sequence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRow {
    pub key: StableKey,
    pub location: Location,
    pub biotype: Option<String>,
    pub checksum: Option<String>,
    pub sequence: Option<String>,
    pub five_prime_utr: Utr,
    pub three_prime_utr: Utr,
    pub mane_transcript: Option<String>,
    pub mane_transcript_type: Option<String>,
    /// Owning gene
    pub gene: Option<StableKey>,
}

impl TranscriptRow {
    pub fn is_mane_select(&self) -> bool {
        self.mane_transcript_type.as_deref() == Some(MANE_SELECT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExonRow {
    /// Upstream-assigned numeric id
    pub exon_id: i64,
    pub stable_id: Option<String>,
    pub stable_id_version: Option<u32>,
    pub location: Location,
    pub checksum: Option<String>,
    /// 1-based position within the owning transcript
    pub exon_order: u32,
    pub transcript: StableKey,
}

impl ExonRow {
    pub fn accession(&self) -> Option<String> {
        match (&self.stable_id, self.stable_id_version) {
            (Some(id), Some(version)) => Some(format!("{}.{}", id, version)),
            (Some(id), None) => Some(id.clone()),
            _ => None,
        }
    }
}

/// Release the transcript was observed in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSetRow {
    pub transcript: StableKey,
    pub source: String,
    pub shortname: String,
    pub description: Option<String>,
    pub release_date: Option<String>,
}

/// Everything one transcript-search result contributes to the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptBundle {
    pub transcript: TranscriptRow,
    pub genes: Vec<GeneRow>,
    pub exons: Vec<ExonRow>,
    pub release_sets: Vec<ReleaseSetRow>,
}

/// Rows actually inserted by a write-through (ignored duplicates excluded)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub genes: usize,
    pub transcripts: usize,
    pub exons: usize,
    pub release_sets: usize,
}

impl WriteSummary {
    pub fn total(&self) -> usize {
        self.genes + self.transcripts + self.exons + self.release_sets
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelRow {
    pub panel_id: u64,
    pub name: String,
    pub disease_group: Option<String>,
    pub disease_sub_group: Option<String>,
    pub version: Option<String>,
    pub version_created: Option<String>,
    pub relevant_disorders: Vec<String>,
    pub last_refreshed: DateTime<Utc>,
}

impl PanelRow {
    pub fn display_name(&self) -> String {
        panel_display_name(&self.name, &self.relevant_disorders)
    }
}

/// `"<R-code> - <name>"` when the last relevant disorder is an R code,
/// otherwise the bare name
pub fn panel_display_name(name: &str, relevant_disorders: &[String]) -> String {
    match relevant_disorders.last() {
        Some(code) if code.contains('R') => format!("{} - {}", code, name),
        _ => name.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelGeneRow {
    pub panel_id: u64,
    pub gene_symbol: String,
    /// "1" red, "2" amber, "3" green
    pub confidence_level: String,
}

/// Full panel snapshot written by a refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelSnapshot {
    pub panels: Vec<PanelRow>,
    pub genes: Vec<PanelGeneRow>,
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub genes: usize,
    pub transcripts: usize,
    pub exons: usize,
    pub release_sets: usize,
    pub panels: usize,
    pub panel_genes: usize,
}
