//! Response shapes of the variant annotation (VEP) endpoint.

use serde::Deserialize;

use crate::json;

/// One annotation object from `/vep/human/id/{rsid}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VepAnnotation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "json::opt_string")]
    pub seq_region_name: Option<String>,
    #[serde(default)]
    pub start: Option<u64>,
    #[serde(default)]
    pub end: Option<u64>,
    #[serde(default)]
    pub transcript_consequences: Vec<TranscriptConsequence>,
}

/// Per-transcript consequence entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptConsequence {
    #[serde(default)]
    pub transcript_id: Option<String>,
    #[serde(default, deserialize_with = "json::flag")]
    pub canonical: bool,
    #[serde(default, deserialize_with = "json::opt_string")]
    pub gene_id: Option<String>,
    #[serde(default)]
    pub gene_symbol: Option<String>,
}

impl TranscriptConsequence {
    /// Canonical RefSeq NM_ transcript
    pub fn is_canonical_refseq(&self) -> bool {
        self.canonical
            && self
                .transcript_id
                .as_deref()
                .is_some_and(|id| id.starts_with("NM"))
    }
}
