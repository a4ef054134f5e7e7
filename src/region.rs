//! Output region records and padding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker used for every identity field of a literal coordinate region
pub const CUSTOM_MARKER: &str = "custom";

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Literal coordinate typed by the user
    Coordinate,
    /// Variant annotation service (rsID)
    Variant,
    /// Transcript rows already in the local cache
    Cache,
    /// Transcript search service
    Remote,
}

impl RecordSource {
    /// Snake-case name, as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSource::Coordinate => "coordinate",
            RecordSource::Variant => "variant",
            RecordSource::Cache => "cache",
            RecordSource::Remote => "remote",
        }
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Exon metadata carried by transcript-derived records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExonInfo {
    /// 1-based position of the exon within its transcript
    pub exon_order: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stable_id: Option<String>,
}

/// One resolved genomic interval.
///
/// Coordinates are passed through as delivered by the upstream service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecord {
    /// Chromosome / sequence region name, without a `chr` prefix
    pub region: String,
    pub start: u64,
    pub end: u64,
    /// Transcript accession (`stable_id.version`)
    pub accession: String,
    /// Gene label
    pub gene: String,
    /// Entrez / upstream gene id, absent when the service did not report one
    pub entrez_id: Option<String>,
    /// Originating rsID for variant-derived records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exon: Option<ExonInfo>,
    pub source: RecordSource,
}

impl RegionRecord {
    /// A literal region tagged with the custom marker
    pub fn custom(region: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            region: region.into(),
            start,
            end,
            accession: CUSTOM_MARKER.to_string(),
            gene: CUSTOM_MARKER.to_string(),
            entrez_id: Some(CUSTOM_MARKER.to_string()),
            rsid: None,
            exon: None,
            source: RecordSource::Coordinate,
        }
    }

    /// Apply 5'/3' padding in place.
    ///
    /// `start` is floored at zero. Padding is not strand-aware: the 5' value
    /// always moves `start` and the 3' value always moves `end`.
    pub fn pad(&mut self, padding: Padding) {
        self.start = self.start.saturating_sub(padding.five_prime);
        self.end = self.end.saturating_add(padding.three_prime);
    }

    /// Padded copy of this record
    pub fn padded(mut self, padding: Padding) -> Self {
        self.pad(padding);
        self
    }

    /// Length of the interval in bases
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Base-pair extension applied to gene-derived regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub five_prime: u64,
    pub three_prime: u64,
}

impl Padding {
    pub fn new(five_prime: u64, three_prime: u64) -> Self {
        Self {
            five_prime,
            three_prime,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.five_prime == 0 && self.three_prime == 0
    }
}
