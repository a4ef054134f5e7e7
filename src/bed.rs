//! Export of resolved records.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BedError;
use crate::region::RegionRecord;

/// Written in place of an absent Entrez id
pub const MISSING: &str = ".";

/// Output format for resolved records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `chrom start end gene|accession|entrez`
    #[default]
    Bed,
    /// Tab-separated with a header row
    Tsv,
    /// JSON array of records
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Bed => write!(f, "bed"),
            OutputFormat::Tsv => write!(f, "tsv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bed" => Ok(OutputFormat::Bed),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown output format: {} (expected bed, tsv or json)", s)),
        }
    }
}

/// BED name column
pub fn bed_name(record: &RegionRecord) -> String {
    format!(
        "{}|{}|{}",
        record.gene,
        record.accession,
        record.entrez_id.as_deref().unwrap_or(MISSING)
    )
}

pub fn write_bed<W: Write>(out: &mut W, records: &[RegionRecord]) -> Result<(), BedError> {
    for r in records {
        writeln!(out, "{}\t{}\t{}\t{}", r.region, r.start, r.end, bed_name(r))?;
    }
    Ok(())
}

pub fn write_tsv<W: Write>(out: &mut W, records: &[RegionRecord]) -> Result<(), BedError> {
    writeln!(
        out,
        "region\tstart\tend\taccession\tgene\tentrez_id\trsid\texon_order\tsource"
    )?;
    for r in records {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            r.region,
            r.start,
            r.end,
            r.accession,
            r.gene,
            r.entrez_id.as_deref().unwrap_or(MISSING),
            r.rsid.as_deref().unwrap_or(MISSING),
            r.exon
                .as_ref()
                .map_or_else(|| MISSING.to_string(), |e| e.exon_order.to_string()),
            r.source
        )?;
    }
    Ok(())
}

pub fn write_json<W: Write>(out: &mut W, records: &[RegionRecord]) -> Result<(), BedError> {
    serde_json::to_writer_pretty(&mut *out, records)?;
    writeln!(out)?;
    Ok(())
}

/// Write records in the requested format
pub fn write_records<W: Write>(
    out: &mut W,
    records: &[RegionRecord],
    format: OutputFormat,
) -> Result<(), BedError> {
    match format {
        OutputFormat::Bed => write_bed(out, records),
        OutputFormat::Tsv => write_tsv(out, records),
        OutputFormat::Json => write_json(out, records),
    }
}
