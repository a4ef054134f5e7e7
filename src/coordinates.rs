//! Literal coordinate validation.
//!
//! Accepts `[chr]<chromosome>:<start>-<end>` where the chromosome is one of
//! `1`..`23` and the `chr` prefix is optional and case-insensitive.
//!
//! X, Y and mitochondrial contigs are not accepted by this pattern. This is a
//! known limitation of the region form, not an oversight in parsing.
//!
//! # Example
//!
//! ```
//! use ferro_bed::coordinates::{parse_coordinates, validate_coordinates};
//!
//! assert!(validate_coordinates("chr1:200-300").is_ok());
//! let region = parse_coordinates("CHR7:117559590-117559600").unwrap();
//! assert_eq!(region.chromosome, "7");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::BedError;
use crate::region::RegionRecord;

static COORDINATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    // Pattern: optional chr prefix, chromosome 1-23, colon, start-end
    Regex::new(r"^(?i:chr)?([1-9]|1[0-9]|2[0-3]):(\d+)-(\d+)$").unwrap()
});

/// A validated literal region, chromosome stored without the `chr` prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomicRegion {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
}

impl GenomicRegion {
    /// Convert into the output record form, tagged as a custom region.
    ///
    /// No padding is applied to literal regions.
    pub fn into_record(self) -> RegionRecord {
        RegionRecord::custom(self.chromosome, self.start, self.end)
    }
}

/// Validate a coordinate string without keeping the parsed value.
pub fn validate_coordinates(input: &str) -> Result<(), BedError> {
    parse_coordinates(input).map(|_| ())
}

/// Parse and validate a coordinate string.
///
/// Fails with a format error if the pattern does not match (including
/// positions too large to represent) and with a range error if
/// `start >= end`.
pub fn parse_coordinates(input: &str) -> Result<GenomicRegion, BedError> {
    let trimmed = input.trim();
    let caps = COORDINATE_PATTERN
        .captures(trimmed)
        .ok_or_else(|| BedError::coordinate_format(trimmed))?;

    let start: u64 = caps[2]
        .parse()
        .map_err(|_| BedError::coordinate_format(trimmed))?;
    let end: u64 = caps[3]
        .parse()
        .map_err(|_| BedError::coordinate_format(trimmed))?;

    if start >= end {
        return Err(BedError::coordinate_range(trimmed));
    }

    Ok(GenomicRegion {
        chromosome: caps[1].to_string(),
        start,
        end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_valid_coordinates() {
        assert!(validate_coordinates("1:200-300").is_ok());
        assert!(validate_coordinates("chr23:0-1").is_ok());
        assert!(validate_coordinates("Chr10:5-6").is_ok());
    }

    #[test]
    fn test_chromosome_out_of_range() {
        let err = validate_coordinates("25:1-2").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidCoordinateFormat);
        assert!(validate_coordinates("0:1-2").is_err());
        assert!(validate_coordinates("24:1-2").is_err());
    }

    #[test]
    fn test_sex_and_mito_rejected() {
        for input in ["X:1-2", "chrY:1-2", "MT:1-2", "chrM:1-2"] {
            let err = validate_coordinates(input).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidCoordinateFormat, "{}", input);
        }
    }

    #[test]
    fn test_start_not_less_than_end() {
        let err = validate_coordinates("1:300-200").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidCoordinateRange);
        assert!(err.to_string().contains("start must be less than end"));

        let err = validate_coordinates("1:300-300").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidCoordinateRange);
    }

    #[test]
    fn test_malformed() {
        for input in ["", "1", "1:100", "1:-5-10", "1:a-b", "chr1 100 200", "1:100-200x"] {
            assert!(validate_coordinates(input).is_err(), "{}", input);
        }
    }

    #[test]
    fn test_overflowing_position_is_format_error() {
        let err = validate_coordinates("1:1-99999999999999999999999").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidCoordinateFormat);
    }

    #[test]
    fn test_parse_strips_prefix() {
        let region = parse_coordinates("  chr17:43044295-43125483 ").unwrap();
        assert_eq!(
            region,
            GenomicRegion {
                chromosome: "17".to_string(),
                start: 43044295,
                end: 43125483,
            }
        );
    }

    #[test]
    fn test_into_record_is_custom() {
        let record = parse_coordinates("2:10-20").unwrap().into_record();
        assert_eq!(record.region, "2");
        assert_eq!(record.accession, "custom");
        assert_eq!(record.gene, "custom");
        assert_eq!(record.entrez_id.as_deref(), Some("custom"));
    }
}
