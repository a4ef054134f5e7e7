//! Identifier classification.
//!
//! Splits free-text identifier input into tokens and routes each token to
//! the resolver that understands it.
//!
//! # Example
//!
//! ```
//! use ferro_bed::identifier::{split_identifiers, Identifier};
//!
//! let ids = split_identifiers("BRCA1, rs80357906\nNM_000546.6");
//! assert_eq!(ids[0], Identifier::Gene("BRCA1".to_string()));
//! assert_eq!(ids[1], Identifier::RsId("rs80357906".to_string()));
//! ```

use std::fmt;

/// A classified input token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// dbSNP reference SNP identifier (`rs...`)
    RsId(String),
    /// Gene symbol or transcript accession
    Gene(String),
}

impl Identifier {
    /// Classify a single token.
    ///
    /// The `rs` prefix check is case-sensitive: `RS123` is treated as a gene
    /// identifier.
    pub fn classify(token: &str) -> Self {
        if token.starts_with("rs") {
            Identifier::RsId(token.to_string())
        } else {
            Identifier::Gene(token.to_string())
        }
    }

    /// The token as typed
    pub fn as_str(&self) -> &str {
        match self {
            Identifier::RsId(s) | Identifier::Gene(s) => s,
        }
    }

    pub fn is_rsid(&self) -> bool {
        matches!(self, Identifier::RsId(_))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split identifier text on commas and whitespace, preserving input order.
pub fn split_identifiers(text: &str) -> Vec<Identifier> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(Identifier::classify)
        .collect()
}

/// Split coordinate text into one trimmed entry per non-blank line.
pub fn split_coordinates(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert!(Identifier::classify("rs121913529").is_rsid());
        assert!(!Identifier::classify("BRCA2").is_rsid());
        assert!(!Identifier::classify("RS121913529").is_rsid());
        assert!(!Identifier::classify("NM_000059.4").is_rsid());
    }

    #[test]
    fn test_split_mixed_separators() {
        let ids = split_identifiers(" BRCA1,BRCA2\n\trs1042522 ,, TP53 ");
        let tokens: Vec<&str> = ids.iter().map(Identifier::as_str).collect();
        assert_eq!(tokens, vec!["BRCA1", "BRCA2", "rs1042522", "TP53"]);
        assert!(ids[2].is_rsid());
    }

    #[test]
    fn test_split_empty() {
        assert!(split_identifiers("").is_empty());
        assert!(split_identifiers(" , \n ").is_empty());
    }

    #[test]
    fn test_split_coordinates() {
        let lines = split_coordinates("chr1:100-200\n\n  2:5-10  \r\n");
        assert_eq!(lines, vec!["chr1:100-200", "2:5-10"]);
    }
}
