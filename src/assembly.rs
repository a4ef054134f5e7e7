//! Reference assembly selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BedError;

/// Reference genome assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Assembly {
    /// GRCh37 / hg19
    GRCh37,
    /// GRCh38 / hg38
    #[default]
    GRCh38,
}

impl Assembly {
    /// Name as used by the upstream services (`"GRCh37"` / `"GRCh38"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Assembly::GRCh37 => "GRCh37",
            Assembly::GRCh38 => "GRCh38",
        }
    }

    /// All supported assemblies
    pub fn all() -> [Assembly; 2] {
        [Assembly::GRCh37, Assembly::GRCh38]
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Assembly {
    type Err = BedError;

    /// Only the exact upstream spellings are accepted; aliases such as
    /// `hg19` are rejected like any other unknown value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "GRCh37" => Ok(Assembly::GRCh37),
            "GRCh38" => Ok(Assembly::GRCh38),
            other => Err(BedError::InvalidAssembly {
                value: other.to_string(),
            }),
        }
    }
}
