//! Request-level resolution: coordinates, rsIDs and genes into one ordered
//! record list.

use std::fmt;

use serde::Serialize;

use crate::assembly::Assembly;
use crate::config::EndpointConfig;
use crate::coordinates::parse_coordinates;
use crate::error::BedError;
use crate::http::Transport;
use crate::identifier::{split_coordinates, split_identifiers, Identifier};
use crate::region::{Padding, RegionRecord};
use crate::store::RegionStore;
use crate::tark::TranscriptResolver;
use crate::vep::VariantResolver;

/// One resolution request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveRequest {
    /// Comma/whitespace separated gene symbols, accessions and rsIDs
    pub identifiers: String,
    /// Newline separated `[chr]N:start-end` regions
    pub coordinates: String,
    pub assembly: Assembly,
    /// Applied to transcript-derived records only
    pub padding: Padding,
}

impl ResolveRequest {
    pub fn new(identifiers: impl Into<String>, assembly: Assembly) -> Self {
        Self {
            identifiers: identifiers.into(),
            assembly,
            ..Default::default()
        }
    }

    pub fn with_coordinates(mut self, coordinates: impl Into<String>) -> Self {
        self.coordinates = coordinates.into();
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }
}

/// Why an identifier contributed no records
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The upstream answered but knew nothing usable
    NoData,
    /// Lookup failed
    Failed(BedError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData => write!(f, "no data"),
            SkipReason::Failed(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub identifier: String,
    pub reason: SkipReason,
}

/// Records in request order plus the identifiers that yielded nothing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveOutcome {
    pub records: Vec<RegionRecord>,
    pub skipped: Vec<Skipped>,
}

/// Summary line for logs and the CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolveSummary {
    pub records: usize,
    pub skipped: usize,
}

impl ResolveOutcome {
    pub fn summary(&self) -> ResolveSummary {
        ResolveSummary {
            records: self.records.len(),
            skipped: self.skipped.len(),
        }
    }
}

/// Composes the coordinate parser and both resolvers
#[derive(Debug, Clone)]
pub struct Resolver<T, S> {
    variants: VariantResolver<T>,
    transcripts: TranscriptResolver<T, S>,
}

impl<T: Transport + Clone, S: RegionStore> Resolver<T, S> {
    pub fn new(transport: T, store: S, endpoints: EndpointConfig) -> Self {
        Self {
            variants: VariantResolver::new(transport.clone(), endpoints.clone()),
            transcripts: TranscriptResolver::new(transport, store, endpoints),
        }
    }

    pub fn variants(&self) -> &VariantResolver<T> {
        &self.variants
    }

    pub fn transcripts(&self) -> &TranscriptResolver<T, S> {
        &self.transcripts
    }

    /// Resolve a request.
    ///
    /// Output order: coordinate records in line order, then each identifier's
    /// records in input order. Every coordinate line is validated before any
    /// lookup, and a malformed line fails the whole request. Identifiers
    /// that resolve to nothing, or whose lookup fails, are logged, recorded
    /// in [`ResolveOutcome::skipped`] and do not stop the request.
    ///
    /// Padding applies to transcript-derived records only; coordinate and
    /// rsID records keep their raw bounds.
    pub fn resolve(&self, request: &ResolveRequest) -> Result<ResolveOutcome, BedError> {
        let regions = split_coordinates(&request.coordinates)
            .into_iter()
            .map(parse_coordinates)
            .collect::<Result<Vec<_>, _>>()?;

        let mut outcome = ResolveOutcome {
            records: regions.into_iter().map(|r| r.into_record()).collect(),
            skipped: Vec::new(),
        };

        for identifier in split_identifiers(&request.identifiers) {
            let result = match &identifier {
                Identifier::RsId(rsid) => self
                    .variants
                    .resolve_variant(rsid, request.assembly)
                    .map(|record| record.into_iter().collect::<Vec<_>>()),
                Identifier::Gene(name) => self
                    .transcripts
                    .resolve_identifier(name, request.assembly)
                    .map(|records| {
                        records
                            .into_iter()
                            .map(|r| r.padded(request.padding))
                            .collect()
                    }),
            };

            let reason = match result {
                Ok(records) if !records.is_empty() => {
                    outcome.records.extend(records);
                    continue;
                }
                Ok(_) => SkipReason::NoData,
                Err(e) => SkipReason::Failed(e),
            };
            tracing::warn!("Skipping {}: {}", identifier, reason);
            outcome.skipped.push(Skipped {
                identifier: identifier.as_str().to_string(),
                reason,
            });
        }

        tracing::info!(
            "Resolved {} records ({} identifiers skipped)",
            outcome.records.len(),
            outcome.skipped.len()
        );
        Ok(outcome)
    }
}
