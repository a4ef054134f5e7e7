// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-bed: genomic identifier resolution and BED region export
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! Gene symbols, RefSeq accessions, rsIDs and literal coordinates are
//! resolved into an ordered list of [`RegionRecord`]s. Transcript lookups
//! go through a local SQLite cache before the Tark transcript service;
//! rsIDs are resolved through Ensembl VEP; gene panels come from PanelApp.
//!
//! # Example
//!
//! ```
//! use ferro_bed::http::MockTransport;
//! use ferro_bed::store::SqliteStore;
//! use ferro_bed::{Assembly, EndpointConfig, Padding, ResolveRequest, Resolver};
//!
//! let transport = MockTransport::new();
//! let store = SqliteStore::in_memory().unwrap();
//! let resolver = Resolver::new(&transport, &store, EndpointConfig::default());
//!
//! let request = ResolveRequest::new("", Assembly::GRCh38)
//!     .with_coordinates("chr7:117480025-117480148")
//!     .with_padding(Padding::new(20, 20));
//! let outcome = resolver.resolve(&request).unwrap();
//! assert_eq!(outcome.records[0].region, "7");
//! ```

pub mod assembly;
pub mod bed;
pub mod config;
pub mod coordinates;
pub mod error;
pub mod http;
pub mod identifier;
pub mod json;
pub mod panelapp;
pub mod region;
pub mod resolve;
pub mod store;
pub mod tark;
pub mod vep;

// Re-export commonly used types
pub use assembly::Assembly;
pub use bed::{write_records, OutputFormat};
pub use config::{BedConfig, EndpointConfig, HttpConfig};
pub use coordinates::{parse_coordinates, validate_coordinates, GenomicRegion};
pub use error::{BedError, ErrorCode};
pub use identifier::{split_coordinates, split_identifiers, Identifier};
pub use panelapp::{PanelFetch, PanelGene, PanelService, RefreshReport};
pub use region::{ExonInfo, Padding, RecordSource, RegionRecord};
pub use resolve::{ResolveOutcome, ResolveRequest, Resolver, SkipReason, Skipped};
pub use tark::{select_refseq_transcript, TranscriptResolver};
pub use vep::{select_canonical_refseq, VariantResolver};

/// Result type alias for ferro-bed operations
pub type Result<T> = std::result::Result<T, BedError>;
