//! Local cache of transcript and panel data.
//!
//! The cache is write-once per key: inserts for a key that is already stored
//! are ignored, so the first write wins and rows are never updated. Panel
//! data is the exception and is replaced wholesale on refresh.
//!
//! Resolvers depend on the [`RegionStore`] and [`PanelStore`] traits; the
//! shipped implementation is [`SqliteStore`].
//!
//! # Example
//!
//! ```
//! use ferro_bed::store::{RegionStore, SqliteStore};
//! use ferro_bed::Assembly;
//!
//! let store = SqliteStore::in_memory().unwrap();
//! assert!(store.find_gene("BRCA1", Assembly::GRCh38).unwrap().is_none());
//! ```

mod models;
mod schema;
mod sqlite;

pub use models::{
    ExonRow, GeneRow, Location, PanelGeneRow, PanelRow, PanelSnapshot, ReleaseSetRow, StableKey,
    StoreCounts, TranscriptBundle, TranscriptRow, Utr, WriteSummary, MANE_SELECT,
};
pub use models::panel_display_name;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use crate::assembly::Assembly;
use crate::error::BedError;

/// Gene / transcript / exon cache used by the transcript resolver
pub trait RegionStore {
    /// Gene by display name within an assembly. A gene owning an `NM_` MANE
    /// Select transcript wins, then the highest version, then `stable_id`.
    fn find_gene(&self, name: &str, assembly: Assembly) -> Result<Option<GeneRow>, BedError>;

    /// The gene's `NM_` MANE Select transcript in the gene's assembly,
    /// highest version first
    fn find_mane_select(&self, gene: &StableKey) -> Result<Option<TranscriptRow>, BedError>;

    /// Exons of a transcript ordered by `exon_order`
    fn exons_for(&self, transcript: &StableKey) -> Result<Vec<ExonRow>, BedError>;

    /// Insert-if-absent every row in the bundles, atomically
    fn write_bundles(&self, bundles: &[TranscriptBundle]) -> Result<WriteSummary, BedError>;
}

/// Panel snapshot storage used by the panel service
pub trait PanelStore {
    /// Replace all panels and panel genes with a new snapshot, atomically
    fn replace_panels(&self, snapshot: &PanelSnapshot) -> Result<(), BedError>;

    /// All stored panels ordered by id
    fn panels(&self) -> Result<Vec<PanelRow>, BedError>;

    /// Stored genes of one panel in the order they were stored
    fn panel_genes(&self, panel_id: u64) -> Result<Vec<PanelGeneRow>, BedError>;
}

impl<S: RegionStore + ?Sized> RegionStore for &S {
    fn find_gene(&self, name: &str, assembly: Assembly) -> Result<Option<GeneRow>, BedError> {
        (**self).find_gene(name, assembly)
    }

    fn find_mane_select(&self, gene: &StableKey) -> Result<Option<TranscriptRow>, BedError> {
        (**self).find_mane_select(gene)
    }

    fn exons_for(&self, transcript: &StableKey) -> Result<Vec<ExonRow>, BedError> {
        (**self).exons_for(transcript)
    }

    fn write_bundles(&self, bundles: &[TranscriptBundle]) -> Result<WriteSummary, BedError> {
        (**self).write_bundles(bundles)
    }
}

impl<S: RegionStore + ?Sized> RegionStore for Arc<S> {
    fn find_gene(&self, name: &str, assembly: Assembly) -> Result<Option<GeneRow>, BedError> {
        (**self).find_gene(name, assembly)
    }

    fn find_mane_select(&self, gene: &StableKey) -> Result<Option<TranscriptRow>, BedError> {
        (**self).find_mane_select(gene)
    }

    fn exons_for(&self, transcript: &StableKey) -> Result<Vec<ExonRow>, BedError> {
        (**self).exons_for(transcript)
    }

    fn write_bundles(&self, bundles: &[TranscriptBundle]) -> Result<WriteSummary, BedError> {
        (**self).write_bundles(bundles)
    }
}

impl<S: PanelStore + ?Sized> PanelStore for &S {
    fn replace_panels(&self, snapshot: &PanelSnapshot) -> Result<(), BedError> {
        (**self).replace_panels(snapshot)
    }

    fn panels(&self) -> Result<Vec<PanelRow>, BedError> {
        (**self).panels()
    }

    fn panel_genes(&self, panel_id: u64) -> Result<Vec<PanelGeneRow>, BedError> {
        (**self).panel_genes(panel_id)
    }
}

impl<S: PanelStore + ?Sized> PanelStore for Arc<S> {
    fn replace_panels(&self, snapshot: &PanelSnapshot) -> Result<(), BedError> {
        (**self).replace_panels(snapshot)
    }

    fn panels(&self) -> Result<Vec<PanelRow>, BedError> {
        (**self).panels()
    }

    fn panel_genes(&self, panel_id: u64) -> Result<Vec<PanelGeneRow>, BedError> {
        (**self).panel_genes(panel_id)
    }
}
