//! SQLite implementation of the cache traits.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use super::models::{
    ExonRow, GeneRow, Location, PanelGeneRow, PanelRow, PanelSnapshot, ReleaseSetRow, StableKey,
    StoreCounts, TranscriptBundle, TranscriptRow, Utr, WriteSummary, MANE_SELECT,
};
use super::schema::SCHEMA;
use super::{PanelStore, RegionStore};
use crate::assembly::Assembly;
use crate::error::BedError;

/// SQLite-backed cache
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) a cache database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BedError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;",
        )?;
        Self::with_connection(conn)
    }

    /// Create an in-memory cache
    pub fn in_memory() -> Result<Self, BedError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, BedError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, BedError> {
        self.conn.lock().map_err(|_| BedError::Storage {
            msg: "cache connection lock poisoned".to_string(),
        })
    }

    /// Row counts per table
    pub fn counts(&self) -> Result<StoreCounts, BedError> {
        let conn = self.lock()?;
        let count = |table: &str| -> Result<usize, BedError> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
                r.get(0)
            })?;
            Ok(n as usize)
        };

        Ok(StoreCounts {
            genes: count("gene")?,
            transcripts: count("transcript")?,
            exons: count("exon")?,
            release_sets: count("transcript_release_set")?,
            panels: count("panel")?,
            panel_genes: count("panel_gene")?,
        })
    }
}

fn insert_gene(tx: &Transaction<'_>, gene: &GeneRow) -> rusqlite::Result<usize> {
    tx.execute(
        "INSERT OR IGNORE INTO gene
         (stable_id, stable_id_version, assembly, loc_region, loc_start, loc_end,
          loc_strand, loc_checksum, gene_checksum, name)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            gene.key.stable_id,
            gene.key.stable_id_version,
            gene.key.assembly,
            gene.location.region,
            gene.location.start,
            gene.location.end,
            gene.location.strand,
            gene.location.checksum,
            gene.checksum,
            gene.name,
        ],
    )
}

fn insert_transcript(tx: &Transaction<'_>, t: &TranscriptRow) -> rusqlite::Result<usize> {
    tx.execute(
        "INSERT OR IGNORE INTO transcript
         (stable_id, stable_id_version, assembly, loc_region, loc_start, loc_end,
          loc_strand, loc_checksum, transcript_checksum, biotype, sequence,
          five_prime_utr_start, five_prime_utr_end, five_prime_utr_seq,
          three_prime_utr_start, three_prime_utr_end, three_prime_utr_seq,
          mane_transcript, mane_transcript_type, gene_stable_id, gene_stable_id_version)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                 ?17, ?18, ?19, ?20, ?21)",
        params![
            t.key.stable_id,
            t.key.stable_id_version,
            t.key.assembly,
            t.location.region,
            t.location.start,
            t.location.end,
            t.location.strand,
            t.location.checksum,
            t.checksum,
            t.biotype,
            t.sequence,
            t.five_prime_utr.start,
            t.five_prime_utr.end,
            t.five_prime_utr.sequence,
            t.three_prime_utr.start,
            t.three_prime_utr.end,
            t.three_prime_utr.sequence,
            t.mane_transcript,
            t.mane_transcript_type,
            t.gene.as_ref().map(|g| g.stable_id.as_str()),
            t.gene.as_ref().map(|g| g.stable_id_version),
        ],
    )
}

fn insert_exon(tx: &Transaction<'_>, exon: &ExonRow) -> rusqlite::Result<usize> {
    tx.execute(
        "INSERT OR IGNORE INTO exon
         (exon_id, transcript_stable_id, transcript_stable_id_version, assembly,
          stable_id, stable_id_version, loc_region, loc_start, loc_end, loc_strand,
          loc_checksum, exon_checksum, exon_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            exon.exon_id,
            exon.transcript.stable_id,
            exon.transcript.stable_id_version,
            exon.transcript.assembly,
            exon.stable_id,
            exon.stable_id_version,
            exon.location.region,
            exon.location.start,
            exon.location.end,
            exon.location.strand,
            exon.location.checksum,
            exon.checksum,
            exon.exon_order,
        ],
    )
}

fn insert_release_set(tx: &Transaction<'_>, rs: &ReleaseSetRow) -> rusqlite::Result<usize> {
    tx.execute(
        "INSERT OR IGNORE INTO transcript_release_set
         (transcript_stable_id, transcript_stable_id_version, assembly, source, shortname,
          description, release_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            rs.transcript.stable_id,
            rs.transcript.stable_id_version,
            rs.transcript.assembly,
            rs.source,
            rs.shortname,
            rs.description,
            rs.release_date,
        ],
    )
}

fn location_at(row: &Row<'_>, first: usize) -> rusqlite::Result<Location> {
    Ok(Location {
        region: row.get(first)?,
        start: row.get(first + 1)?,
        end: row.get(first + 2)?,
        strand: row.get(first + 3)?,
        checksum: row.get(first + 4)?,
    })
}

impl RegionStore for SqliteStore {
    fn find_gene(&self, name: &str, assembly: Assembly) -> Result<Option<GeneRow>, BedError> {
        let conn = self.lock()?;
        let gene = conn
            .query_row(
                "SELECT g.stable_id, g.stable_id_version, g.assembly, g.loc_region, g.loc_start,
                        g.loc_end, g.loc_strand, g.loc_checksum, g.gene_checksum, g.name
                 FROM gene g WHERE g.name = ?1 AND g.assembly = ?2
                 ORDER BY EXISTS (
                     SELECT 1 FROM transcript t
                     WHERE t.gene_stable_id = g.stable_id
                       AND t.gene_stable_id_version = g.stable_id_version
                       AND t.assembly = g.assembly
                       AND t.mane_transcript_type = ?3
                       AND substr(t.stable_id, 1, 3) = 'NM_'
                 ) DESC, g.stable_id_version DESC, g.stable_id ASC
                 LIMIT 1",
                params![name, assembly.as_str(), MANE_SELECT],
                |row| {
                    Ok(GeneRow {
                        key: StableKey {
                            stable_id: row.get(0)?,
                            stable_id_version: row.get(1)?,
                            assembly: row.get(2)?,
                        },
                        location: location_at(row, 3)?,
                        checksum: row.get(8)?,
                        name: row.get(9)?,
                    })
                },
            )
            .optional()?;
        Ok(gene)
    }

    fn find_mane_select(&self, gene: &StableKey) -> Result<Option<TranscriptRow>, BedError> {
        let conn = self.lock()?;
        let transcript = conn
            .query_row(
                "SELECT stable_id, stable_id_version, assembly, loc_region, loc_start, loc_end,
                        loc_strand, loc_checksum, transcript_checksum, biotype, sequence,
                        five_prime_utr_start, five_prime_utr_end, five_prime_utr_seq,
                        three_prime_utr_start, three_prime_utr_end, three_prime_utr_seq,
                        mane_transcript, mane_transcript_type
                 FROM transcript
                 WHERE gene_stable_id = ?1 AND gene_stable_id_version = ?2 AND assembly = ?3
                   AND mane_transcript_type = ?4 AND substr(stable_id, 1, 3) = 'NM_'
                 ORDER BY stable_id_version DESC, stable_id ASC LIMIT 1",
                params![
                    gene.stable_id,
                    gene.stable_id_version,
                    gene.assembly,
                    MANE_SELECT
                ],
                |row| {
                    Ok(TranscriptRow {
                        key: StableKey {
                            stable_id: row.get(0)?,
                            stable_id_version: row.get(1)?,
                            assembly: row.get(2)?,
                        },
                        location: location_at(row, 3)?,
                        checksum: row.get(8)?,
                        biotype: row.get(9)?,
                        sequence: row.get(10)?,
                        five_prime_utr: Utr {
                            start: row.get(11)?,
                            end: row.get(12)?,
                            sequence: row.get(13)?,
                        },
                        three_prime_utr: Utr {
                            start: row.get(14)?,
                            end: row.get(15)?,
                            sequence: row.get(16)?,
                        },
                        mane_transcript: row.get(17)?,
                        mane_transcript_type: row.get(18)?,
                        gene: Some(gene.clone()),
                    })
                },
            )
            .optional()?;
        Ok(transcript)
    }

    fn exons_for(&self, transcript: &StableKey) -> Result<Vec<ExonRow>, BedError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT exon_id, stable_id, stable_id_version, loc_region, loc_start, loc_end,
                    loc_strand, loc_checksum, exon_checksum, exon_order
             FROM exon
             WHERE transcript_stable_id = ?1 AND transcript_stable_id_version = ?2
               AND assembly = ?3
             ORDER BY exon_order ASC",
        )?;

        let exons = stmt
            .query_map(
                params![
                    transcript.stable_id,
                    transcript.stable_id_version,
                    transcript.assembly
                ],
                |row| {
                    Ok(ExonRow {
                        exon_id: row.get(0)?,
                        stable_id: row.get(1)?,
                        stable_id_version: row.get(2)?,
                        location: location_at(row, 3)?,
                        checksum: row.get(8)?,
                        exon_order: row.get(9)?,
                        transcript: transcript.clone(),
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(exons)
    }

    fn write_bundles(&self, bundles: &[TranscriptBundle]) -> Result<WriteSummary, BedError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut summary = WriteSummary::default();

        for bundle in bundles {
            // Genes before the transcript that references them
            for gene in &bundle.genes {
                summary.genes += insert_gene(&tx, gene)?;
            }
            summary.transcripts += insert_transcript(&tx, &bundle.transcript)?;
            for exon in &bundle.exons {
                summary.exons += insert_exon(&tx, exon)?;
            }
            for release_set in &bundle.release_sets {
                summary.release_sets += insert_release_set(&tx, release_set)?;
            }
        }

        tx.commit()?;
        Ok(summary)
    }
}

impl PanelStore for SqliteStore {
    fn replace_panels(&self, snapshot: &PanelSnapshot) -> Result<(), BedError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM panel_gene", [])?;
        tx.execute("DELETE FROM panel", [])?;

        for panel in &snapshot.panels {
            let disorders = serde_json::to_string(&panel.relevant_disorders)?;
            tx.execute(
                "INSERT OR IGNORE INTO panel
                 (panel_id, name, disease_group, disease_sub_group, version, version_created,
                  relevant_disorders, last_refreshed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    panel.panel_id,
                    panel.name,
                    panel.disease_group,
                    panel.disease_sub_group,
                    panel.version,
                    panel.version_created,
                    disorders,
                    panel.last_refreshed,
                ],
            )?;
        }

        for gene in &snapshot.genes {
            tx.execute(
                "INSERT OR IGNORE INTO panel_gene (panel_id, gene_symbol, confidence_level)
                 VALUES (?1, ?2, ?3)",
                params![gene.panel_id, gene.gene_symbol, gene.confidence_level],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn panels(&self) -> Result<Vec<PanelRow>, BedError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT panel_id, name, disease_group, disease_sub_group, version, version_created,
                    relevant_disorders, last_refreshed
             FROM panel ORDER BY panel_id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let disorders: String = row.get(6)?;
                Ok((
                    PanelRow {
                        panel_id: row.get(0)?,
                        name: row.get(1)?,
                        disease_group: row.get(2)?,
                        disease_sub_group: row.get(3)?,
                        version: row.get(4)?,
                        version_created: row.get(5)?,
                        relevant_disorders: Vec::new(),
                        last_refreshed: row.get(7)?,
                    },
                    disorders,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(mut panel, disorders)| -> Result<PanelRow, BedError> {
                panel.relevant_disorders = serde_json::from_str(&disorders)?;
                Ok(panel)
            })
            .collect()
    }

    fn panel_genes(&self, panel_id: u64) -> Result<Vec<PanelGeneRow>, BedError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT panel_id, gene_symbol, confidence_level
             FROM panel_gene WHERE panel_id = ?1 ORDER BY rowid",
        )?;

        let genes = stmt
            .query_map(params![panel_id], |row| {
                Ok(PanelGeneRow {
                    panel_id: row.get(0)?,
                    gene_symbol: row.get(1)?,
                    confidence_level: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(genes)
    }
}
