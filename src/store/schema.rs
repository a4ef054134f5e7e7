//! SQLite schema for the region cache.

/// Statements run on every open; all are idempotent.
pub(super) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS gene (
    stable_id TEXT NOT NULL,
    stable_id_version INTEGER NOT NULL,
    assembly TEXT NOT NULL,
    loc_region TEXT,
    loc_start INTEGER,
    loc_end INTEGER,
    loc_strand INTEGER,
    loc_checksum TEXT,
    gene_checksum TEXT,
    name TEXT,
    PRIMARY KEY (stable_id, stable_id_version, assembly)
);
CREATE INDEX IF NOT EXISTS idx_gene_name ON gene(name, assembly);

CREATE TABLE IF NOT EXISTS transcript (
    stable_id TEXT NOT NULL,
    stable_id_version INTEGER NOT NULL,
    assembly TEXT NOT NULL,
    loc_region TEXT,
    loc_start INTEGER,
    loc_end INTEGER,
    loc_strand INTEGER,
    loc_checksum TEXT,
    transcript_checksum TEXT,
    biotype TEXT,
    sequence TEXT,
    five_prime_utr_start INTEGER,
    five_prime_utr_end INTEGER,
    five_prime_utr_seq TEXT,
    three_prime_utr_start INTEGER,
    three_prime_utr_end INTEGER,
    three_prime_utr_seq TEXT,
    mane_transcript TEXT,
    mane_transcript_type TEXT,
    gene_stable_id TEXT,
    gene_stable_id_version INTEGER,
    PRIMARY KEY (stable_id, stable_id_version, assembly)
);
CREATE INDEX IF NOT EXISTS idx_transcript_gene
    ON transcript(gene_stable_id, gene_stable_id_version, assembly);

CREATE TABLE IF NOT EXISTS exon (
    exon_id INTEGER NOT NULL,
    transcript_stable_id TEXT NOT NULL,
    transcript_stable_id_version INTEGER NOT NULL,
    assembly TEXT NOT NULL,
    stable_id TEXT,
    stable_id_version INTEGER,
    loc_region TEXT,
    loc_start INTEGER,
    loc_end INTEGER,
    loc_strand INTEGER,
    loc_checksum TEXT,
    exon_checksum TEXT,
    exon_order INTEGER NOT NULL,
    PRIMARY KEY (exon_id, transcript_stable_id, transcript_stable_id_version, assembly)
);
CREATE INDEX IF NOT EXISTS idx_exon_transcript
    ON exon(transcript_stable_id, transcript_stable_id_version, assembly, exon_order);

CREATE TABLE IF NOT EXISTS transcript_release_set (
    transcript_stable_id TEXT NOT NULL,
    transcript_stable_id_version INTEGER NOT NULL,
    assembly TEXT NOT NULL,
    source TEXT NOT NULL,
    shortname TEXT NOT NULL,
    description TEXT,
    release_date TEXT,
    PRIMARY KEY (transcript_stable_id, transcript_stable_id_version, assembly, source, shortname)
);

CREATE TABLE IF NOT EXISTS panel (
    panel_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    disease_group TEXT,
    disease_sub_group TEXT,
    version TEXT,
    version_created TEXT,
    relevant_disorders TEXT NOT NULL,
    last_refreshed TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS panel_gene (
    panel_id INTEGER NOT NULL,
    gene_symbol TEXT NOT NULL,
    confidence_level TEXT NOT NULL,
    PRIMARY KEY (panel_id, gene_symbol)
);
";
