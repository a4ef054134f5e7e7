// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-bed CLI
//!
//! Resolve genes, accessions, rsIDs and coordinates into BED regions, and
//! manage the local transcript and panel cache.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::util::SubscriberInitExt;

use ferro_bed::http::{ReqwestTransport, RetryPolicy, RetryingTransport};
use ferro_bed::store::SqliteStore;
use ferro_bed::{
    write_records, Assembly, BedConfig, OutputFormat, Padding, PanelService, ResolveRequest,
    Resolver,
};

#[derive(Parser)]
#[command(name = "ferro-bed")]
#[command(author, version, about = "Resolve genomic identifiers into BED regions")]
#[command(
    long_about = "Resolve gene symbols, RefSeq accessions, rsIDs and coordinates into BED regions.

Examples:
  ferro-bed resolve BRCA1 BRCA2 --padding5 20 --padding3 20
  ferro-bed resolve rs80357906 --assembly GRCh37 -f tsv
  ferro-bed resolve -c chr17:43044295-43125364 -c 13:32315474-32400266
  ferro-bed panels refresh
  ferro-bed panels genes 245 --amber"
)]
struct Cli {
    /// Configuration file (default: search .ferro-bed.toml, ~/.config/ferro-bed/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache database path (overrides configuration)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve identifiers and coordinates into regions
    Resolve {
        /// Gene symbols, accessions or rsIDs (comma or space separated)
        identifiers: Vec<String>,

        /// File of identifiers
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Literal region ([chr]N:start-end), may be repeated
        #[arg(short, long)]
        coordinates: Vec<String>,

        /// File of regions, one per line
        #[arg(long)]
        coordinates_file: Option<PathBuf>,

        /// Genome assembly (GRCh37 or GRCh38)
        #[arg(short, long, default_value = "GRCh38")]
        assembly: String,

        /// Bases added before each gene-derived region
        #[arg(long, default_value_t = 0)]
        padding5: u64,

        /// Bases added after each gene-derived region
        #[arg(long, default_value_t = 0)]
        padding3: u64,

        /// Output format (bed, tsv, json)
        #[arg(short = 'f', long, default_value = "bed")]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Gene panel operations
    Panels {
        #[command(subcommand)]
        command: PanelCommands,
    },

    /// Cache inspection
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Write a default configuration file
    Config {
        /// Output path for configuration file
        #[arg(short, long, default_value = ".ferro-bed.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum PanelCommands {
    /// Refetch all signed-off panels and replace the stored snapshot
    Refresh,

    /// List stored panels
    List,

    /// Genes of one panel (green always; amber and red on request)
    Genes {
        panel_id: u64,

        /// Include amber (level 2) genes
        #[arg(long)]
        amber: bool,

        /// Include red (level 1) genes
        #[arg(long)]
        red: bool,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Row counts per table
    Stats,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.log_level) {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Configuration, transport and cache shared by the network-backed commands
struct Backend {
    config: BedConfig,
    transport: RetryingTransport<ReqwestTransport>,
    store: SqliteStore,
}

impl Backend {
    fn open(
        config_path: Option<&Path>,
        database: Option<PathBuf>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = match config_path {
            Some(path) => BedConfig::from_file(path)?,
            None => BedConfig::load()?,
        };
        if let Some(database) = database {
            config.database.path = database;
        }

        let transport = RetryingTransport::new(
            ReqwestTransport::new(&config.http)?,
            RetryPolicy::from_config(&config.http),
        );
        let store = SqliteStore::open(&config.database.path)?;
        info!("Using cache {}", config.database.path.display());

        Ok(Self {
            config,
            transport,
            store,
        })
    }

    fn log_stats(&self) {
        let stats = self.transport.stats();
        info!(
            "HTTP requests: {} ({} retries, {} failures)",
            stats.total_requests, stats.retries, stats.failures
        );
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let backend = || Backend::open(cli.config.as_deref(), cli.database.clone());

    match cli.command {
        Commands::Resolve {
            identifiers,
            input,
            coordinates,
            coordinates_file,
            assembly,
            padding5,
            padding3,
            format,
            output,
        } => {
            let mut identifier_text = identifiers.join("\n");
            if let Some(path) = input {
                identifier_text.push('\n');
                identifier_text.push_str(&std::fs::read_to_string(path)?);
            }
            let mut coordinate_text = coordinates.join("\n");
            if let Some(path) = coordinates_file {
                coordinate_text.push('\n');
                coordinate_text.push_str(&std::fs::read_to_string(path)?);
            }

            let request = ResolveRequest::new(identifier_text, assembly.parse::<Assembly>()?)
                .with_coordinates(coordinate_text)
                .with_padding(Padding::new(padding5, padding3));

            let backend = backend()?;
            let resolver = Resolver::new(
                &backend.transport,
                &backend.store,
                backend.config.endpoints.clone(),
            );
            let outcome = resolver.resolve(&request)?;
            backend.log_stats();
            for skipped in &outcome.skipped {
                eprintln!("Skipped {}: {}", skipped.identifier, skipped.reason);
            }

            let mut out = open_output(output.as_deref())?;
            write_records(&mut out, &outcome.records, format)?;
            out.flush()?;
        }
        Commands::Panels { command } => {
            let backend = backend()?;
            let service = PanelService::new(
                &backend.transport,
                &backend.store,
                backend.config.endpoints.clone(),
            );
            match command {
                PanelCommands::Refresh => {
                    let report = service.refresh_panels()?;
                    println!(
                        "Stored {} panels with {} genes",
                        report.panels, report.genes
                    );
                    if !report.complete {
                        eprintln!(
                            "Warning: refresh was partial ({} panels without genes)",
                            report.failed_panels.len()
                        );
                    }
                }
                PanelCommands::List => {
                    for panel in service.cached_panels()? {
                        println!("{}\t{}", panel.panel_id, panel.display_name());
                    }
                }
                PanelCommands::Genes {
                    panel_id,
                    amber,
                    red,
                } => {
                    for gene in service.genes_for_panel(panel_id, amber, red)? {
                        println!("{}\t{}", gene.symbol, gene.confidence);
                    }
                }
            }
            backend.log_stats();
        }
        Commands::Cache {
            command: CacheCommands::Stats,
        } => {
            let counts = backend()?.store.counts()?;
            println!("genes\t{}", counts.genes);
            println!("transcripts\t{}", counts.transcripts);
            println!("exons\t{}", counts.exons);
            println!("release_sets\t{}", counts.release_sets);
            println!("panels\t{}", counts.panels);
            println!("panel_genes\t{}", counts.panel_genes);
        }
        Commands::Config { output, force } => config_command(&output, force)?,
    }

    Ok(())
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(File::create(p)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn config_command(output: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if output.exists() && !force {
        return Err(format!(
            "Configuration file already exists: {} (use --force to overwrite)",
            output.display()
        )
        .into());
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    BedConfig::default().to_file(output)?;
    println!("Configuration written to {}", output.display());
    Ok(())
}

fn init_tracing(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

    let filter =
        EnvFilter::try_new(level).map_err(|e| format!("Invalid log level '{}': {}", level, e))?;

    // stdout carries the records
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    Ok(())
}
