//! Gene panels from PanelApp.
//!
//! Panels are listed from the paginated signed-off collection and cached as
//! a whole snapshot; gene lists are filtered by confidence rating.

mod types;

pub use types::{GeneData, PanelDetail, PanelDetailGene, PanelGene, PanelPage, PanelSummary};

use chrono::Utc;
use serde::Serialize;

use crate::config::EndpointConfig;
use crate::error::BedError;
use crate::http::{get_json, Transport};
use crate::store::{PanelGeneRow, PanelRow, PanelSnapshot, PanelStore};

const SERVICE: &str = "PanelApp";

/// Green ("3") is always included; amber ("2") and red ("1") on request.
pub fn confidence_levels(include_amber: bool, include_red: bool) -> Vec<&'static str> {
    let mut levels = vec!["3"];
    if include_amber {
        levels.push("2");
    }
    if include_red {
        levels.push("1");
    }
    levels
}

/// Result of walking the panel listing.
///
/// `panels` holds everything fetched before any failure; `complete` is false
/// and `error` is set when a page failed and pagination stopped early.
#[derive(Debug, Clone, Default)]
pub struct PanelFetch {
    pub panels: Vec<PanelSummary>,
    pub complete: bool,
    pub error: Option<BedError>,
}

/// Outcome of a snapshot refresh
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// Panels stored
    pub panels: usize,
    /// Panel genes stored
    pub genes: usize,
    /// False if the listing stopped early or any panel detail failed
    pub complete: bool,
    /// Panels whose gene lists could not be fetched
    pub failed_panels: Vec<u64>,
}

/// Panel listing, snapshot refresh and gene lookup
#[derive(Debug, Clone)]
pub struct PanelService<T, S> {
    transport: T,
    store: S,
    endpoints: EndpointConfig,
}

impl<T: Transport, S: PanelStore> PanelService<T, S> {
    pub fn new(transport: T, store: S, endpoints: EndpointConfig) -> Self {
        Self {
            transport,
            store,
            endpoints,
        }
    }

    fn base(&self) -> &str {
        self.endpoints.panelapp.trim_end_matches('/')
    }

    /// First page of the signed-off listing
    pub fn listing_url(&self) -> String {
        format!("{}/panels/signedoff/", self.base())
    }

    pub fn detail_url(&self, panel_id: u64) -> String {
        format!("{}/panels/{}/", self.base(), panel_id)
    }

    /// Walk every page of the listing by following `next` links.
    pub fn fetch_all_panels(&self) -> PanelFetch {
        let mut fetch = PanelFetch::default();
        let mut next = Some(self.listing_url());
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            match get_json::<PanelPage, _>(&self.transport, SERVICE, &url, &[]) {
                Ok(page) => {
                    pages += 1;
                    fetch.panels.extend(page.results);
                    next = page.next.filter(|n| !n.is_empty());
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to fetch panels at {} after {} pages: {}",
                        url,
                        pages,
                        e
                    );
                    fetch.error = Some(e);
                    return fetch;
                }
            }
        }

        tracing::debug!("Fetched {} panels in {} pages", fetch.panels.len(), pages);
        fetch.complete = true;
        fetch
    }

    /// Every gene on a panel, regardless of confidence
    pub fn fetch_panel_genes(&self, panel_id: u64) -> Result<Vec<PanelGene>, BedError> {
        let detail: PanelDetail =
            get_json(&self.transport, SERVICE, &self.detail_url(panel_id), &[])?;
        Ok(detail.panel_genes())
    }

    /// Refetch the listing and every panel's genes, then replace the stored
    /// snapshot in one transaction.
    ///
    /// When the listing fails before returning any panel the stored snapshot
    /// is kept and the error is returned. Panels whose detail fetch fails are
    /// stored without genes and reported in `failed_panels`.
    pub fn refresh_panels(&self) -> Result<RefreshReport, BedError> {
        let fetch = self.fetch_all_panels();
        if fetch.panels.is_empty() {
            if let Some(e) = fetch.error {
                return Err(e);
            }
        }

        let refreshed = Utc::now();
        let mut snapshot = PanelSnapshot::default();
        let mut failed_panels = Vec::new();

        for panel in &fetch.panels {
            snapshot.panels.push(panel.to_row(refreshed));
            match self.fetch_panel_genes(panel.id) {
                Ok(genes) => snapshot
                    .genes
                    .extend(genes.into_iter().map(|g| PanelGeneRow {
                        panel_id: panel.id,
                        gene_symbol: g.symbol,
                        confidence_level: g.confidence,
                    })),
                Err(e) => {
                    tracing::warn!("Failed to fetch genes for panel {}: {}", panel.id, e);
                    failed_panels.push(panel.id);
                }
            }
        }

        self.store.replace_panels(&snapshot)?;

        let report = RefreshReport {
            panels: snapshot.panels.len(),
            genes: snapshot.genes.len(),
            complete: fetch.complete && failed_panels.is_empty(),
            failed_panels,
        };
        tracing::info!(
            "Stored {} panels with {} genes{}",
            report.panels,
            report.genes,
            if report.complete { "" } else { " (partial)" }
        );
        Ok(report)
    }

    /// Genes of a panel at the requested confidence levels.
    ///
    /// Served from the stored snapshot when it holds genes for the panel,
    /// otherwise fetched from the detail endpoint without being stored. A
    /// failed fetch yields an empty list.
    pub fn genes_for_panel(
        &self,
        panel_id: u64,
        include_amber: bool,
        include_red: bool,
    ) -> Result<Vec<PanelGene>, BedError> {
        let levels = confidence_levels(include_amber, include_red);

        let cached = self.store.panel_genes(panel_id)?;
        let genes = if cached.is_empty() {
            match self.fetch_panel_genes(panel_id) {
                Ok(genes) => genes,
                Err(e) => {
                    tracing::warn!("Failed to fetch genes for panel {}: {}", panel_id, e);
                    Vec::new()
                }
            }
        } else {
            cached
                .into_iter()
                .map(|row| PanelGene {
                    symbol: row.gene_symbol,
                    confidence: row.confidence_level,
                })
                .collect()
        };

        Ok(genes
            .into_iter()
            .filter(|g| levels.contains(&g.confidence.as_str()))
            .collect())
    }

    /// Stored panel snapshot
    pub fn cached_panels(&self) -> Result<Vec<PanelRow>, BedError> {
        self.store.panels()
    }
}
