//! Response shapes of the PanelApp API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::json;
use crate::store::{panel_display_name, PanelRow};

/// One page of `/panels/signedoff/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PanelPage {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<PanelSummary>,
}

/// Panel as listed by the signed-off collection
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PanelSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub disease_group: Option<String>,
    #[serde(default)]
    pub disease_sub_group: Option<String>,
    #[serde(default)]
    pub relevant_disorders: Vec<String>,
    #[serde(default, deserialize_with = "json::opt_string")]
    pub version: Option<String>,
    #[serde(default)]
    pub version_created: Option<String>,
}

impl PanelSummary {
    pub fn display_name(&self) -> String {
        panel_display_name(&self.name, &self.relevant_disorders)
    }

    pub fn to_row(&self, refreshed: DateTime<Utc>) -> PanelRow {
        PanelRow {
            panel_id: self.id,
            name: self.name.clone(),
            disease_group: self.disease_group.clone(),
            disease_sub_group: self.disease_sub_group.clone(),
            version: self.version.clone(),
            version_created: self.version_created.clone(),
            relevant_disorders: self.relevant_disorders.clone(),
            last_refreshed: refreshed,
        }
    }
}

/// `/panels/{id}/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PanelDetail {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub genes: Vec<PanelDetailGene>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PanelDetailGene {
    #[serde(default)]
    pub gene_data: GeneData,
    #[serde(default, deserialize_with = "json::opt_string")]
    pub confidence_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneData {
    #[serde(default)]
    pub gene_symbol: Option<String>,
}

/// Gene symbol with its confidence rating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelGene {
    pub symbol: String,
    /// "3" green, "2" amber, "1" red
    pub confidence: String,
}

impl PanelDetail {
    /// Genes with both a symbol and a confidence level, in payload order
    pub fn panel_genes(&self) -> Vec<PanelGene> {
        self.genes
            .iter()
            .filter_map(|g| {
                Some(PanelGene {
                    symbol: g.gene_data.gene_symbol.clone()?,
                    confidence: g.confidence_level.clone()?,
                })
            })
            .collect()
    }
}
