use std::collections::HashMap;

use crate::models::ComponentLabel;

/// DuckDB table holding the long-format composition dataset.
pub const PRICE_TABLE: &str = "price_components";
/// DuckDB table holding the long-format cross-country dataset.
pub const AGGREGATE_TABLE: &str = "aggregate_prices";

/// Identifier columns of the wide composition rows; every other column is a period.
pub const PRICE_ID_COLUMNS: [&str; 3] = ["country", "nrg_cons", "nrg_prc"];
/// Identifier columns of the wide aggregate rows; every other column is a period.
pub const AGGREGATE_ID_COLUMNS: [&str; 3] = ["country", "tax", "nrg_cons"];

/// Absolute difference above which a reconciliation check is flagged.
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Tax label in the aggregate dataset whose value is the final retail price.
pub const DEFAULT_REPORTED_TOTAL_TAX: &str = "All taxes and levies included";

/// Name of the per-category marker series in the composition chart.
pub const FINAL_PRICE_LABEL: &str = "Final retail price";

pub const DEFAULT_FONT_FAMILY: &str = "Roboto";

/// Single components drawn in the evolution chart, in legend order.
pub const SINGLE_COMPONENTS: [ComponentLabel; 8] = [
    ComponentLabel::NetworkCosts,
    ComponentLabel::EnergyAndSupply,
    ComponentLabel::Other,
    ComponentLabel::CapacityTaxes,
    ComponentLabel::EnvironmentalTaxes,
    ComponentLabel::NuclearTaxes,
    ComponentLabel::RenewableTaxes,
    ComponentLabel::Vat,
];

// Fallback colours for labels without a declared colour for that sign.
pub const FALLBACK_POSITIVE_COLOR: &str = "blue";
pub const FALLBACK_NEGATIVE_COLOR: &str = "red";
pub const AGGREGATE_COLOR: &str = "black";
pub const RANKING_BAR_WIDTH: f64 = 0.8;
pub const RANKING_CHART_HEIGHT: u32 = 600;

pub const COMPOSITION_SOURCE: &str = "Source: Bruegel based on Eurostat [nrg_pc_204_c and nrg_pc_203_v]";
pub const RANKING_SOURCE: &str = "Source: Bruegel based on Eurostat [nrg_pc_204 and nrg_pc_205]";

pub const COMPOSITION_NOTES: [&str; 2] = [
    "The consumption bands used are: MWh 20-499 for small size firms, MWh 2,000-19,999 for medium size firms and MWh 70,000-149,999 for energy intensive firms.",
    "Please note that businesses are often reimbursed partly or fully some of the displayed taxes, such as VAT",
];

pub const EVOLUTION_NOTES: [&str; 1] = [
    "Please note that the category \"Taxes, fees levies and charges\" includes all the others except \"energy and supply\" and \"network costs\"",
];

/// Per-explorer settings applied by the query interfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Absolute tolerance for reconciliation checks.
    pub tolerance: f64,
    /// Aggregate-dataset tax label read as the reported final retail price.
    pub reported_total_tax: String,
    /// Composition category -> aggregate category, where the datasets name a band differently.
    pub category_aliases: HashMap<String, String>,
    pub font_family: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            reported_total_tax: DEFAULT_REPORTED_TOTAL_TAX.to_string(),
            category_aliases: HashMap::new(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }
}

impl Settings {
    /// The aggregate-dataset name of a composition category.
    pub fn aggregate_category<'s>(&'s self, category: &'s str) -> &'s str {
        self.category_aliases
            .get(category)
            .map(String::as_str)
            .unwrap_or(category)
    }
}
