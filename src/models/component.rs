use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TariffError;

// ---------------------------------------------------------------------------
// ComponentLabel: closed set of price components
// ---------------------------------------------------------------------------

/// A named contributor to the final electricity price.
///
/// Variants are declared in the order series are stacked and listed.
/// Serialized as the dataset label (e.g. `"Value added tax (VAT)"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentLabel {
    #[serde(rename = "Energy and supply")]
    EnergyAndSupply,
    #[serde(rename = "Network costs")]
    NetworkCosts,
    #[serde(rename = "Value added tax (VAT)")]
    Vat,
    #[serde(rename = "Capacity taxes")]
    CapacityTaxes,
    #[serde(rename = "Environmental taxes")]
    EnvironmentalTaxes,
    #[serde(rename = "Nuclear taxes")]
    NuclearTaxes,
    #[serde(rename = "Renewable taxes")]
    RenewableTaxes,
    #[serde(rename = "Other")]
    Other,
    #[serde(rename = "Environmental taxes allowance")]
    EnvironmentalTaxesAllowance,
    #[serde(rename = "Other allowance")]
    OtherAllowance,
    #[serde(rename = "Taxes, fees, levies and charges")]
    TaxesFeesLeviesAndCharges,
}

/// Display colours for one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentStyle {
    pub positive: &'static str,
    /// Only components that can turn into rebates declare one.
    pub negative: Option<&'static str>,
}

impl ComponentLabel {
    /// Every label, in declaration order.
    pub const ALL: [ComponentLabel; 11] = [
        ComponentLabel::EnergyAndSupply,
        ComponentLabel::NetworkCosts,
        ComponentLabel::Vat,
        ComponentLabel::CapacityTaxes,
        ComponentLabel::EnvironmentalTaxes,
        ComponentLabel::NuclearTaxes,
        ComponentLabel::RenewableTaxes,
        ComponentLabel::Other,
        ComponentLabel::EnvironmentalTaxesAllowance,
        ComponentLabel::OtherAllowance,
        ComponentLabel::TaxesFeesLeviesAndCharges,
    ];

    /// The label as it appears in the datasets.
    pub fn label(self) -> &'static str {
        match self {
            ComponentLabel::EnergyAndSupply => "Energy and supply",
            ComponentLabel::NetworkCosts => "Network costs",
            ComponentLabel::Vat => "Value added tax (VAT)",
            ComponentLabel::CapacityTaxes => "Capacity taxes",
            ComponentLabel::EnvironmentalTaxes => "Environmental taxes",
            ComponentLabel::NuclearTaxes => "Nuclear taxes",
            ComponentLabel::RenewableTaxes => "Renewable taxes",
            ComponentLabel::Other => "Other",
            ComponentLabel::EnvironmentalTaxesAllowance => "Environmental taxes allowance",
            ComponentLabel::OtherAllowance => "Other allowance",
            ComponentLabel::TaxesFeesLeviesAndCharges => "Taxes, fees, levies and charges",
        }
    }

    /// Look up a label by its dataset spelling.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    pub fn style(self) -> ComponentStyle {
        let (positive, negative) = match self {
            ComponentLabel::EnergyAndSupply => ("skyblue", None),
            ComponentLabel::NetworkCosts => ("navy", None),
            ComponentLabel::Vat => ("gainsboro", None),
            ComponentLabel::CapacityTaxes => ("black", Some("darkgrey")),
            ComponentLabel::EnvironmentalTaxes => ("khaki", Some("rosybrown")),
            ComponentLabel::NuclearTaxes => ("purple", None),
            ComponentLabel::RenewableTaxes => ("limegreen", Some("salmon")),
            ComponentLabel::Other => ("antiquewhite", Some("silver")),
            ComponentLabel::EnvironmentalTaxesAllowance => ("darkkhaki", Some("peru")),
            ComponentLabel::OtherAllowance => ("teal", Some("mistyrose")),
            ComponentLabel::TaxesFeesLeviesAndCharges => ("black", None),
        };
        ComponentStyle { positive, negative }
    }

    /// `true` for the row that sums every tax/levy component.
    pub fn is_aggregate(self) -> bool {
        self == ComponentLabel::TaxesFeesLeviesAndCharges
    }

    /// `true` for components counted inside the tax aggregate.
    pub fn is_tax(self) -> bool {
        !matches!(
            self,
            ComponentLabel::EnergyAndSupply
                | ComponentLabel::NetworkCosts
                | ComponentLabel::TaxesFeesLeviesAndCharges
        )
    }
}

impl fmt::Display for ComponentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ComponentLabel {
    type Err = TariffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| TariffError::UnknownComponent(s.to_string()))
    }
}
