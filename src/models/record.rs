use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ComponentLabel;

// ---------------------------------------------------------------------------
// PriceRecord: one wide row of the composition dataset
// ---------------------------------------------------------------------------

/// A country/category/component row with one value per year column.
///
/// Serializes flat, with year columns next to the identifiers, matching the
/// wide layout of the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub country: String,
    #[serde(rename = "nrg_cons")]
    pub consumption_category: String,
    #[serde(rename = "nrg_prc")]
    pub price_component: ComponentLabel,
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
}

impl PriceRecord {
    pub fn new(
        country: impl Into<String>,
        consumption_category: impl Into<String>,
        price_component: ComponentLabel,
    ) -> Self {
        Self {
            country: country.into(),
            consumption_category: consumption_category.into(),
            price_component,
            values: BTreeMap::new(),
        }
    }

    /// Set the value for a year column. `None` records the year as missing.
    pub fn with_value(mut self, year: impl Into<String>, value: impl Into<Option<f64>>) -> Self {
        self.values.insert(year.into(), value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// AggregateRecord: one wide row of the cross-country dataset
// ---------------------------------------------------------------------------

/// A country/tax/category row with one value per period column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub country: String,
    pub tax: String,
    #[serde(rename = "nrg_cons")]
    pub consumption_category: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
}

impl AggregateRecord {
    pub fn new(
        country: impl Into<String>,
        tax: impl Into<String>,
        consumption_category: impl Into<String>,
    ) -> Self {
        Self {
            country: country.into(),
            tax: tax.into(),
            consumption_category: consumption_category.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, period: impl Into<String>, value: impl Into<Option<f64>>) -> Self {
        self.values.insert(period.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_record_serializes_flat() {
        let record = PriceRecord::new("DE", "Household", ComponentLabel::NetworkCosts)
            .with_value("2021", 0.08)
            .with_value("2022", None);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["country"], "DE");
        assert_eq!(json["nrg_cons"], "Household");
        assert_eq!(json["nrg_prc"], "Network costs");
        assert_eq!(json["2021"], 0.08);
        assert!(json["2022"].is_null());
    }

    #[test]
    fn aggregate_record_deserializes_period_columns() {
        let json = r#"{"country":"FR","tax":"Excluding VAT","nrg_cons":"Band DC","2022-S1":0.21,"2022-S2":null}"#;
        let record: AggregateRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.tax, "Excluding VAT");
        assert_eq!(record.values.get("2022-S1"), Some(&Some(0.21)));
        assert_eq!(record.values.get("2022-S2"), Some(&None));
    }
}
