use serde::{Deserialize, Serialize};

/// One country's position in a cross-country comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// 1-based, cheapest first.
    pub rank: usize,
    pub country: String,
    pub value: f64,
}

/// Countries ranked by value for one tax/period/category selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub tax: String,
    pub period: String,
    pub category: String,
    pub entries: Vec<RankedEntry>,
}

impl Ranking {
    /// `(country, value)` pairs in rank order.
    pub fn pairs(&self) -> Vec<(&str, f64)> {
        self.entries
            .iter()
            .map(|e| (e.country.as_str(), e.value))
            .collect()
    }

    pub fn countries(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.country.as_str()).collect()
    }
}
