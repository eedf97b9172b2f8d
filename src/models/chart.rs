use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    Positive,
    Negative,
}

/// What a series stands for in its chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesRole {
    Component,
    /// Per-category sum of every component, drawn as a marker.
    ReconciliationTotal,
    /// The "Taxes, fees, levies and charges" line.
    Aggregate,
    Ranking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: String,
    pub y: f64,
}

impl DataPoint {
    pub fn new(x: impl Into<String>, y: f64) -> Self {
        Self { x: x.into(), y }
    }
}

/// A named, coloured, optionally signed data series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Legend entry, e.g. `"Renewable taxes (-)"`.
    pub name: String,
    /// Underlying label without the sign suffix.
    pub label: String,
    pub role: SeriesRole,
    pub sign: Option<Sign>,
    pub color: String,
    pub stroke: StrokeStyle,
    pub points: Vec<DataPoint>,
}

impl Series {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// Sum of all components vs the reported final retail price.
    FinalPrice,
    /// Sum of the tax components vs the "Taxes, fees, levies and charges" row.
    TaxAggregate,
}

/// Non-fatal data-quality flag attached to chart output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationMismatch {
    pub kind: MismatchKind,
    /// Consumption category or year the check ran for.
    pub key: String,
    pub computed: f64,
    pub reported: f64,
    pub difference: f64,
}

impl ReconciliationMismatch {
    /// Compare a computed total against a reported one.
    ///
    /// Returns a flag only when the absolute difference exceeds `tolerance`.
    pub fn check(
        kind: MismatchKind,
        key: &str,
        computed: f64,
        reported: f64,
        tolerance: f64,
    ) -> Option<Self> {
        let difference = computed - reported;
        if difference.abs() > tolerance {
            Some(Self {
                kind,
                key: key.to_string(),
                computed,
                reported,
                difference,
            })
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Bars stacked relative to zero: positives up, negatives down.
    StackedBar,
    HorizontalBar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMetadata {
    pub title: String,
    pub x_axis_title: Option<String>,
    pub y_axis_title: Option<String>,
    pub legend_title: Option<String>,
    pub font_family: String,
    pub height: Option<u32>,
    pub bar_width: Option<f64>,
    pub source: Option<String>,
    pub notes: Vec<String>,
}

impl ChartMetadata {
    pub fn new(title: impl Into<String>, font_family: &str) -> Self {
        Self {
            title: title.into(),
            x_axis_title: None,
            y_axis_title: None,
            legend_title: None,
            font_family: font_family.to_string(),
            height: None,
            bar_width: None,
            source: None,
            notes: Vec::new(),
        }
    }
}

/// Chart-ready output handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub metadata: ChartMetadata,
    pub series: Vec<Series>,
    pub warnings: Vec<ReconciliationMismatch>,
}

impl Chart {
    pub fn series_named(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
