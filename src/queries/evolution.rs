//! Year-by-year evolution of the price components for one country/category.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{
    Settings, AGGREGATE_COLOR, COMPOSITION_SOURCE, EVOLUTION_NOTES, PRICE_TABLE, SINGLE_COMPONENTS,
};
use crate::connection::Connection;
use crate::error::{Result, TariffError};
use crate::models::{
    Chart, ChartKind, ChartMetadata, ComponentLabel, DataPoint, MismatchKind,
    ReconciliationMismatch, Series, SeriesRole, StrokeStyle,
};
use crate::queries::domain::DomainQuery;
use crate::sql_builder::{SqlBuilder, PERIOD_ORDER};

#[derive(Debug, Deserialize)]
struct YearValue {
    nrg_prc: String,
    period: String,
    value: f64,
}

/// Observed points per component label, each in ascending year order.
type PointsByLabel = HashMap<String, Vec<DataPoint>>;

// ---------------------------------------------------------------------------
// EvolutionQuery
// ---------------------------------------------------------------------------

/// Query interface for component time series of one country/category pair.
pub struct EvolutionQuery<'a> {
    conn: &'a Connection,
    settings: &'a Settings,
}

impl<'a> EvolutionQuery<'a> {
    pub fn new(conn: &'a Connection, settings: &'a Settings) -> Self {
        Self { conn, settings }
    }

    /// One line per component in `labels` plus the dashed tax aggregate.
    ///
    /// Components without any observed year among `years` are skipped. The
    /// aggregate is appended whenever it has at least one observed year, and
    /// is never drawn solid even if listed in `labels`. A selection with no
    /// stored value at all is [`TariffError::MissingData`].
    pub fn assemble_timeseries(
        &self,
        country: &str,
        category: &str,
        labels: &[ComponentLabel],
        years: &[&str],
    ) -> Result<Vec<Series>> {
        self.validate(country, category, years)?;
        let points = self.yearly_points(country, category, years)?;
        Ok(build_series(&points, labels))
    }

    /// Line chart over every year of the dataset for the default component set,
    /// with a warning for each year where the tax aggregate diverges from the
    /// sum of the tax components.
    pub fn evolution_chart(&self, country: &str, category: &str) -> Result<Chart> {
        let years = DomainQuery::new(self.conn).years()?;
        let years: Vec<&str> = years.iter().map(String::as_str).collect();
        self.validate(country, category, &years)?;

        let points = self.yearly_points(country, category, &years)?;
        let series = build_series(&points, &SINGLE_COMPONENTS);
        let warnings = tax_aggregate_mismatches(&points, self.settings.tolerance);
        for w in &warnings {
            warn!(
                country,
                category,
                year = %w.key,
                computed = w.computed,
                reported = w.reported,
                "tax aggregate does not match its components"
            );
        }

        let mut metadata = ChartMetadata::new(
            format!(
                "Electricity tariff evolution by component in {} for {}",
                country, category
            ),
            &self.settings.font_family,
        );
        metadata.x_axis_title = Some("Year".to_string());
        metadata.y_axis_title = Some("EUR/kWh".to_string());
        metadata.legend_title = Some("Component".to_string());
        metadata.source = Some(COMPOSITION_SOURCE.to_string());
        metadata.notes = EVOLUTION_NOTES.iter().map(|n| n.to_string()).collect();

        Ok(Chart {
            kind: ChartKind::Line,
            metadata,
            series,
            warnings,
        })
    }

    fn validate(&self, country: &str, category: &str, years: &[&str]) -> Result<()> {
        self.conn.ensure_tables(&[PRICE_TABLE])?;
        let domain = DomainQuery::new(self.conn);
        domain.require_country(country)?;
        domain.require_composition_category(category)?;
        if years.is_empty() {
            return Err(TariffError::InvalidArgument("no years requested".to_string()));
        }
        for year in years {
            domain.require_year(year)?;
        }
        Ok(())
    }

    fn yearly_points(&self, country: &str, category: &str, years: &[&str]) -> Result<PointsByLabel> {
        let (sql, params) = SqlBuilder::new(PRICE_TABLE)
            .select(&["nrg_prc", "period", "value"])
            .where_eq("country", country)
            .where_eq("nrg_cons", category)
            .where_in("period", years)
            .order_by(&[PERIOD_ORDER, "nrg_prc ASC"])
            .build();
        let rows: Vec<YearValue> = self.conn.execute_into(&sql, &params)?;
        if rows.is_empty() {
            return Err(TariffError::MissingData(format!(
                "no price components for {} {} in {}",
                country,
                category,
                years.join(", ")
            )));
        }
        debug!(country, category, rows = rows.len(), "loaded yearly component values");

        let mut points = PointsByLabel::new();
        for row in rows {
            points
                .entry(row.nrg_prc)
                .or_default()
                .push(DataPoint::new(row.period, row.value));
        }
        Ok(points)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_series(points: &PointsByLabel, labels: &[ComponentLabel]) -> Vec<Series> {
    let mut seen = HashSet::new();
    let mut series: Vec<Series> = labels
        .iter()
        .copied()
        .filter(|label| !label.is_aggregate() && seen.insert(*label))
        .filter_map(|label| {
            let observed = points.get(label.label()).filter(|p| !p.is_empty())?;
            Some(Series {
                name: label.label().to_string(),
                label: label.label().to_string(),
                role: SeriesRole::Component,
                sign: None,
                color: label.style().positive.to_string(),
                stroke: StrokeStyle::Solid,
                points: observed.clone(),
            })
        })
        .collect();

    let aggregate = ComponentLabel::TaxesFeesLeviesAndCharges;
    if let Some(observed) = points.get(aggregate.label()).filter(|p| !p.is_empty()) {
        series.push(Series {
            name: aggregate.label().to_string(),
            label: aggregate.label().to_string(),
            role: SeriesRole::Aggregate,
            sign: None,
            color: AGGREGATE_COLOR.to_string(),
            stroke: StrokeStyle::Dashed,
            points: observed.clone(),
        });
    }

    series
}

fn tax_aggregate_mismatches(points: &PointsByLabel, tolerance: f64) -> Vec<ReconciliationMismatch> {
    let aggregate = match points.get(ComponentLabel::TaxesFeesLeviesAndCharges.label()) {
        Some(p) => p,
        None => return Vec::new(),
    };

    let mut tax_sums: HashMap<&str, f64> = HashMap::new();
    for (label, observed) in points {
        let is_tax = ComponentLabel::from_label(label).is_some_and(ComponentLabel::is_tax);
        if !is_tax {
            continue;
        }
        for p in observed {
            *tax_sums.entry(p.x.as_str()).or_default() += p.y;
        }
    }

    aggregate
        .iter()
        .filter_map(|p| {
            let computed = tax_sums.get(p.x.as_str()).copied().unwrap_or(0.0);
            ReconciliationMismatch::check(MismatchKind::TaxAggregate, &p.x, computed, p.y, tolerance)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(entries: &[(&str, &[(&str, f64)])]) -> PointsByLabel {
        entries
            .iter()
            .map(|(label, pts)| {
                (
                    label.to_string(),
                    pts.iter().map(|(x, y)| DataPoint::new(*x, *y)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn build_series_skips_unobserved_labels_and_appends_dashed_aggregate() {
        let pts = points(&[
            ("Network costs", &[("2021", 0.07), ("2022", 0.08)]),
            ("Taxes, fees, levies and charges", &[("2022", 0.05)]),
        ]);
        let series = build_series(
            &pts,
            &[ComponentLabel::NetworkCosts, ComponentLabel::NuclearTaxes],
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "Network costs");
        assert_eq!(series[0].color, "navy");
        assert_eq!(series[1].role, SeriesRole::Aggregate);
        assert_eq!(series[1].stroke, StrokeStyle::Dashed);
    }

    #[test]
    fn aggregate_in_labels_is_not_duplicated() {
        let pts = points(&[("Taxes, fees, levies and charges", &[("2022", 0.05)])]);
        let series = build_series(&pts, &[ComponentLabel::TaxesFeesLeviesAndCharges]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].stroke, StrokeStyle::Dashed);
    }

    #[test]
    fn tax_mismatch_ignores_energy_and_network() {
        let pts = points(&[
            ("Energy and supply", &[("2022", 0.30)]),
            ("Value added tax (VAT)", &[("2022", 0.04)]),
            ("Other allowance", &[("2022", -0.01)]),
            ("Taxes, fees, levies and charges", &[("2022", 0.03)]),
        ]);
        assert!(tax_aggregate_mismatches(&pts, 0.001).is_empty());

        let pts = points(&[
            ("Value added tax (VAT)", &[("2022", 0.04)]),
            ("Taxes, fees, levies and charges", &[("2022", 0.06)]),
        ]);
        let flags = tax_aggregate_mismatches(&pts, 0.001);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].key, "2022");
    }
}
