//! Signed stacked composition of the electricity price for one country/year.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{
    Settings, AGGREGATE_TABLE, COMPOSITION_NOTES, COMPOSITION_SOURCE, PRICE_TABLE,
};
use crate::connection::Connection;
use crate::error::{Result, TariffError};
use crate::models::{
    Chart, ChartKind, ChartMetadata, ComponentLabel, CompositionMatrix, MismatchKind,
    ReconciliationMismatch,
};
use crate::queries::domain::DomainQuery;
use crate::sql_builder::SqlBuilder;
use crate::stacking::split_signed_series;

#[derive(Debug, Deserialize)]
struct CellRow {
    nrg_cons: String,
    nrg_prc: String,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct CategoryValue {
    nrg_cons: String,
    period: String,
    value: f64,
}

// ---------------------------------------------------------------------------
// CompositionQuery
// ---------------------------------------------------------------------------

/// Query interface for the per-category price breakdown of one country/year.
pub struct CompositionQuery<'a> {
    conn: &'a Connection,
    settings: &'a Settings,
}

impl<'a> CompositionQuery<'a> {
    pub fn new(conn: &'a Connection, settings: &'a Settings) -> Self {
        Self { conn, settings }
    }

    /// Pivot the composition rows of `country` for `year` into a
    /// category × component matrix.
    ///
    /// The "Taxes, fees, levies and charges" row is left out because it
    /// already sums the individual tax components.
    pub fn reshape_composition(&self, country: &str, year: &str) -> Result<CompositionMatrix> {
        self.conn.ensure_tables(&[PRICE_TABLE])?;
        let domain = DomainQuery::new(self.conn);
        domain.require_country(country)?;
        domain.require_year(year)?;

        let (sql, params) = SqlBuilder::new(PRICE_TABLE)
            .select(&["nrg_cons", "nrg_prc", "value"])
            .where_eq("country", country)
            .where_eq("period", year)
            .where_ne("nrg_prc", ComponentLabel::TaxesFeesLeviesAndCharges.label())
            .order_by(&["nrg_cons ASC", "nrg_prc ASC"])
            .build();

        let rows: Vec<CellRow> = self.conn.execute_into(&sql, &params)?;
        if rows.is_empty() {
            return Err(TariffError::MissingData(format!(
                "no price components for {} in {}",
                country, year
            )));
        }

        let cells = rows
            .into_iter()
            .map(|r| -> Result<(String, ComponentLabel, f64)> {
                Ok((r.nrg_cons, r.nrg_prc.parse()?, r.value))
            })
            .collect::<Result<Vec<_>>>()?;

        let matrix = CompositionMatrix::from_cells(country, year, cells);
        debug!(
            country,
            year,
            categories = matrix.categories.len(),
            components = matrix.components.len(),
            "reshaped composition"
        );
        Ok(matrix)
    }

    /// Stacked bar chart of the composition, with the reconciliation marker
    /// and any reconciliation mismatches attached as warnings.
    pub fn composition_chart(&self, country: &str, year: &str) -> Result<Chart> {
        let matrix = self.reshape_composition(country, year)?;
        let series = split_signed_series(&matrix);

        let mut warnings = self.final_price_mismatches(&matrix)?;
        warnings.extend(self.tax_aggregate_mismatches(&matrix)?);
        for w in &warnings {
            warn!(
                country,
                year,
                kind = ?w.kind,
                key = %w.key,
                computed = w.computed,
                reported = w.reported,
                "reconciliation mismatch"
            );
        }

        let mut metadata = ChartMetadata::new(
            format!("Electricity Prices in {}, in {}", country, year),
            &self.settings.font_family,
        );
        metadata.source = Some(COMPOSITION_SOURCE.to_string());
        metadata.notes = COMPOSITION_NOTES.iter().map(|n| n.to_string()).collect();

        Ok(Chart {
            kind: ChartKind::StackedBar,
            metadata,
            series,
            warnings,
        })
    }

    /// Reported final retail price per composition category.
    ///
    /// Read from the cross-country dataset under the configured total tax
    /// label. A full-year period wins; otherwise the half-year periods of that
    /// year are averaged. Categories without a reported value are absent.
    pub fn reported_totals(&self, country: &str, year: &str) -> Result<HashMap<String, f64>> {
        self.conn.ensure_tables(&[AGGREGATE_TABLE])?;

        let s1 = format!("{}-S1", year);
        let s2 = format!("{}-S2", year);
        let (sql, params) = SqlBuilder::new(AGGREGATE_TABLE)
            .select(&["nrg_cons", "period", "AVG(value) AS value"])
            .where_eq("country", country)
            .where_eq("tax", &self.settings.reported_total_tax)
            .where_in("period", &[year, s1.as_str(), s2.as_str()])
            .group_by(&["nrg_cons", "period"])
            .build();
        let rows: Vec<CategoryValue> = self.conn.execute_into(&sql, &params)?;

        let mut full_year: HashMap<&str, f64> = HashMap::new();
        let mut halves: HashMap<&str, Vec<f64>> = HashMap::new();
        for row in &rows {
            if row.period == year {
                full_year.insert(row.nrg_cons.as_str(), row.value);
            } else {
                halves.entry(row.nrg_cons.as_str()).or_default().push(row.value);
            }
        }

        let mut totals = HashMap::new();
        for category in self.composition_categories_for(country)? {
            let aggregate_category = self.settings.aggregate_category(&category);
            let reported = full_year.get(aggregate_category).copied().or_else(|| {
                halves
                    .get(aggregate_category)
                    .map(|v| v.iter().sum::<f64>() / v.len() as f64)
            });
            if let Some(value) = reported {
                totals.insert(category, value);
            }
        }
        Ok(totals)
    }

    fn composition_categories_for(&self, country: &str) -> Result<Vec<String>> {
        let (sql, params) = SqlBuilder::new(PRICE_TABLE)
            .select(&["nrg_cons"])
            .where_eq("country", country)
            .group_by(&["nrg_cons"])
            .order_by(&["nrg_cons ASC"])
            .build();
        let rows = self.conn.execute(&sql, &params)?;
        Ok(rows
            .iter()
            .filter_map(|r| r.get("nrg_cons").and_then(|v| v.as_str()).map(str::to_string))
            .collect())
    }

    fn final_price_mismatches(&self, matrix: &CompositionMatrix) -> Result<Vec<ReconciliationMismatch>> {
        let reported = self.reported_totals(&matrix.country, &matrix.year)?;
        Ok(matrix
            .categories
            .iter()
            .zip(matrix.row_totals())
            .filter_map(|(category, computed)| {
                let reported = *reported.get(category)?;
                ReconciliationMismatch::check(
                    MismatchKind::FinalPrice,
                    category,
                    computed,
                    reported,
                    self.settings.tolerance,
                )
            })
            .collect())
    }

    fn tax_aggregate_mismatches(&self, matrix: &CompositionMatrix) -> Result<Vec<ReconciliationMismatch>> {
        let (sql, params) = SqlBuilder::new(PRICE_TABLE)
            .select(&["nrg_cons", "period", "value"])
            .where_eq("country", &matrix.country)
            .where_eq("period", &matrix.year)
            .where_eq("nrg_prc", ComponentLabel::TaxesFeesLeviesAndCharges.label())
            .build();
        let rows: Vec<CategoryValue> = self.conn.execute_into(&sql, &params)?;
        let aggregates: HashMap<&str, f64> =
            rows.iter().map(|r| (r.nrg_cons.as_str(), r.value)).collect();

        Ok(matrix
            .categories
            .iter()
            .zip(matrix.row_sums(ComponentLabel::is_tax))
            .filter_map(|(category, computed)| {
                let reported = *aggregates.get(category.as_str())?;
                ReconciliationMismatch::check(
                    MismatchKind::TaxAggregate,
                    category,
                    computed,
                    reported,
                    self.settings.tolerance,
                )
            })
            .collect())
    }
}
