//! Cross-country comparison for one tax/period/category selection.

use serde::Deserialize;
use tracing::debug;

use crate::config::{
    Settings, AGGREGATE_TABLE, FALLBACK_POSITIVE_COLOR, RANKING_BAR_WIDTH, RANKING_CHART_HEIGHT,
    RANKING_SOURCE,
};
use crate::connection::Connection;
use crate::error::{Result, TariffError};
use crate::models::{
    Chart, ChartKind, ChartMetadata, DataPoint, RankedEntry, Ranking, Series, SeriesRole,
    StrokeStyle,
};
use crate::queries::domain::DomainQuery;
use crate::sql_builder::SqlBuilder;

#[derive(Debug, Deserialize)]
struct CountryValue {
    country: String,
    price: f64,
}

// ---------------------------------------------------------------------------
// RankingQuery
// ---------------------------------------------------------------------------

/// Query interface for ranking countries in the cross-country dataset.
pub struct RankingQuery<'a> {
    conn: &'a Connection,
    settings: &'a Settings,
}

impl<'a> RankingQuery<'a> {
    pub fn new(conn: &'a Connection, settings: &'a Settings) -> Self {
        Self { conn, settings }
    }

    /// Rank countries by their `category` value for `tax` in `period`.
    ///
    /// Sorted ascending by value, ties broken by country code. Countries
    /// without a value for the selection are left out; duplicate cells are
    /// averaged.
    pub fn rank_countries(&self, tax: &str, period: &str, category: &str) -> Result<Ranking> {
        self.conn.ensure_tables(&[AGGREGATE_TABLE])?;
        let domain = DomainQuery::new(self.conn);
        domain.require_period(period)?;
        domain.require_aggregate_category(category)?;
        domain.require_tax(tax)?;

        let (sql, params) = SqlBuilder::new(AGGREGATE_TABLE)
            .select(&["country", "AVG(value) AS price"])
            .where_eq("tax", tax)
            .where_eq("nrg_cons", category)
            .where_eq("period", period)
            .group_by(&["country"])
            .order_by(&["price ASC", "country ASC"])
            .build();

        let rows: Vec<CountryValue> = self.conn.execute_into(&sql, &params)?;
        if rows.is_empty() {
            return Err(TariffError::MissingData(format!(
                "no {} values for {} in {}",
                tax, category, period
            )));
        }

        let entries = rows
            .into_iter()
            .enumerate()
            .map(|(i, r)| RankedEntry {
                rank: i + 1,
                country: r.country,
                value: r.price,
            })
            .collect::<Vec<_>>();
        debug!(tax, period, category, countries = entries.len(), "ranked countries");

        Ok(Ranking {
            tax: tax.to_string(),
            period: period.to_string(),
            category: category.to_string(),
            entries,
        })
    }

    /// Horizontal bar chart of the ranking, cheapest country first.
    pub fn ranking_chart(&self, tax: &str, period: &str, category: &str) -> Result<Chart> {
        let ranking = self.rank_countries(tax, period, category)?;

        let points = ranking
            .entries
            .iter()
            .map(|e| DataPoint::new(e.country.clone(), e.value))
            .collect();
        let series = Series {
            name: category.to_string(),
            label: category.to_string(),
            role: SeriesRole::Ranking,
            sign: None,
            color: FALLBACK_POSITIVE_COLOR.to_string(),
            stroke: StrokeStyle::Solid,
            points,
        };

        let mut metadata = ChartMetadata::new(
            format!("Retail Electricity Price for {}, {}, in {}", category, tax, period),
            &self.settings.font_family,
        );
        metadata.x_axis_title = Some("Electricity Price in €/KWh".to_string());
        metadata.y_axis_title = Some("Country".to_string());
        metadata.height = Some(RANKING_CHART_HEIGHT);
        metadata.bar_width = Some(RANKING_BAR_WIDTH);
        metadata.source = Some(RANKING_SOURCE.to_string());

        Ok(Chart {
            kind: ChartKind::HorizontalBar,
            metadata,
            series: vec![series],
            warnings: Vec::new(),
        })
    }
}
