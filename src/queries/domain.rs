//! Selection domains of the loaded datasets.
//!
//! Every entry point validates its selection against these domains before any
//! reshaping, so an out-of-domain value fails with a named error instead of
//! producing an empty chart.

use serde::{Deserialize, Serialize};

use crate::config::{AGGREGATE_TABLE, PRICE_TABLE};
use crate::connection::Connection;
use crate::error::{Result, TariffError};
use crate::sql_builder::{SqlBuilder, PERIOD_ORDER};

// ---------------------------------------------------------------------------
// DefaultSelections
// ---------------------------------------------------------------------------

/// Initial selection for each chart: first country, latest year, first tax,
/// latest period and first category of each dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DefaultSelections {
    pub country: Option<String>,
    pub year: Option<String>,
    pub composition_category: Option<String>,
    pub tax: Option<String>,
    pub period: Option<String>,
    pub aggregate_category: Option<String>,
}

// ---------------------------------------------------------------------------
// DomainQuery
// ---------------------------------------------------------------------------

/// Query interface for the distinct values present in each dataset.
pub struct DomainQuery<'a> {
    conn: &'a Connection,
}

impl<'a> DomainQuery<'a> {
    /// Create a new `DomainQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Country codes in the composition dataset, sorted.
    pub fn countries(&self) -> Result<Vec<String>> {
        self.distinct(PRICE_TABLE, "country", "country ASC")
    }

    /// Year columns of the composition dataset, ascending.
    pub fn years(&self) -> Result<Vec<String>> {
        self.distinct(PRICE_TABLE, "period", PERIOD_ORDER)
    }

    /// Consumption categories of the composition dataset, sorted.
    pub fn composition_categories(&self) -> Result<Vec<String>> {
        self.distinct(PRICE_TABLE, "nrg_cons", "nrg_cons ASC")
    }

    /// Tax labels of the cross-country dataset, sorted.
    pub fn taxes(&self) -> Result<Vec<String>> {
        self.distinct(AGGREGATE_TABLE, "tax", "tax ASC")
    }

    /// Period columns of the cross-country dataset, ascending.
    pub fn periods(&self) -> Result<Vec<String>> {
        self.distinct(AGGREGATE_TABLE, "period", PERIOD_ORDER)
    }

    /// Consumption categories of the cross-country dataset, sorted.
    pub fn aggregate_categories(&self) -> Result<Vec<String>> {
        self.distinct(AGGREGATE_TABLE, "nrg_cons", "nrg_cons ASC")
    }

    pub fn default_selections(&self) -> Result<DefaultSelections> {
        Ok(DefaultSelections {
            country: self.countries()?.into_iter().next(),
            year: self.years()?.pop(),
            composition_category: self.composition_categories()?.into_iter().next(),
            tax: self.taxes()?.into_iter().next(),
            period: self.periods()?.pop(),
            aggregate_category: self.aggregate_categories()?.into_iter().next(),
        })
    }

    // -- Membership checks -------------------------------------------------

    pub fn require_country(&self, country: &str) -> Result<()> {
        if self.contains(PRICE_TABLE, "country", country)? {
            Ok(())
        } else {
            Err(TariffError::UnknownCountry(country.to_string()))
        }
    }

    pub fn require_year(&self, year: &str) -> Result<()> {
        if self.contains(PRICE_TABLE, "period", year)? {
            Ok(())
        } else {
            Err(TariffError::UnknownPeriod(year.to_string()))
        }
    }

    pub fn require_composition_category(&self, category: &str) -> Result<()> {
        if self.contains(PRICE_TABLE, "nrg_cons", category)? {
            Ok(())
        } else {
            Err(TariffError::UnknownCategory(category.to_string()))
        }
    }

    pub fn require_tax(&self, tax: &str) -> Result<()> {
        if self.contains(AGGREGATE_TABLE, "tax", tax)? {
            Ok(())
        } else {
            Err(TariffError::UnknownTax(tax.to_string()))
        }
    }

    pub fn require_period(&self, period: &str) -> Result<()> {
        if self.contains(AGGREGATE_TABLE, "period", period)? {
            Ok(())
        } else {
            Err(TariffError::UnknownPeriod(period.to_string()))
        }
    }

    pub fn require_aggregate_category(&self, category: &str) -> Result<()> {
        if self.contains(AGGREGATE_TABLE, "nrg_cons", category)? {
            Ok(())
        } else {
            Err(TariffError::UnknownCategory(category.to_string()))
        }
    }

    // -- Helpers -----------------------------------------------------------

    fn distinct(&self, table: &str, column: &str, order: &str) -> Result<Vec<String>> {
        self.conn.ensure_tables(&[table])?;

        let (sql, params) = SqlBuilder::new(table)
            .select(&[column])
            .group_by(&[column])
            .order_by(&[order])
            .build();

        let rows = self.conn.execute(&sql, &params)?;
        Ok(rows
            .iter()
            .filter_map(|r| r.get(column).and_then(|v| v.as_str()).map(str::to_string))
            .collect())
    }

    fn contains(&self, table: &str, column: &str, value: &str) -> Result<bool> {
        self.conn.ensure_tables(&[table])?;

        let (sql, params) = SqlBuilder::new(table)
            .select(&["COUNT(*) AS cnt"])
            .where_eq(column, value)
            .build();

        let cnt = self
            .conn
            .execute_scalar(&sql, &params)?
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        Ok(cnt > 0)
    }
}
