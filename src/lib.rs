//! Electricity tariff explorer.
//!
//! Turns two long-format tariff datasets into chart-ready structures:
//! the signed composition of the price for one country/year, a cross-country
//! ranking for one tax/period/category, and the evolution of each component
//! for one country/category. Records are loaded once into an in-memory DuckDB
//! database and every query afterwards is a read-only projection.
//!
//! # Quick start
//!
//! ```no_run
//! use tariff_explorer::models::{ComponentLabel, PriceRecord};
//! use tariff_explorer::TariffExplorer;
//!
//! let explorer = TariffExplorer::builder()
//!     .price_records(vec![
//!         PriceRecord::new("DE", "Household", ComponentLabel::EnergyAndSupply)
//!             .with_value("2022", 0.21),
//!     ])
//!     .build()
//!     .unwrap();
//!
//! let chart = explorer.compositions().composition_chart("DE", "2022").unwrap();
//! println!("{}", serde_json::to_string_pretty(&chart).unwrap());
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod queries;
pub mod sql_builder;
pub mod stacking;

#[cfg(feature = "async")]
pub use async_client::AsyncTariffExplorer;
pub use config::Settings;
pub use connection::Connection;
pub use error::{Result, TariffError};
pub use sql_builder::SqlBuilder;

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::models::{AggregateRecord, PriceRecord};

// ---------------------------------------------------------------------------
// TariffExplorerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`TariffExplorer`] instance.
///
/// Use [`TariffExplorer::builder()`] to obtain a builder, hand it the parsed
/// records, and call [`build()`](TariffExplorerBuilder::build).
#[derive(Debug, Default)]
pub struct TariffExplorerBuilder {
    price_records: Vec<PriceRecord>,
    aggregate_records: Vec<AggregateRecord>,
    settings: Settings,
}

impl TariffExplorerBuilder {
    /// Rows of the composition dataset (one per country/category/component).
    pub fn price_records(mut self, records: Vec<PriceRecord>) -> Self {
        self.price_records = records;
        self
    }

    /// Rows of the cross-country dataset (one per country/tax/category).
    pub fn aggregate_records(mut self, records: Vec<AggregateRecord>) -> Self {
        self.aggregate_records = records;
        self
    }

    /// Absolute tolerance for reconciliation checks.
    ///
    /// Defaults to [`config::DEFAULT_TOLERANCE`].
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.settings.tolerance = tolerance;
        self
    }

    /// Tax label whose cross-country value is the reported final retail price.
    ///
    /// Defaults to [`config::DEFAULT_REPORTED_TOTAL_TAX`].
    pub fn reported_total_tax(mut self, tax: impl Into<String>) -> Self {
        self.settings.reported_total_tax = tax.into();
        self
    }

    /// Map a composition category onto the name the cross-country dataset
    /// uses for the same consumption band.
    pub fn category_alias(
        mut self,
        composition_category: impl Into<String>,
        aggregate_category: impl Into<String>,
    ) -> Self {
        self.settings
            .category_aliases
            .insert(composition_category.into(), aggregate_category.into());
        self
    }

    /// Font family carried in every chart's metadata.
    ///
    /// Defaults to [`config::DEFAULT_FONT_FAMILY`].
    pub fn font_family(mut self, font_family: impl Into<String>) -> Self {
        self.settings.font_family = font_family.into();
        self
    }

    /// Build the explorer, loading every record into a fresh in-memory database.
    ///
    /// This is the only write to the tables; loading must finish before any
    /// query runs.
    pub fn build(self) -> Result<TariffExplorer> {
        let conn = Connection::open_in_memory()?;
        self.build_with(conn)
    }

    /// Build the explorer on top of an existing connection, e.g. one whose
    /// tables were filled from NDJSON files.
    pub fn build_with(self, conn: Connection) -> Result<TariffExplorer> {
        if !self.settings.tolerance.is_finite() || self.settings.tolerance < 0.0 {
            return Err(TariffError::InvalidArgument(format!(
                "tolerance must be a non-negative number, got {}",
                self.settings.tolerance
            )));
        }

        let prices = conn.load_price_records(&self.price_records)?;
        let aggregates = conn.load_aggregate_records(&self.aggregate_records)?;
        debug!(prices, aggregates, "tariff explorer ready");

        Ok(TariffExplorer {
            conn,
            settings: self.settings,
        })
    }
}

// ---------------------------------------------------------------------------
// TariffExplorer
// ---------------------------------------------------------------------------

/// The main entry point of the crate.
///
/// Wraps a [`Connection`] and the explorer [`Settings`], and exposes the
/// query interfaces as lightweight borrowing wrappers.
#[derive(Debug)]
pub struct TariffExplorer {
    conn: Connection,
    settings: Settings,
}

impl TariffExplorer {
    /// Create a new builder for configuring the explorer.
    pub fn builder() -> TariffExplorerBuilder {
        TariffExplorerBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the selection domains (countries, years, taxes, periods, categories).
    pub fn domain(&self) -> queries::DomainQuery<'_> {
        queries::DomainQuery::new(&self.conn)
    }

    /// Access the per-country composition interface.
    pub fn compositions(&self) -> queries::CompositionQuery<'_> {
        queries::CompositionQuery::new(&self.conn, &self.settings)
    }

    /// Access the cross-country ranking interface.
    pub fn rankings(&self) -> queries::RankingQuery<'_> {
        queries::RankingQuery::new(&self.conn, &self.settings)
    }

    /// Access the component evolution interface.
    pub fn evolution(&self) -> queries::EvolutionQuery<'_> {
        queries::EvolutionQuery::new(&self.conn, &self.settings)
    }

    // -- Metadata and utility methods --------------------------------------

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Return the names of the registered DuckDB tables.
    pub fn tables(&self) -> Vec<String> {
        self.conn.tables()
    }

    /// Execute a raw SQL query against the DuckDB database.
    ///
    /// Escape hatch for questions the query interfaces do not cover.
    ///
    /// # Arguments
    ///
    /// * `query` - SQL string with `?` positional placeholders.
    /// * `params` - Parameter values corresponding to the placeholders.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Return a reference to the underlying [`Connection`].
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for TariffExplorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TariffExplorer(tables=[{}], tolerance={})",
            self.conn.tables().join(", "),
            self.settings.tolerance
        )
    }
}
