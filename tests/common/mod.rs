//! Shared test fixtures for the tariff explorer integration tests.
//!
//! Provides a small composition dataset (AT, DE, FR over 2021-2022) and a
//! cross-country dataset (half-year periods plus one full year), either
//! loaded through the builder or written as wide NDJSON temp files and
//! UNPIVOTed by the connection.
//!
//! Notable cells:
//! - DE 2021 Household: the tax aggregate (0.12) exceeds its components (0.10).
//! - FR 2022 Household: the reported retail price (0.25) exceeds the sum of
//!   components (0.23).
//! - AT only has 2021 values.

#![allow(dead_code)]

use std::io::Write;

use tariff_explorer::config::{AGGREGATE_TABLE, PRICE_TABLE};
use tariff_explorer::models::{AggregateRecord, ComponentLabel, PriceRecord};
use tariff_explorer::{Connection, TariffExplorer, TariffExplorerBuilder};
use tempfile::NamedTempFile;

pub const ALL_TAXES: &str = "All taxes and levies included";
pub const EXCL_VAT: &str = "Excluding VAT and other recoverable taxes and levies";

/// Route `tracing` output through the test harness; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Explorer built from the sample records with default settings.
pub fn setup_explorer() -> TariffExplorer {
    setup_explorer_with(TariffExplorer::builder())
}

/// Explorer built from the sample records on top of a configured builder.
pub fn setup_explorer_with(builder: TariffExplorerBuilder) -> TariffExplorer {
    init_tracing();
    builder
        .price_records(sample_price_records())
        .aggregate_records(sample_aggregate_records())
        .build()
        .unwrap()
}

/// Connection whose tables were filled from wide NDJSON files.
pub fn setup_ndjson_connection() -> Connection {
    init_tracing();
    let conn = Connection::open_in_memory().unwrap();

    let prices: Vec<serde_json::Value> = sample_price_records()
        .iter()
        .map(|r| serde_json::to_value(r).unwrap())
        .collect();
    write_ndjson_and_unpivot(&conn, PRICE_TABLE, &prices);

    let aggregates: Vec<serde_json::Value> = sample_aggregate_records()
        .iter()
        .map(|r| serde_json::to_value(r).unwrap())
        .collect();
    write_ndjson_and_unpivot(&conn, AGGREGATE_TABLE, &aggregates);

    conn
}

pub fn sample_price_records() -> Vec<PriceRecord> {
    use ComponentLabel::*;

    let row = |country: &str, category: &str, component: ComponentLabel, y2021: Option<f64>, y2022: Option<f64>| {
        PriceRecord::new(country, category, component)
            .with_value("2021", y2021)
            .with_value("2022", y2022)
    };

    vec![
        // -- DE ---------------------------------------------------------------
        row("DE", "Household", EnergyAndSupply, Some(0.15), Some(0.20)),
        row("DE", "Household", NetworkCosts, Some(0.08), Some(0.09)),
        row("DE", "Household", Vat, Some(0.04), Some(0.05)),
        row("DE", "Household", RenewableTaxes, Some(0.04), Some(0.03)),
        row("DE", "Household", EnvironmentalTaxes, Some(0.02), Some(0.02)),
        row("DE", "Household", OtherAllowance, None, Some(-0.01)),
        row("DE", "Household", TaxesFeesLeviesAndCharges, Some(0.12), Some(0.09)),
        row("DE", "Small firms", EnergyAndSupply, Some(0.12), Some(0.18)),
        row("DE", "Small firms", NetworkCosts, Some(0.05), Some(0.05)),
        row("DE", "Small firms", Vat, Some(0.03), Some(0.04)),
        row("DE", "Small firms", RenewableTaxes, Some(0.03), Some(-0.02)),
        row("DE", "Small firms", EnvironmentalTaxes, Some(0.01), Some(0.01)),
        row("DE", "Small firms", OtherAllowance, None, None),
        row("DE", "Small firms", TaxesFeesLeviesAndCharges, Some(0.07), Some(0.03)),
        // -- FR ---------------------------------------------------------------
        row("FR", "Household", EnergyAndSupply, None, Some(0.12)),
        row("FR", "Household", NetworkCosts, None, Some(0.06)),
        row("FR", "Household", Vat, None, Some(0.04)),
        row("FR", "Household", NuclearTaxes, None, Some(0.01)),
        row("FR", "Household", TaxesFeesLeviesAndCharges, None, Some(0.05)),
        row("FR", "Small firms", EnergyAndSupply, None, Some(0.10)),
        row("FR", "Small firms", NetworkCosts, None, Some(0.04)),
        // -- AT ---------------------------------------------------------------
        row("AT", "Household", EnergyAndSupply, Some(0.14), None),
        row("AT", "Household", NetworkCosts, Some(0.07), None),
    ]
}

pub fn sample_aggregate_records() -> Vec<AggregateRecord> {
    let row = |country: &str, tax: &str, category: &str, values: &[(&str, Option<f64>)]| {
        values
            .iter()
            .fold(AggregateRecord::new(country, tax, category), |r, (p, v)| {
                r.with_value(*p, *v)
            })
    };

    vec![
        row("DE", ALL_TAXES, "Household", &[("2021", Some(0.33)), ("2022-S1", Some(0.37)), ("2022-S2", Some(0.39))]),
        row("DE", ALL_TAXES, "Small firms", &[("2022-S1", Some(0.26)), ("2022-S2", Some(0.26))]),
        row("DE", ALL_TAXES, "Band DC", &[("2022-S1", Some(0.40)), ("2022-S2", Some(0.40))]),
        row("FR", ALL_TAXES, "Household", &[("2022-S1", Some(0.25)), ("2022-S2", Some(0.25))]),
        row("AT", ALL_TAXES, "Household", &[("2022-S1", Some(0.30))]),
        row("ES", ALL_TAXES, "Household", &[("2022-S1", Some(0.30)), ("2022-S2", None)]),
        row("DE", EXCL_VAT, "Household", &[("2022-S1", Some(0.32))]),
        row("FR", EXCL_VAT, "Household", &[("2022-S1", Some(0.21))]),
    ]
}

/// Write JSON rows as NDJSON to a temp file and UNPIVOT them into `table`.
fn write_ndjson_and_unpivot(conn: &Connection, table: &str, rows: &[serde_json::Value]) {
    let mut file = NamedTempFile::new().unwrap();
    for row in rows {
        writeln!(file, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    file.flush().unwrap();

    conn.register_wide_table_from_ndjson(table, file.path().to_str().unwrap())
        .unwrap();
    // DuckDB has copied the rows into its own table, so the temp file can go.
}

/// Approximate float comparison used across the suites.
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
