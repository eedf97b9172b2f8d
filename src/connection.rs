//! DuckDB connection wrapper holding the long-format tariff tables.
//!
//! Both datasets are stored long, one row per `(identifiers, period, value)`:
//! - `price_components(country, nrg_cons, nrg_prc, period, value)`
//! - `aggregate_prices(country, tax, nrg_cons, period, value)`
//!
//! Missing values are never stored, so a period without a row is "missing".

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use duckdb::{params, types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{AGGREGATE_ID_COLUMNS, AGGREGATE_TABLE, PRICE_ID_COLUMNS, PRICE_TABLE};
use crate::error::{Result, TariffError};
use crate::models::{AggregateRecord, PriceRecord};

/// Identifier columns of a known long table, or `None` for any other name.
fn long_table_columns(table: &str) -> Option<&'static [&'static str]> {
    match table {
        PRICE_TABLE => Some(&PRICE_ID_COLUMNS),
        AGGREGATE_TABLE => Some(&AGGREGATE_ID_COLUMNS),
        _ => None,
    }
}

fn quoted(cols: &[&str]) -> String {
    cols.iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Wraps an in-memory DuckDB database holding the tariff tables.
///
/// Tables are created on first use and filled once when the explorer is
/// built; every query afterwards is read-only.
#[derive(Debug)]
pub struct Connection {
    conn: DuckDbConnection,
    registered_tables: RefCell<HashSet<String>>,
}

impl Connection {
    /// Open an empty in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self {
            conn,
            registered_tables: RefCell::new(HashSet::new()),
        })
    }

    /// Ensure one or more long tables exist, creating them empty if needed.
    ///
    /// Only [`PRICE_TABLE`] and [`AGGREGATE_TABLE`] can be created this way.
    pub fn ensure_tables(&self, tables: &[&str]) -> Result<()> {
        for name in tables {
            if !self.registered_tables.borrow().contains(*name) {
                self.create_long_table(name)?;
            }
        }
        Ok(())
    }

    /// Append composition rows, one long row per finite year value.
    ///
    /// `None`, NaN and infinite values are treated as missing.
    ///
    /// Returns the number of long rows stored.
    pub fn load_price_records(&self, records: &[PriceRecord]) -> Result<usize> {
        self.ensure_tables(&[PRICE_TABLE])?;

        let mut appender = self.conn.appender(PRICE_TABLE)?;
        let mut loaded = 0;
        for record in records {
            for (period, value) in &record.values {
                if let Some(value) = value.filter(|v| v.is_finite()) {
                    appender.append_row(params![
                        record.country,
                        record.consumption_category,
                        record.price_component.label(),
                        period,
                        value
                    ])?;
                    loaded += 1;
                }
            }
        }
        appender.flush()?;

        debug!(table = PRICE_TABLE, records = records.len(), rows = loaded, "loaded price records");
        Ok(loaded)
    }

    /// Append cross-country rows, one long row per finite period value.
    pub fn load_aggregate_records(&self, records: &[AggregateRecord]) -> Result<usize> {
        self.ensure_tables(&[AGGREGATE_TABLE])?;

        let mut appender = self.conn.appender(AGGREGATE_TABLE)?;
        let mut loaded = 0;
        for record in records {
            for (period, value) in &record.values {
                if let Some(value) = value.filter(|v| v.is_finite()) {
                    appender.append_row(params![
                        record.country,
                        record.tax,
                        record.consumption_category,
                        period,
                        value
                    ])?;
                    loaded += 1;
                }
            }
        }
        appender.flush()?;

        debug!(table = AGGREGATE_TABLE, records = records.len(), rows = loaded, "loaded aggregate records");
        Ok(loaded)
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the statement has run
        let (column_names, column_count) = {
            let executed = rows_result.as_ref().ok_or_else(|| {
                TariffError::InvalidArgument(format!("statement did not execute: {}", sql))
            })?;
            let names: Vec<String> = executed
                .column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect();
            (names, executed.column_count())
        };

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_count);
            for (i, col_name) in column_names.iter().enumerate().take(column_count) {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(&self, sql: &str, params: &[String]) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(&self, sql: &str, params: &[String]) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    /// Create a DuckDB table verbatim from a newline-delimited JSON file.
    ///
    /// The long tariff tables cannot be replaced this way; use
    /// [`register_wide_table_from_ndjson`](Self::register_wide_table_from_ndjson).
    pub fn register_table_from_ndjson(&self, table_name: &str, ndjson_path: &str) -> Result<()> {
        if long_table_columns(table_name).is_some() {
            return Err(TariffError::InvalidArgument(format!(
                "{} is a tariff table; load it with register_wide_table_from_ndjson",
                table_name
            )));
        }
        let path_fwd = ndjson_path.replace('\\', "/");
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {}; \
             CREATE TABLE {} AS SELECT * FROM read_json_auto('{}', format='newline_delimited')",
            table_name, table_name, path_fwd
        ))?;
        self.registered_tables.borrow_mut().insert(table_name.to_string());
        Ok(())
    }

    /// Append wide NDJSON rows to a long table by UNPIVOTing the period columns.
    ///
    /// Every column that is not an identifier of `table` is treated as a
    /// period. Null, non-numeric and non-finite cells are dropped. Returns the
    /// number of long rows inserted.
    pub fn register_wide_table_from_ndjson(&self, table: &str, ndjson_path: &str) -> Result<usize> {
        let id_columns = long_table_columns(table)
            .ok_or_else(|| TariffError::InvalidArgument(format!("not a tariff table: {}", table)))?;
        self.ensure_tables(&[table])?;

        let path_fwd = ndjson_path.replace('\\', "/");
        let source = format!("read_json_auto('{}', format='newline_delimited')", path_fwd);

        let mut period_cols: Vec<String> = Vec::new();
        {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT column_name FROM (DESCRIBE SELECT * FROM {})",
                source
            ))?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let col: String = row.get(0)?;
                if !id_columns.contains(&col.as_str()) {
                    period_cols.push(col);
                }
            }
        }

        if period_cols.is_empty() {
            return Err(TariffError::InvalidArgument(format!(
                "{} has no period columns",
                ndjson_path
            )));
        }

        let ids = quoted(id_columns);
        let casts = period_cols
            .iter()
            .map(|c| format!("TRY_CAST(\"{}\" AS DOUBLE) AS \"{}\"", c, c))
            .collect::<Vec<_>>()
            .join(", ");
        let period_list = period_cols
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");

        let inserted = self.conn.execute(
            &format!(
                "INSERT INTO {table} \
                 SELECT {ids}, period, value FROM (\
                   UNPIVOT (SELECT {ids}, {casts} FROM {source}) \
                   ON {period_list} \
                   INTO NAME period VALUE value\
                 ) WHERE value IS NOT NULL AND isfinite(value)",
                table = table,
                ids = ids,
                casts = casts,
                source = source,
                period_list = period_list,
            ),
            [],
        )?;

        debug!(table, periods = period_cols.len(), rows = inserted, "unpivoted wide table");
        Ok(inserted)
    }

    /// Check whether a table has been registered.
    pub fn has_table(&self, name: &str) -> bool {
        self.registered_tables.borrow().contains(name)
    }

    /// Return all registered table names, sorted.
    pub fn tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registered_tables.borrow().iter().cloned().collect();
        names.sort();
        names
    }

    fn create_long_table(&self, table: &str) -> Result<()> {
        let id_columns = long_table_columns(table)
            .ok_or_else(|| TariffError::InvalidArgument(format!("not a tariff table: {}", table)))?;

        let cols = id_columns
            .iter()
            .map(|c| format!("\"{}\" VARCHAR NOT NULL", c))
            .collect::<Vec<_>>()
            .join(", ");
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({}, period VARCHAR NOT NULL, value DOUBLE NOT NULL)",
            table, cols
        ))?;
        self.registered_tables.borrow_mut().insert(table.to_string());
        debug!(table, "created long table");
        Ok(())
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UBigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(i) => serde_json::Value::Number(i.into()),
            Err(_) => serde_json::Value::String(n.to_string()),
        },
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => serde_json::Value::String(String::from_utf8_lossy(bytes).to_string()),
        // Dates, lists, structs and the like never appear in the tariff tables
        _ => serde_json::Value::Null,
    }
}
