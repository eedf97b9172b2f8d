//! Async wrapper around [`TariffExplorer`] for use in async runtimes (Tokio, etc.).
//!
//! Runs every explorer call on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free for the
//! presentation layer.
//!
//! # Example
//!
//! ```no_run
//! use tariff_explorer::{AsyncTariffExplorer, TariffExplorer};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let explorer = AsyncTariffExplorer::build(TariffExplorer::builder()).await.unwrap();
//!
//!     let chart = explorer.composition_chart("DE", "2022").await.unwrap();
//!
//!     // Any sync method via closure
//!     let years = explorer.run(|e| e.domain().years()).await.unwrap();
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Result, TariffError};
use crate::models::Chart;
use crate::{TariffExplorer, TariffExplorerBuilder};

/// Async wrapper around [`TariffExplorer`].
///
/// The explorer is protected by a [`Mutex`] since its table registry uses
/// `RefCell` internally, so calls are serialized.
#[derive(Clone)]
pub struct AsyncTariffExplorer {
    inner: Arc<Mutex<TariffExplorer>>,
}

impl AsyncTariffExplorer {
    /// Build the explorer on the blocking thread pool.
    pub async fn build(builder: TariffExplorerBuilder) -> Result<Self> {
        tokio::task::spawn_blocking(move || {
            let explorer = builder.build()?;
            Ok(Self::new(explorer))
        })
        .await
        .map_err(|e| TariffError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Wrap an already built explorer.
    pub fn new(explorer: TariffExplorer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(explorer)),
        }
    }

    /// Run a sync explorer operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&TariffExplorer) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let explorer = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = explorer
                .lock()
                .map_err(|_| TariffError::InvalidArgument("explorer lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| TariffError::InvalidArgument(format!("Task join error: {e}")))?
    }

    pub async fn composition_chart(&self, country: &str, year: &str) -> Result<Chart> {
        let (country, year) = (country.to_string(), year.to_string());
        self.run(move |e| e.compositions().composition_chart(&country, &year))
            .await
    }

    pub async fn ranking_chart(&self, tax: &str, period: &str, category: &str) -> Result<Chart> {
        let (tax, period, category) = (tax.to_string(), period.to_string(), category.to_string());
        self.run(move |e| e.rankings().ranking_chart(&tax, &period, &category))
            .await
    }

    pub async fn evolution_chart(&self, country: &str, category: &str) -> Result<Chart> {
        let (country, category) = (country.to_string(), category.to_string());
        self.run(move |e| e.evolution().evolution_chart(&country, &category))
            .await
    }

    /// Execute a raw SQL query asynchronously.
    pub async fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let query = query.to_string();
        let params = params.to_vec();
        self.run(move |e| e.sql(&query, &params)).await
    }
}
