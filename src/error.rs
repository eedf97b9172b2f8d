#[derive(Debug, thiserror::Error)]
pub enum TariffError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Unknown period: {0}")]
    UnknownPeriod(String),

    #[error("Unknown consumption category: {0}")]
    UnknownCategory(String),

    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    #[error("Unknown tax label: {0}")]
    UnknownTax(String),

    #[error("Unknown price component: {0}")]
    UnknownComponent(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, TariffError>;
