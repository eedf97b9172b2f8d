//! Query modules for the tariff explorer.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection) (and, where charts are built,
//! the explorer [`Settings`](crate::config::Settings)) and exposes methods
//! returning `Result<T>`. None of them writes to the tables.

pub mod composition;
pub mod domain;
pub mod evolution;
pub mod ranking;

pub use composition::CompositionQuery;
pub use domain::{DefaultSelections, DomainQuery};
pub use evolution::EvolutionQuery;
pub use ranking::RankingQuery;
