pub mod chart;
pub mod component;
pub mod matrix;
pub mod ranking;
pub mod record;

pub use chart::*;
pub use component::*;
pub use matrix::*;
pub use ranking::*;
pub use record::*;
