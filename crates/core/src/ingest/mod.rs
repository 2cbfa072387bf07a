pub mod source;
pub mod types;

pub use source::{InMemorySeriesSource, SeriesSource};
