pub mod analytics;
pub mod contract;
pub mod recommendation;
pub mod series;
