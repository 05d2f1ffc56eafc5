//! Core data structures for observed series.

mod series;

pub use series::{ObservationSeries, TrainTestSplit};
