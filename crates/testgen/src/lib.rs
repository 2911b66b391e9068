//! Random execution-sequence generation for exercising the sorters.

pub mod generator;
