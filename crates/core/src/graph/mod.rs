pub mod dependency;
pub mod error;

pub use dependency::DependencyGraph;
pub use error::EdgeNotFound;
