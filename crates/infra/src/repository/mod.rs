//! Sale persistence boundary.
//!
//! The workflow talks to storage only through [`SaleRepository`]; the in-memory
//! adapter backs tests, benchmarks and local runs.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemorySaleRepository;
pub use r#trait::{RepositoryError, SaleRepository};
