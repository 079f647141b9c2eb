//! Read models maintained from dispatched sale events.

pub mod sale_totals;

pub use sale_totals::{SaleTotalsProjection, SaleTotalsReadModel};
