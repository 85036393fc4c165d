//! Common transport-layer types shared between the backend handlers and the
//! compute crate. The aggregation code produces these structs and the HTTP
//! layer serializes them without reshaping.

mod occupancy;

pub use occupancy::{PortfolioSummary, PropertyOccupancy, ReconcileReport};
