//! Read-side aggregation over the property data model: occupancy math,
//! the dashboard portfolio summary, and the reconciliation pass that
//! repairs unit statuses against active tenancies.

pub mod error;
pub mod occupancy;
pub mod reconcile;

pub use error::{ComputeError, Result};
