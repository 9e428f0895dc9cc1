mod errors;
mod models;
mod remote;
mod tracker;

pub use errors::TrackerError;
pub use models::{Completion, LocationTracker, ReconcileReport, Removal};
