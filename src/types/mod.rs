//! Type definitions for the fraud model lifecycle service.

pub mod report;
pub mod transaction;

pub use report::{DriftReport, FeatureDrift, Prediction};
pub use transaction::TransactionRecord;
