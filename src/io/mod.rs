//! Input/output helpers.
//!
//! - scaler statistics, legacy text and JSON (`scaler`)
//! - crack polyline data (`crack`)
//! - batch CSV ingest + validation (`ingest`)
//! - result exports (CSV/JSON) (`export`)

pub mod crack;
pub mod export;
pub mod ingest;
pub mod scaler;

pub use export::*;
pub use ingest::*;
