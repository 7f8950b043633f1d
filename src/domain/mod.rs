//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - wall inputs (`WallParameters`, `SectionType`)
//! - derived drawing geometry (`WallGeometry`)
//! - prediction outputs (`FailureMode`, `Prediction`, `WallPrediction`)

pub mod types;

pub use types::*;
