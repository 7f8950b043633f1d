//! Numeric utilities: feature normalization and its inverse.

pub mod normalize;

pub use normalize::*;
