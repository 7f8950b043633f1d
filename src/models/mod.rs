//! Pretrained model invocation.
//!
//! - `estimator`: the `Estimator` trait and artifact loading
//! - `tree` / `linear`: concrete estimators
//! - `decode`: raw outputs to failure modes or denormalized capacities

pub mod decode;
pub mod estimator;
pub mod linear;
pub mod tree;

pub use decode::*;
pub use estimator::*;
