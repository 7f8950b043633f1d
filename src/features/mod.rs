//! Feature encoding.
//!
//! Each pretrained model expects its inputs in a fixed column order. The order
//! is an implicit contract with the training data, so it lives in exactly one
//! place: `FeatureOrder::names`.

use nalgebra::DVector;

use crate::domain::WallParameters;

/// Ordered feature row handed to the normalizer.
pub type FeatureVector = DVector<f64>;

/// Column names of the one-hot section triple.
pub const SECTION_COLUMNS: [&str; 3] = ["section_b", "section_f", "section_r"];

const SHARED_COLUMNS: [&str; 8] = [
    "shear_span",
    "width_to_thick",
    "web_ver_reinf",
    "web_hor_reinf",
    "longi_reinf",
    "hoop_reinf",
    "axial_ratio",
    "ab_ag",
];

/// Model-specific feature layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureOrder {
    /// Failure-mode classifier: shared scalars, `capacity_ratio`, one-hot (12).
    FailureMode,
    /// Strength and deformation regressors: shared scalars, one-hot (11).
    Capacity,
}

impl FeatureOrder {
    pub fn len(self) -> usize {
        self.names().len()
    }

    pub fn names(self) -> Vec<&'static str> {
        let mut names = SHARED_COLUMNS.to_vec();
        if self == FeatureOrder::FailureMode {
            names.push("capacity_ratio");
        }
        names.extend(SECTION_COLUMNS);
        names
    }
}

/// Assemble the feature row for `order`.
pub fn encode(params: &WallParameters, order: FeatureOrder) -> FeatureVector {
    let mut values = vec![
        params.shear_span,
        params.width_to_thick,
        params.web_ver_reinf,
        params.web_hor_reinf,
        params.longi_reinf,
        params.hoop_reinf,
        params.axial_ratio,
        params.ab_ag,
    ];
    if order == FeatureOrder::FailureMode {
        values.push(params.capacity_ratio);
    }
    values.extend(params.section_type.one_hot());
    DVector::from_vec(values)
}
