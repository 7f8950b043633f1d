//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - fed to the feature encoder and the drawing code
//! - exported to JSON/CSV
//! - echoed back in reports next to the predictions

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Cross-section type of the wall.
///
/// The one-hot encoding of this enum is fixed by the trained models; see
/// `SectionType::one_hot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum SectionType {
    Rectangular,
    Barbell,
    Flange,
}

impl SectionType {
    pub const ALL: [SectionType; 3] = [SectionType::Rectangular, SectionType::Barbell, SectionType::Flange];

    /// Human-readable label (matches the labels the models were trained with).
    pub fn display_name(self) -> &'static str {
        match self {
            SectionType::Rectangular => "Rectangular",
            SectionType::Barbell => "Barbell",
            SectionType::Flange => "Flange",
        }
    }

    /// One-hot triple in `(B, F, R)` column order.
    pub fn one_hot(self) -> [f64; 3] {
        match self {
            //                           B    F    R
            SectionType::Rectangular => [0.0, 0.0, 1.0],
            SectionType::Barbell => [1.0, 0.0, 0.0],
            SectionType::Flange => [0.0, 1.0, 0.0],
        }
    }

    pub fn next(self) -> Self {
        match self {
            SectionType::Rectangular => SectionType::Barbell,
            SectionType::Barbell => SectionType::Flange,
            SectionType::Flange => SectionType::Rectangular,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            SectionType::Rectangular => SectionType::Flange,
            SectionType::Barbell => SectionType::Rectangular,
            SectionType::Flange => SectionType::Barbell,
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.display_name())
    }
}

impl FromStr for SectionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SectionType::ALL
            .into_iter()
            .find(|kind| kind.display_name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                AppError::new(
                    2,
                    format!("Unknown section type '{trimmed}' (expected Rectangular, Barbell, or Flange)."),
                )
            })
    }
}

/// Governing failure mode predicted by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum FailureMode {
    Flexure,
    #[serde(rename = "Flexure-Shear")]
    FlexureShear,
    Shear,
    Sliding,
}

impl FailureMode {
    pub const ALL: [FailureMode; 4] = [
        FailureMode::Flexure,
        FailureMode::FlexureShear,
        FailureMode::Shear,
        FailureMode::Sliding,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            FailureMode::Flexure => "Flexure",
            FailureMode::FlexureShear => "Flexure-Shear",
            FailureMode::Shear => "Shear",
            FailureMode::Sliding => "Sliding",
        }
    }

    /// Integer class code used by the classifier (`1..=4`).
    pub fn code(self) -> u8 {
        match self {
            FailureMode::Flexure => 1,
            FailureMode::FlexureShear => 2,
            FailureMode::Shear => 3,
            FailureMode::Sliding => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        FailureMode::ALL.into_iter().find(|mode| i64::from(mode.code()) == code)
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.display_name())
    }
}

/// The nine dimensionless wall parameters plus the section type.
///
/// Field names follow the labels of the input form:
///
/// - `capacity_ratio`: `Vn / Vs`
/// - `shear_span`: `M / (V lw)`
/// - `axial_ratio`: `P / (fc Ag)`
/// - `longi_reinf`: `ρvb fy,vb / fc`
/// - `hoop_reinf`: `ρhb fy,hb / fc`
/// - `width_to_thick`: `lw / tw`
/// - `web_hor_reinf`: `ρhw fy,hw / fc`
/// - `web_ver_reinf`: `ρvw fy,vw / fc`
/// - `ab_ag`: `Ab / Ag`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallParameters {
    pub capacity_ratio: f64,
    pub shear_span: f64,
    pub axial_ratio: f64,
    pub longi_reinf: f64,
    pub hoop_reinf: f64,
    pub width_to_thick: f64,
    pub web_hor_reinf: f64,
    pub web_ver_reinf: f64,
    pub ab_ag: f64,
    pub section_type: SectionType,
}

/// Names of the nine scalar parameters, in form order.
pub const PARAMETER_NAMES: [&str; 9] = [
    "capacity_ratio",
    "shear_span",
    "axial_ratio",
    "longi_reinf",
    "hoop_reinf",
    "width_to_thick",
    "web_hor_reinf",
    "web_ver_reinf",
    "ab_ag",
];

impl Default for WallParameters {
    fn default() -> Self {
        Self {
            capacity_ratio: 1.45,
            shear_span: 1.47,
            axial_ratio: 0.08,
            longi_reinf: 0.48,
            hoop_reinf: 0.10,
            width_to_thick: 12.96,
            web_hor_reinf: 0.08,
            web_ver_reinf: 0.08,
            ab_ag: 0.09,
            section_type: SectionType::Rectangular,
        }
    }
}

impl WallParameters {
    /// Scalar values in form order (same order as `PARAMETER_NAMES`).
    pub fn scalars(&self) -> [f64; 9] {
        [
            self.capacity_ratio,
            self.shear_span,
            self.axial_ratio,
            self.longi_reinf,
            self.hoop_reinf,
            self.width_to_thick,
            self.web_hor_reinf,
            self.web_ver_reinf,
            self.ab_ag,
        ]
    }

    /// Build parameters from scalars in form order.
    pub fn from_scalars(values: [f64; 9], section_type: SectionType) -> Self {
        Self {
            capacity_ratio: values[0],
            shear_span: values[1],
            axial_ratio: values[2],
            longi_reinf: values[3],
            hoop_reinf: values[4],
            width_to_thick: values[5],
            web_hor_reinf: values[6],
            web_ver_reinf: values[7],
            ab_ag: values[8],
            section_type,
        }
    }

    /// Reject non-finite scalars before they reach any model.
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, value) in PARAMETER_NAMES.iter().zip(self.scalars()) {
            if !value.is_finite() {
                return Err(AppError::new(2, format!("Parameter `{name}` must be a finite number, got {value}.")));
            }
        }
        Ok(())
    }
}

/// Parse one parameter from user-entered text.
pub fn parse_parameter(name: &str, text: &str) -> Result<f64, AppError> {
    let trimmed = text.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| AppError::new(2, format!("Parameter `{name}`: '{trimmed}' is not a number.")))?;
    if !value.is_finite() {
        return Err(AppError::new(2, format!("Parameter `{name}` must be finite, got '{trimmed}'.")));
    }
    Ok(value)
}

/// Wall dimensions used for drawing, normalized to `width = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallGeometry {
    pub width: f64,
    pub height: f64,
    pub thickness: f64,
    pub section_type: SectionType,
}

impl WallGeometry {
    /// Derive geometry from the shear-span and width-to-thickness ratios.
    pub fn from_ratios(shear_span: f64, width_to_thick: f64, section_type: SectionType) -> Result<Self, AppError> {
        if !(shear_span.is_finite() && shear_span > 0.0) {
            return Err(AppError::new(2, format!("Shear span ratio must be positive, got {shear_span}.")));
        }
        if !(width_to_thick.is_finite() && width_to_thick > 0.0) {
            return Err(AppError::new(
                2,
                format!("Width-to-thickness ratio must be positive, got {width_to_thick}."),
            ));
        }
        let width = 1.0;
        Ok(Self {
            width,
            height: shear_span * width,
            thickness: width / width_to_thick,
            section_type,
        })
    }

    pub fn from_parameters(params: &WallParameters) -> Result<Self, AppError> {
        Self::from_ratios(params.shear_span, params.width_to_thick, params.section_type)
    }
}

/// Output of a single model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prediction {
    FailureMode(FailureMode),
    Scalar(f64),
}

impl Prediction {
    pub fn failure_mode(self) -> Option<FailureMode> {
        match self {
            Prediction::FailureMode(mode) => Some(mode),
            Prediction::Scalar(_) => None,
        }
    }

    pub fn scalar(self) -> Option<f64> {
        match self {
            Prediction::Scalar(v) => Some(v),
            Prediction::FailureMode(_) => None,
        }
    }
}

/// The three outputs for one wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallPrediction {
    pub failure_mode: FailureMode,
    /// Strength capacity `V / (Ag fc)`.
    pub strength: f64,
    /// Deformation capacity `θu` in percent.
    pub deformation: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_hot_is_a_bijection() {
        let triples: Vec<[f64; 3]> = SectionType::ALL.iter().map(|s| s.one_hot()).collect();
        for (i, a) in triples.iter().enumerate() {
            assert_eq!(a.iter().sum::<f64>(), 1.0);
            for b in triples.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert_eq!(SectionType::Rectangular.one_hot(), [0.0, 0.0, 1.0]);
        assert_eq!(SectionType::Barbell.one_hot(), [1.0, 0.0, 0.0]);
        assert_eq!(SectionType::Flange.one_hot(), [0.0, 1.0, 0.0]);
        assert_eq!(SectionType::Flange.one_hot(), SectionType::Flange.one_hot());
    }

    #[test]
    fn section_type_parses_case_insensitively() {
        assert_eq!("barbell".parse::<SectionType>().unwrap(), SectionType::Barbell);
        assert_eq!(" Flange ".parse::<SectionType>().unwrap(), SectionType::Flange);
        assert_eq!("RECTANGULAR".parse::<SectionType>().unwrap(), SectionType::Rectangular);
    }

    #[test]
    fn unknown_section_type_is_an_input_error() {
        let err = "T-shaped".parse::<SectionType>().unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("T-shaped"));
    }

    #[test]
    fn failure_mode_codes_round_trip() {
        for mode in FailureMode::ALL {
            assert_eq!(FailureMode::from_code(i64::from(mode.code())), Some(mode));
        }
        assert_eq!(FailureMode::from_code(0), None);
        assert_eq!(FailureMode::from_code(5), None);
    }

    #[test]
    fn parse_parameter_rejects_text_and_non_finite() {
        assert_eq!(parse_parameter("shear_span", " 1.47 ").unwrap(), 1.47);
        assert_eq!(parse_parameter("shear_span", "abc").unwrap_err().exit_code(), 2);
        assert!(parse_parameter("shear_span", "inf").is_err());
        assert!(parse_parameter("shear_span", "NaN").is_err());
    }

    #[test]
    fn geometry_follows_ratios() {
        let g = WallGeometry::from_ratios(1.47, 12.96, SectionType::Barbell).unwrap();
        assert_eq!(g.width, 1.0);
        assert!((g.height - 1.47).abs() < 1e-12);
        assert!((g.thickness - 1.0 / 12.96).abs() < 1e-12);
        assert!((g.height / g.width - 1.47).abs() < 1e-12);
    }

    #[test]
    fn geometry_rejects_non_positive_ratios() {
        assert!(WallGeometry::from_ratios(0.0, 10.0, SectionType::Flange).is_err());
        assert!(WallGeometry::from_ratios(2.0, -1.0, SectionType::Flange).is_err());
    }

    #[test]
    fn validate_names_the_bad_field() {
        let mut params = WallParameters::default();
        params.hoop_reinf = f64::NAN;
        let err = params.validate().unwrap_err();
        assert!(err.message().contains("hoop_reinf"));
    }
}
