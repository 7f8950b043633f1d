//! Command-line parsing for the shear-wall predictor.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the prediction/drawing code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{FailureMode, SectionType, WallParameters};
use crate::io::scaler::LegacyLayout;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rcwall", version, about = "RC shear wall failure mode and capacity predictor")]
pub struct Cli {
    /// Directory holding the scaler, model, and crack files.
    ///
    /// Defaults to `$RCWALL_ASSETS` (a `.env` file is honored), then `./assets`.
    #[arg(long, global = true, value_name = "DIR")]
    pub assets: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict failure mode, strength, and deformation for one wall.
    Predict(PredictArgs),
    /// Draw the wall (optionally with a crack pattern) without running any model.
    Draw(DrawArgs),
    /// Predict every wall in a CSV file.
    Batch(BatchArgs),
    /// Convert a legacy text scaler file to the JSON layout.
    ConvertScaler(ConvertScalerArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same pipeline as `rcwall predict`, but lets you edit the
    /// parameters and redraw the wall in a terminal UI.
    Tui(WallArgs),
}

/// The nine wall parameters and the section type.
///
/// Defaults are a typical rectangular wall.
#[derive(Debug, Args, Clone)]
pub struct WallArgs {
    /// Shear capacity ratio Vn/Vs.
    #[arg(long, default_value_t = 1.45, allow_negative_numbers = true)]
    pub capacity_ratio: f64,

    /// Shear span ratio M/(V lw).
    #[arg(long, default_value_t = 1.47, allow_negative_numbers = true)]
    pub shear_span: f64,

    /// Axial load ratio P/(fc Ag).
    #[arg(long, default_value_t = 0.08, allow_negative_numbers = true)]
    pub axial_ratio: f64,

    /// Boundary longitudinal reinforcement index rho_vb fy_vb / fc.
    #[arg(long, default_value_t = 0.48, allow_negative_numbers = true)]
    pub longi_reinf: f64,

    /// Boundary transverse (hoop) reinforcement index rho_hb fy_hb / fc.
    #[arg(long, default_value_t = 0.10, allow_negative_numbers = true)]
    pub hoop_reinf: f64,

    /// Wall length to thickness ratio lw/tw.
    #[arg(long, default_value_t = 12.96, allow_negative_numbers = true)]
    pub width_to_thick: f64,

    /// Web horizontal reinforcement index rho_hw fy_hw / fc.
    #[arg(long, default_value_t = 0.08, allow_negative_numbers = true)]
    pub web_hor_reinf: f64,

    /// Web vertical reinforcement index rho_vw fy_vw / fc.
    #[arg(long, default_value_t = 0.08, allow_negative_numbers = true)]
    pub web_ver_reinf: f64,

    /// Boundary element area ratio Ab/Ag.
    #[arg(long, default_value_t = 0.09, allow_negative_numbers = true)]
    pub ab_ag: f64,

    /// Cross-section type.
    #[arg(long = "section", value_enum, default_value_t = SectionType::Rectangular)]
    pub section_type: SectionType,
}

impl WallArgs {
    pub fn to_parameters(&self) -> WallParameters {
        WallParameters {
            capacity_ratio: self.capacity_ratio,
            shear_span: self.shear_span,
            axial_ratio: self.axial_ratio,
            longi_reinf: self.longi_reinf,
            hoop_reinf: self.hoop_reinf,
            width_to_thick: self.width_to_thick,
            web_hor_reinf: self.web_hor_reinf,
            web_ver_reinf: self.web_ver_reinf,
            ab_ag: self.ab_ag,
            section_type: self.section_type,
        }
    }
}

/// Terminal diagram options shared by `predict` and `draw`.
#[derive(Debug, Args, Clone)]
pub struct DiagramArgs {
    /// Disable the terminal diagram.
    #[arg(long)]
    pub no_plot: bool,

    /// Diagram width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Diagram height (rows).
    #[arg(long, default_value_t = 30)]
    pub height: usize,

    /// Also write the diagram to an SVG file.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,

    /// SVG width in pixels.
    #[arg(long, default_value_t = 600)]
    pub svg_width: u32,
}

/// Options for `rcwall predict`.
#[derive(Debug, Args)]
pub struct PredictArgs {
    #[command(flatten)]
    pub wall: WallArgs,

    #[command(flatten)]
    pub diagram: DiagramArgs,

    /// Write the inputs and predictions to a JSON report.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for `rcwall draw`.
#[derive(Debug, Args)]
pub struct DrawArgs {
    #[command(flatten)]
    pub wall: WallArgs,

    #[command(flatten)]
    pub diagram: DiagramArgs,

    /// Overlay the crack pattern of this failure mode.
    #[arg(long, value_enum)]
    pub failure_mode: Option<FailureMode>,
}

/// Options for `rcwall batch`.
#[derive(Debug, Args)]
pub struct BatchArgs {
    /// CSV with one wall per row.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    /// Where to write the predictions.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: PathBuf,
}

/// Options for `rcwall convert-scaler`.
#[derive(Debug, Args)]
pub struct ConvertScalerArgs {
    /// Legacy text scaler file.
    #[arg(short = 'i', long, value_name = "TXT")]
    pub input: PathBuf,

    /// Line layout of the legacy file.
    #[arg(long, value_enum)]
    pub layout: LegacyLayout,

    /// JSON file to write.
    #[arg(short = 'o', long, value_name = "JSON")]
    pub output: PathBuf,
}
