//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging
//! - parses CLI arguments and resolves the asset directory
//! - runs predictions and drawing
//! - prints reports/diagrams
//! - writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BatchArgs, Command, ConvertScalerArgs, DiagramArgs, DrawArgs, PredictArgs, WallArgs};
use crate::config::AssetPaths;
use crate::error::AppError;
use crate::plot::Drawing;

pub mod pipeline;

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "rcwall=warn";

/// Entry point for the `rcwall` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    // We want `rcwall` and `rcwall --section flange` to behave like `rcwall tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let assets = AssetPaths::resolve(cli.assets.as_deref());
    tracing::debug!("Using assets from '{}'", assets.root().display());

    match cli.command {
        Command::Predict(args) => handle_predict(&assets, args),
        Command::Draw(args) => handle_draw(&assets, args),
        Command::Batch(args) => handle_batch(&assets, args),
        Command::ConvertScaler(args) => handle_convert_scaler(args),
        Command::Tui(args) => handle_tui(assets, args),
    }
}

/// Logs go to stderr so stdout stays clean for reports and diagrams.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_predict(assets: &AssetPaths, args: PredictArgs) -> Result<(), AppError> {
    let params = args.wall.to_parameters();
    let run = pipeline::run_prediction(assets, &params)?;

    println!("{}", crate::report::format_prediction_summary(&run.params, &run.prediction));
    emit_diagram(&run.drawing, &args.diagram)?;

    if let Some(path) = &args.export_json {
        let report = crate::io::PredictionReport::new(run.params, run.prediction);
        crate::io::write_prediction_json(path, &report)?;
    }

    Ok(())
}

fn handle_draw(assets: &AssetPaths, args: DrawArgs) -> Result<(), AppError> {
    let params = args.wall.to_parameters();
    let drawing = pipeline::wall_drawing(assets, &params, args.failure_mode)?;
    emit_diagram(&drawing, &args.diagram)
}

fn handle_batch(assets: &AssetPaths, args: BatchArgs) -> Result<(), AppError> {
    let input = crate::io::load_batch_csv(&args.input)?;
    let models = pipeline::WallModels::load(assets)?;

    let params: Vec<_> = input.rows.iter().map(|row| row.params).collect();
    let predictions = models.predict_batch(&params)?;

    crate::io::write_results_csv(&args.output, &input.rows, &predictions)?;
    println!("{}", crate::report::format_batch_summary(&input, &predictions));
    Ok(())
}

fn handle_convert_scaler(args: ConvertScalerArgs) -> Result<(), AppError> {
    let text = std::fs::read_to_string(&args.input).map_err(|e| {
        AppError::new(2, format!("Failed to read scaler file '{}': {e}", args.input.display()))
    })?;
    let stats = crate::io::scaler::parse_legacy_scaler(&text, args.layout)?;
    stats.input.validate("input")?;
    if let Some(output) = &stats.output {
        output.validate("output")?;
    }
    crate::io::scaler::write_scaler_json(&args.output, &stats)?;
    println!(
        "Wrote {} ({} input features{})",
        args.output.display(),
        stats.input.len(),
        if stats.output.is_some() { ", with output statistics" } else { "" }
    );
    Ok(())
}

fn handle_tui(assets: AssetPaths, args: WallArgs) -> Result<(), AppError> {
    crate::tui::run(assets, args.to_parameters())
}

fn emit_diagram(drawing: &Drawing, args: &DiagramArgs) -> Result<(), AppError> {
    if !args.no_plot {
        println!("{}", crate::plot::render_ascii_diagram(drawing, args.width, args.height));
    }
    if let Some(path) = &args.svg {
        crate::plot::write_svg(drawing, path, args.svg_width)?;
    }
    Ok(())
}

/// Rewrite argv so `rcwall` defaults to `rcwall tui`.
///
/// Rules:
/// - `rcwall`                         -> `rcwall tui`
/// - `rcwall --section flange ...`    -> `rcwall tui --section flange ...`
/// - `rcwall --help/--version/-h`     -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "predict" | "draw" | "batch" | "convert-scaler" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_the_tui() {
        assert_eq!(rewrite_args(args(&["rcwall"])), args(&["rcwall", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_the_tui() {
        assert_eq!(
            rewrite_args(args(&["rcwall", "--section", "flange"])),
            args(&["rcwall", "tui", "--section", "flange"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for argv in [
            args(&["rcwall", "predict", "--shear-span", "2"]),
            args(&["rcwall", "convert-scaler", "-i", "a"]),
            args(&["rcwall", "--help"]),
            args(&["rcwall", "-V"]),
        ] {
            assert_eq!(rewrite_args(argv.clone()), argv);
        }
    }

    #[test]
    fn convert_scaler_writes_json_from_legacy_text() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Scaler_fm.txt");
        let lines = [
            "", "", "", "0 1", "", "1 4", "", "", "-1 -2", "", "1 2",
        ];
        std::fs::write(&input, lines.join("\n")).unwrap();
        let output = dir.path().join("Scaler_fm.json");

        handle_convert_scaler(ConvertScalerArgs {
            input,
            layout: crate::io::scaler::LegacyLayout::Classifier,
            output: output.clone(),
        })
        .unwrap();

        let stats = crate::io::scaler::read_scaler_json(&output).unwrap();
        assert_eq!(stats.input.len(), 2);
        assert_eq!(stats.input.var[1], 4.0);
        assert!(stats.output.is_none());
    }

    #[test]
    fn batch_writes_one_row_per_valid_wall() {
        let dir = tempfile::tempdir().unwrap();
        pipeline::test_assets::write(dir.path());
        let assets = AssetPaths::new(dir.path());

        let input = dir.path().join("walls.csv");
        std::fs::write(
            &input,
            "id,capacity_ratio,shear_span,axial_ratio,longi_reinf,hoop_reinf,width_to_thick,web_hor_reinf,web_ver_reinf,ab_ag,section_type\n\
             W1,1.45,1.47,0.08,0.48,0.10,12.96,0.08,0.08,0.09,Rectangular\n\
             W2,1.45,3.0,0.08,0.48,0.10,12.96,0.08,0.08,0.09,Flange\n\
             W3,1.45,oops,0.08,0.48,0.10,12.96,0.08,0.08,0.09,Flange\n",
        )
        .unwrap();
        let output = dir.path().join("out.csv");

        handle_batch(
            &assets,
            BatchArgs {
                input,
                output: output.clone(),
            },
        )
        .unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("W1,") && lines[1].contains(",Flexure,"));
        assert!(lines[2].starts_with("W2,") && lines[2].contains(",Shear,"));
    }
}
