//! Shared prediction pipeline used by the CLI, batch, and TUI front-ends.
//!
//! Each model runs the same steps:
//! encode -> load scaler -> validate -> normalize -> load estimator -> predict -> decode
//!
//! Only the feature order, the asset files, and the output decoder differ, so a
//! model is described by a `ModelConfig` rather than a dedicated code path.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::config::AssetPaths;
use crate::domain::{FailureMode, Prediction, WallGeometry, WallParameters, WallPrediction};
use crate::error::AppError;
use crate::features::{FeatureOrder, encode};
use crate::io::scaler::{LegacyLayout, ScalerStats, load_scaler};
use crate::math::normalize;
use crate::models::{Estimator, OutputDecoder, load_estimator};
use crate::plot::{Drawing, draw_crack, draw_wall};

/// Everything needed to run one pretrained model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub name: &'static str,
    pub order: FeatureOrder,
    pub scaler_path: PathBuf,
    pub layout: LegacyLayout,
    pub model_path: PathBuf,
    pub decoder: OutputDecoder,
}

impl ModelConfig {
    /// Failure-mode classifier.
    pub fn failure_mode(assets: &AssetPaths) -> Self {
        Self {
            name: "failure_mode",
            order: FeatureOrder::FailureMode,
            scaler_path: assets.scaler("Scaler_fm"),
            layout: LegacyLayout::Classifier,
            model_path: assets.model("fm_model.json"),
            decoder: OutputDecoder::FailureModeCode,
        }
    }

    /// Strength capacity regressor.
    pub fn strength(assets: &AssetPaths) -> Self {
        Self {
            name: "strength",
            order: FeatureOrder::Capacity,
            scaler_path: assets.scaler("Scaler_strength"),
            layout: LegacyLayout::Regressor,
            model_path: assets.model("strength_model.json"),
            decoder: OutputDecoder::Denormalized,
        }
    }

    /// Deformation capacity regressor.
    pub fn deformation(assets: &AssetPaths) -> Self {
        Self {
            name: "deformation",
            order: FeatureOrder::Capacity,
            scaler_path: assets.scaler("Scaler_deformation"),
            layout: LegacyLayout::Regressor,
            model_path: assets.model("deformation_model.json"),
            decoder: OutputDecoder::Denormalized,
        }
    }

    /// Read and validate the scaler and estimator for this model.
    pub fn load(&self) -> Result<LoadedModel, AppError> {
        let stats = load_scaler(&self.scaler_path, self.layout)?;
        stats
            .validate(self.order.len(), self.decoder.needs_output_stats())
            .map_err(|e| AppError::new(e.exit_code(), format!("{} ({}): {e}", self.name, self.scaler_path.display())))?;

        let estimator = load_estimator(&self.model_path)?;
        if let Some(n) = estimator.n_features() {
            if n != self.order.len() {
                return Err(AppError::new(
                    3,
                    format!(
                        "{}: model '{}' expects {n} features, but the {} feature vector has {}.",
                        self.name,
                        self.model_path.display(),
                        self.name,
                        self.order.len()
                    ),
                ));
            }
        }

        Ok(LoadedModel {
            name: self.name,
            order: self.order,
            stats,
            estimator,
            decoder: self.decoder,
        })
    }

    /// Run the whole pipeline for one wall, loading the artifacts fresh.
    pub fn predict(&self, params: &WallParameters) -> Result<Prediction, AppError> {
        params.validate()?;
        self.load()?.predict(params)
    }
}

/// A model whose scaler and estimator are already in memory.
pub struct LoadedModel {
    name: &'static str,
    order: FeatureOrder,
    stats: ScalerStats,
    estimator: Box<dyn Estimator>,
    decoder: OutputDecoder,
}

impl LoadedModel {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn predict(&self, params: &WallParameters) -> Result<Prediction, AppError> {
        let mut out = self.predict_many(std::slice::from_ref(params))?;
        out.pop()
            .ok_or_else(|| AppError::new(5, format!("{}: estimator returned no output.", self.name)))
    }

    /// Predict a batch of walls in one estimator call.
    pub fn predict_many(&self, params: &[WallParameters]) -> Result<Vec<Prediction>, AppError> {
        let rows = params
            .iter()
            .map(|p| {
                let x = encode(p, self.order);
                let z = normalize(&x, &self.stats.input)?;
                Ok(z.iter().copied().collect::<Vec<f64>>())
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        let raw = self
            .estimator
            .predict(&rows)
            .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", self.name)))?;
        if raw.len() != rows.len() {
            return Err(AppError::new(
                5,
                format!("{}: estimator returned {} outputs for {} rows.", self.name, raw.len(), rows.len()),
            ));
        }

        tracing::debug!(model = self.name, rows = rows.len(), "estimator call finished");

        raw.iter()
            .map(|r| {
                self.decoder
                    .decode(r, self.stats.output.as_ref())
                    .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", self.name)))
            })
            .collect()
    }
}

/// The three models, loaded together.
pub struct WallModels {
    pub failure_mode: LoadedModel,
    pub strength: LoadedModel,
    pub deformation: LoadedModel,
}

impl WallModels {
    pub fn load(assets: &AssetPaths) -> Result<Self, AppError> {
        tracing::info!("Loading models from '{}'", assets.root().display());
        Ok(Self {
            failure_mode: ModelConfig::failure_mode(assets).load()?,
            strength: ModelConfig::strength(assets).load()?,
            deformation: ModelConfig::deformation(assets).load()?,
        })
    }

    pub fn predict(&self, params: &WallParameters) -> Result<WallPrediction, AppError> {
        params.validate()?;
        let failure_mode = self.failure_mode.predict(params)?;
        let strength = self.strength.predict(params)?;
        let deformation = self.deformation.predict(params)?;
        assemble(failure_mode, strength, deformation)
    }

    /// Predict many walls in parallel.
    ///
    /// Any failure fails the batch; the error reported is the one for the
    /// lowest-indexed wall, regardless of which worker finished first.
    pub fn predict_batch(&self, params: &[WallParameters]) -> Result<Vec<WallPrediction>, AppError> {
        let results: Vec<Result<WallPrediction, AppError>> = params.par_iter().map(|p| self.predict(p)).collect();
        results
            .into_iter()
            .enumerate()
            .map(|(i, result)| result.map_err(|e| AppError::new(e.exit_code(), format!("wall {}: {e}", i + 1))))
            .collect()
    }
}

fn assemble(
    failure_mode: Prediction,
    strength: Prediction,
    deformation: Prediction,
) -> Result<WallPrediction, AppError> {
    let failure_mode = failure_mode
        .failure_mode()
        .ok_or_else(|| AppError::new(5, "failure_mode: model returned a number instead of a class."))?;
    let strength = strength
        .scalar()
        .ok_or_else(|| AppError::new(5, "strength: model returned a class instead of a number."))?;
    let deformation = deformation
        .scalar()
        .ok_or_else(|| AppError::new(5, "deformation: model returned a class instead of a number."))?;
    Ok(WallPrediction {
        failure_mode,
        strength,
        deformation,
    })
}

/// Run all three models for one wall. Any failure fails the whole prediction.
pub fn predict_wall(assets: &AssetPaths, params: &WallParameters) -> Result<WallPrediction, AppError> {
    params.validate()?;
    let prediction = WallModels::load(assets)?.predict(params)?;
    tracing::info!(
        "Predicted {} / strength {:.4} / deformation {:.4}",
        prediction.failure_mode,
        prediction.strength,
        prediction.deformation
    );
    Ok(prediction)
}

/// Wall outline, with the crack overlay for `mode` when given.
pub fn wall_drawing(
    assets: &AssetPaths,
    params: &WallParameters,
    mode: Option<FailureMode>,
) -> Result<Drawing, AppError> {
    let geometry = WallGeometry::from_parameters(params)?;
    let mut drawing = Drawing::new();
    draw_wall(&mut drawing, &geometry);
    if let Some(mode) = mode {
        draw_crack(&mut drawing, &geometry, mode, assets)?;
    }
    Ok(drawing)
}

/// Outputs of one `rcwall predict` run.
#[derive(Debug, Clone)]
pub struct PredictionRun {
    pub params: WallParameters,
    pub prediction: WallPrediction,
    pub drawing: Drawing,
}

/// Predict, then redraw the wall with the predicted crack pattern.
pub fn run_prediction(assets: &AssetPaths, params: &WallParameters) -> Result<PredictionRun, AppError> {
    let prediction = predict_wall(assets, params)?;
    let drawing = wall_drawing(assets, params, Some(prediction.failure_mode))?;
    Ok(PredictionRun {
        params: *params,
        prediction,
        drawing,
    })
}

/// On-disk asset directory with small hand-built models, for tests.
#[cfg(test)]
pub(crate) mod test_assets {
    use std::path::Path;

    use serde_json::json;

    use crate::io::scaler::{LegacyLayout, ScalerStats, read_scaler_json, write_scaler_json};
    use crate::math::StatBlock;

    /// Strength and deformation returned for every wall.
    pub const STRENGTH: f64 = 0.3;
    pub const DEFORMATION: f64 = 1.2;

    /// Shear span above which the classifier answers Shear instead of Flexure.
    pub const SHEAR_SPAN_SPLIT: f64 = 2.0;

    fn block(n: usize) -> StatBlock {
        // normalized = (x + 10) / 20
        StatBlock::new(vec![0.0; n], vec![1.0; n], vec![-10.0; n], vec![10.0; n])
    }

    fn identity_output() -> StatBlock {
        StatBlock::new(vec![0.0], vec![1.0], vec![0.0], vec![1.0])
    }

    fn write_json(path: &Path, value: serde_json::Value) {
        std::fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    /// Write `stats` in the legacy text layout, one row per hard-coded line.
    fn write_legacy(path: &Path, stats: &ScalerStats, layout: LegacyLayout) {
        let row = |v: &nalgebra::DVector<f64>| v.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(" ");
        let mut lines = vec![String::new(); 23];
        let (input, output) = match layout {
            LegacyLayout::Classifier => ([3, 5, 8, 10], None),
            LegacyLayout::Regressor => ([4, 6, 15, 17], Some([9, 11, 20, 22])),
        };
        let blocks = [(Some(&stats.input), Some(input)), (stats.output.as_ref(), output)];
        for (block, idx) in blocks {
            let (Some(block), Some([mean, var, min, max])) = (block, idx) else {
                continue;
            };
            lines[mean] = row(&block.mean);
            lines[var] = row(&block.var);
            lines[min] = row(&block.min);
            lines[max] = row(&block.max);
        }
        std::fs::write(path, lines.join("\n")).unwrap();
    }

    /// Replace the JSON scalers with the same statistics in legacy text files.
    pub fn use_legacy_scalers(dir: &Path) {
        for (stem, layout) in [
            ("Scaler_fm", LegacyLayout::Classifier),
            ("Scaler_strength", LegacyLayout::Regressor),
            ("Scaler_deformation", LegacyLayout::Regressor),
        ] {
            let json = dir.join(format!("{stem}.json"));
            let stats = read_scaler_json(&json).unwrap();
            std::fs::remove_file(&json).unwrap();
            write_legacy(&dir.join(format!("{stem}.txt")), &stats, layout);
        }
    }

    pub fn write(dir: &Path) {
        write_scaler_json(
            &dir.join("Scaler_fm.json"),
            &ScalerStats {
                input: block(12),
                output: None,
            },
        )
        .unwrap();
        for stem in ["Scaler_strength", "Scaler_deformation"] {
            write_scaler_json(
                &dir.join(format!("{stem}.json")),
                &ScalerStats {
                    input: block(11),
                    output: Some(identity_output()),
                },
            )
            .unwrap();
        }

        let threshold = (SHEAR_SPAN_SPLIT + 10.0) / 20.0;
        write_json(
            &dir.join("fm_model.json"),
            json!({
                "kind": "tree_ensemble",
                "objective": "classification",
                "n_features": 12,
                "classes": [1, 2, 3, 4],
                "trees": [
                    {"class_index": 0, "nodes": [
                        {"feature": 0, "threshold": threshold, "left": 1, "right": 2},
                        {"value": 1.0},
                        {"value": 0.0}
                    ]},
                    {"class_index": 2, "nodes": [{"value": 0.5}]}
                ]
            }),
        );
        write_json(
            &dir.join("strength_model.json"),
            json!({"kind": "linear", "weights": vec![0.0; 11], "bias": STRENGTH}),
        );
        write_json(
            &dir.join("deformation_model.json"),
            json!({"kind": "linear", "weights": vec![0.0; 11], "bias": DEFORMATION}),
        );

        let crack = dir.join("Crack");
        std::fs::create_dir_all(&crack).unwrap();
        let four_lines = concat!(
            "Line #1\n0 0.1\n0.3 0.1\n",
            "Line #2\n0 0.2\n0.25 0.2\n",
            "Line #3\n0 0.3\n0.2 0.3\n",
            "Line #4\n0 0.4\n0.15 0.4\n",
        );
        std::fs::write(crack.join("Flexure.txt"), four_lines).unwrap();
        std::fs::write(crack.join("FlexuralShear.txt"), four_lines).unwrap();
        std::fs::write(crack.join("DiagonalTensile.txt"), "Line #1\n0.1 0.1\n0.5 0.5\n0.9 0.9\n").unwrap();
        std::fs::write(crack.join("Sliding.txt"), "Line #1\n0 0.05\n1 0.05\n").unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SectionType;
    use crate::plot::{ILLUSTRATION_NOTE, Ink};

    fn assets() -> (tempfile::TempDir, AssetPaths) {
        let dir = tempfile::tempdir().unwrap();
        test_assets::write(dir.path());
        let assets = AssetPaths::new(dir.path());
        (dir, assets)
    }

    #[test]
    fn default_wall_yields_a_label_and_two_finite_reals() {
        let (_dir, assets) = assets();
        let p = predict_wall(&assets, &WallParameters::default()).unwrap();
        assert!(FailureMode::ALL.contains(&p.failure_mode));
        assert!(p.strength.is_finite());
        assert!(p.deformation.is_finite());
        assert_eq!(p.failure_mode, FailureMode::Flexure);
        assert!((p.strength - test_assets::STRENGTH).abs() < 1e-12);
        assert!((p.deformation - test_assets::DEFORMATION).abs() < 1e-12);
    }

    #[test]
    fn classifier_follows_shear_span() {
        let (_dir, assets) = assets();
        let params = WallParameters {
            shear_span: 3.0,
            ..WallParameters::default()
        };
        let p = ModelConfig::failure_mode(&assets).predict(&params).unwrap();
        assert_eq!(p, Prediction::FailureMode(FailureMode::Shear));
    }

    #[test]
    fn section_type_does_not_break_the_pipeline() {
        let (_dir, assets) = assets();
        for section_type in SectionType::ALL {
            let params = WallParameters {
                section_type,
                ..WallParameters::default()
            };
            assert!(predict_wall(&assets, &params).is_ok());
        }
    }

    #[test]
    fn legacy_text_scalers_match_json_scalers() {
        let walls = [1.47, 3.0].map(|shear_span| WallParameters {
            shear_span,
            section_type: SectionType::Flange,
            ..WallParameters::default()
        });
        let (_json_dir, json_assets) = assets();
        let (legacy_dir, legacy_assets) = assets();
        test_assets::use_legacy_scalers(legacy_dir.path());
        assert!(legacy_dir.path().join("Scaler_strength.txt").exists());
        assert!(!legacy_dir.path().join("Scaler_strength.json").exists());

        for wall in &walls {
            let expected = predict_wall(&json_assets, wall).unwrap();
            assert_eq!(predict_wall(&legacy_assets, wall).unwrap(), expected);
        }
        assert_eq!(
            predict_wall(&legacy_assets, &walls[1]).unwrap().failure_mode,
            FailureMode::Shear
        );
    }

    #[test]
    fn legacy_scaler_with_wrong_layout_is_a_config_error() {
        let (dir, assets) = assets();
        test_assets::use_legacy_scalers(dir.path());
        // A classifier file has no output block where a regressor expects one.
        std::fs::copy(dir.path().join("Scaler_fm.txt"), dir.path().join("Scaler_strength.txt")).unwrap();
        let err = predict_wall(&assets, &WallParameters::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_scaler_is_a_config_error() {
        let (dir, assets) = assets();
        std::fs::remove_file(dir.path().join("Scaler_strength.json")).unwrap();
        let err = predict_wall(&assets, &WallParameters::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn feature_count_mismatch_is_rejected_at_load() {
        let (dir, assets) = assets();
        std::fs::write(
            dir.path().join("strength_model.json"),
            r#"{"kind": "linear", "weights": [0.0, 0.0], "bias": 0.0}"#,
        )
        .unwrap();
        let err = ModelConfig::strength(&assets).load().err().unwrap();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("strength"));
    }

    #[test]
    fn unknown_class_code_fails_the_whole_prediction() {
        let (dir, assets) = assets();
        std::fs::write(
            dir.path().join("fm_model.json"),
            r#"{"kind": "tree_ensemble", "objective": "classification", "n_features": 12,
                "classes": ["7"], "trees": [{"nodes": [{"value": 1.0}]}]}"#,
        )
        .unwrap();
        let err = predict_wall(&assets, &WallParameters::default()).unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert!(err.message().contains("Unknown failure mode code '7'"));
    }

    #[test]
    fn non_finite_parameter_never_reaches_a_model() {
        // No assets at all: validation must fail first.
        let assets = AssetPaths::new("/nonexistent/rcwall-assets");
        let params = WallParameters {
            ab_ag: f64::NAN,
            ..WallParameters::default()
        };
        let err = predict_wall(&assets, &params).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn batch_matches_single_predictions() {
        let (_dir, assets) = assets();
        let models = WallModels::load(&assets).unwrap();
        let walls: Vec<WallParameters> = [1.0, 2.5, 1.47, 4.0]
            .iter()
            .map(|&shear_span| WallParameters {
                shear_span,
                ..WallParameters::default()
            })
            .collect();
        let batch = models.predict_batch(&walls).unwrap();
        for (wall, got) in walls.iter().zip(&batch) {
            assert_eq!(*got, models.predict(wall).unwrap());
        }

        let many = models.failure_mode.predict_many(&walls).unwrap();
        assert_eq!(many.len(), walls.len());
        assert_eq!(many[1], Prediction::FailureMode(FailureMode::Shear));
    }

    #[test]
    fn batch_reports_the_lowest_failing_wall() {
        let (_dir, assets) = assets();
        let models = WallModels::load(&assets).unwrap();
        let mut walls = vec![WallParameters::default(); 64];
        walls[40].axial_ratio = f64::NAN;
        walls[5].shear_span = f64::INFINITY;
        walls[60].ab_ag = f64::NAN;

        let err = models.predict_batch(&walls).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().starts_with("wall 6:"), "{}", err.message());
        assert!(err.message().contains("shear_span"));
    }

    #[test]
    fn run_prediction_draws_the_predicted_cracks() {
        let (_dir, assets) = assets();
        let run = run_prediction(&assets, &WallParameters::default()).unwrap();
        assert_eq!(run.drawing.title.as_deref(), Some("Flexural Failure"));
        assert_eq!(run.drawing.caption.as_deref(), Some(ILLUSTRATION_NOTE));
        assert_eq!(run.drawing.strokes_with(Ink::Crack).count(), 8);
    }

    #[test]
    fn wall_drawing_without_mode_has_no_cracks() {
        let (_dir, assets) = assets();
        let d = wall_drawing(&assets, &WallParameters::default(), None).unwrap();
        assert_eq!(d.strokes_with(Ink::Crack).count(), 0);
        assert!(d.title.is_none());
    }
}
