//! Asset locations.
//!
//! All pretrained artifacts live in one directory:
//!
//! ```text
//! <assets>/
//!   Scaler_fm.json | Scaler_fm.txt
//!   Scaler_strength.json | Scaler_strength.txt
//!   Scaler_deformation.json | Scaler_deformation.txt
//!   fm_model.json
//!   strength_model.json
//!   deformation_model.json
//!   Crack/Flexure.txt
//!   Crack/FlexuralShear.txt
//!   Crack/DiagonalTensile.txt
//!   Crack/Sliding.txt
//! ```
//!
//! The directory comes from `--assets`, else `RCWALL_ASSETS` (a `.env` file is
//! honored), else `./assets`.

use std::path::{Path, PathBuf};

use crate::domain::FailureMode;

pub const ASSETS_ENV: &str = "RCWALL_ASSETS";
pub const DEFAULT_ASSETS_DIR: &str = "assets";

/// Resolved asset directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    root: PathBuf,
}

impl AssetPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve from an explicit override, then the environment, then the default.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        if let Some(dir) = explicit {
            return Self::new(dir);
        }
        dotenvy::dotenv().ok();
        match std::env::var(ASSETS_ENV) {
            Ok(dir) if !dir.trim().is_empty() => Self::new(dir.trim()),
            _ => Self::new(DEFAULT_ASSETS_DIR),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scaler file for `stem`; the JSON layout wins when both exist.
    pub fn scaler(&self, stem: &str) -> PathBuf {
        let json = self.root.join(format!("{stem}.json"));
        if json.exists() {
            json
        } else {
            self.root.join(format!("{stem}.txt"))
        }
    }

    pub fn model(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Crack data file for a failure mode.
    pub fn crack(&self, mode: FailureMode) -> PathBuf {
        let file = match mode {
            FailureMode::Flexure => "Flexure.txt",
            FailureMode::FlexureShear => "FlexuralShear.txt",
            FailureMode::Shear => "DiagonalTensile.txt",
            FailureMode::Sliding => "Sliding.txt",
        };
        self.root.join("Crack").join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        let paths = AssetPaths::resolve(Some(Path::new("/tmp/walls")));
        assert_eq!(paths.root(), Path::new("/tmp/walls"));
    }

    #[test]
    fn scaler_prefers_json() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AssetPaths::new(dir.path());
        assert_eq!(paths.scaler("Scaler_fm"), dir.path().join("Scaler_fm.txt"));
        std::fs::write(dir.path().join("Scaler_fm.json"), "{}").unwrap();
        assert_eq!(paths.scaler("Scaler_fm"), dir.path().join("Scaler_fm.json"));
    }

    #[test]
    fn crack_files_are_distinct() {
        let paths = AssetPaths::new("a");
        let files: std::collections::HashSet<PathBuf> = FailureMode::ALL.iter().map(|m| paths.crack(*m)).collect();
        assert_eq!(files.len(), 4);
        assert_eq!(paths.crack(FailureMode::Shear), Path::new("a/Crack/DiagonalTensile.txt"));
    }
}
