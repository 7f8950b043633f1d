//! Decision-tree ensembles (gradient boosting and random forests).
//!
//! Trees are stored as flat node arrays; node `0` is the root. A split sends a
//! row left when `x[feature] < threshold` (`rule = "less_than"`, the boosting
//! convention) or when `x[feature] <= threshold` (`rule = "less_equal"`, the
//! random-forest convention).
//!
//! Aggregation:
//!
//! - `sum`: `base_score + learning_rate * Σ leaf` (gradient boosting)
//! - `mean`: `base_score + mean(leaf)` (random forest)
//!
//! Classifiers keep one score per class (`Tree::class_index`) and emit the label
//! of the highest-scoring class. Softmax is monotone, so the argmax of raw
//! scores equals the argmax of probabilities.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::estimator::{Estimator, RawOutput, check_row_width};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Regression,
    Classification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitRule {
    #[default]
    LessThan,
    LessEqual,
}

/// Class label as stored in the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Number(f64),
    Text(String),
}

impl From<&ClassLabel> for RawOutput {
    fn from(value: &ClassLabel) -> Self {
        match value {
            ClassLabel::Number(v) => RawOutput::Number(*v),
            ClassLabel::Text(s) => RawOutput::Label(s.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    #[serde(default)]
    pub class_index: usize,
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walk from the root to a leaf.
    fn leaf_value(&self, row: &[f64], rule: SplitRule) -> Result<f64, AppError> {
        let mut idx = 0usize;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(idx) {
                Some(Node::Leaf { value }) => return Ok(*value),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = *row.get(*feature).ok_or_else(|| {
                        AppError::new(5, format!("Tree splits on feature {feature}, but the row has {}.", row.len()))
                    })?;
                    let go_left = match rule {
                        SplitRule::LessThan => x < *threshold,
                        SplitRule::LessEqual => x <= *threshold,
                    };
                    idx = if go_left { *left } else { *right };
                }
                None => {
                    return Err(AppError::new(5, format!("Tree references missing node {idx}.")));
                }
            }
        }
        Err(AppError::new(5, "Tree contains a cycle."))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub objective: Objective,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub rule: SplitRule,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    pub n_features: usize,
    #[serde(default)]
    pub classes: Vec<ClassLabel>,
    pub trees: Vec<Tree>,
}

fn default_learning_rate() -> f64 {
    1.0
}

impl TreeEnsemble {
    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.trees.is_empty() {
            return Err(AppError::new(3, "Tree ensemble has no trees."));
        }
        let n_classes = match self.objective {
            Objective::Regression => 1,
            Objective::Classification => {
                if self.classes.is_empty() {
                    return Err(AppError::new(3, "Classification ensemble declares no classes."));
                }
                self.classes.len()
            }
        };

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(AppError::new(3, format!("Tree {t} has no nodes.")));
            }
            if tree.class_index >= n_classes {
                return Err(AppError::new(
                    3,
                    format!("Tree {t} targets class {} but only {n_classes} exist.", tree.class_index),
                ));
            }
            for node in &tree.nodes {
                if let Node::Split {
                    feature, left, right, ..
                } = node
                {
                    if *feature >= self.n_features {
                        return Err(AppError::new(
                            3,
                            format!("Tree {t} splits on feature {feature}, but n_features = {}.", self.n_features),
                        ));
                    }
                    if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                        return Err(AppError::new(3, format!("Tree {t} has a child index out of range.")));
                    }
                }
            }
        }
        Ok(())
    }

    fn scores(&self, row: &[f64]) -> Result<Vec<f64>, AppError> {
        let n_classes = match self.objective {
            Objective::Regression => 1,
            Objective::Classification => self.classes.len(),
        };
        let mut sums = vec![0.0; n_classes];
        let mut counts = vec![0usize; n_classes];
        for tree in &self.trees {
            let value = tree.leaf_value(row, self.rule)?;
            let (Some(sum), Some(count)) = (sums.get_mut(tree.class_index), counts.get_mut(tree.class_index)) else {
                return Err(AppError::new(
                    5,
                    format!("Tree targets class {} but only {n_classes} exist.", tree.class_index),
                ));
            };
            *sum += value;
            *count += 1;
        }

        let scores = sums
            .iter()
            .zip(&counts)
            .map(|(&sum, &count)| match self.aggregation {
                Aggregation::Sum => self.base_score + self.learning_rate * sum,
                Aggregation::Mean if count > 0 => self.base_score + sum / count as f64,
                Aggregation::Mean => self.base_score,
            })
            .collect();
        Ok(scores)
    }
}

impl Estimator for TreeEnsemble {
    fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<RawOutput>, AppError> {
        batch
            .iter()
            .map(|row| {
                check_row_width(row, self.n_features)?;
                let scores = self.scores(row)?;
                match self.objective {
                    Objective::Regression => Ok(RawOutput::Number(scores[0])),
                    Objective::Classification => {
                        let best = argmax(&scores)
                            .ok_or_else(|| AppError::new(5, "Classifier produced no finite class score."))?;
                        let label = self
                            .classes
                            .get(best)
                            .ok_or_else(|| AppError::new(5, format!("Classifier has no label for class {best}.")))?;
                        Ok(RawOutput::from(label))
                    }
                }
            })
            .collect()
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }
}

/// Index of the largest finite score; ties go to the lowest index.
fn argmax(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &s) in scores.iter().enumerate() {
        if !s.is_finite() {
            continue;
        }
        if best.is_none_or(|(_, b)| s > b) {
            best = Some((i, s));
        }
    }
    best.map(|(i, _)| i)
}
