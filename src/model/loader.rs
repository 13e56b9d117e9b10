//! Logistic-regression artifact loader.
//!
//! The artifact is a JSON export of a fitted standard-scaler + logistic
//! regression pipeline. Feature order is fixed by `REQUIRED_COLUMNS`.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::config::{FEATURE_COUNT, REQUIRED_COLUMNS};
use crate::error::{AppError, Result};
use crate::model::Classifier;
use crate::types::FeatureRow;

fn default_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, Deserialize)]
struct ScalerArtifact {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelArtifact {
    name: String,
    version: String,
    features: Vec<String>,
    #[serde(default)]
    scaler: Option<ScalerArtifact>,
    coefficients: Vec<f64>,
    intercept: f64,
    #[serde(default = "default_threshold")]
    threshold: f64,
}

/// Frozen logistic model. Immutable after load.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    name: String,
    version: String,
    mean: FeatureRow,
    scale: FeatureRow,
    coefficients: FeatureRow,
    intercept: f64,
    threshold: f64,
}

impl LogisticModel {
    /// Read and validate an artifact. Any failure is a `ModelLoad` error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading classifier artifact");

        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::ModelLoad(format!("cannot read {}: {e}", path.display())))?;
        let model = Self::from_json(&raw)?;

        info!(
            model = %model.name,
            version = %model.version,
            threshold = model.threshold,
            "Classifier loaded"
        );
        Ok(model)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(raw)
            .map_err(|e| AppError::ModelLoad(format!("invalid artifact JSON: {e}")))?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(a: ModelArtifact) -> Result<Self> {
        if a.features.len() != FEATURE_COUNT
            || a.features.iter().zip(REQUIRED_COLUMNS).any(|(f, r)| f != r)
        {
            return Err(AppError::ModelLoad(format!(
                "artifact features {:?} do not match the required column order",
                a.features
            )));
        }

        let coefficients = to_row("coefficients", &a.coefficients)?;
        let (mean, scale) = match &a.scaler {
            Some(s) => (to_row("scaler.mean", &s.mean)?, to_row("scaler.scale", &s.scale)?),
            None => ([0.0; FEATURE_COUNT], [1.0; FEATURE_COUNT]),
        };
        if scale.iter().any(|s| *s == 0.0) {
            return Err(AppError::ModelLoad("scaler.scale contains zero".to_string()));
        }
        if !a.intercept.is_finite() {
            return Err(AppError::ModelLoad("intercept is not finite".to_string()));
        }
        if !(a.threshold > 0.0 && a.threshold < 1.0) {
            return Err(AppError::ModelLoad(format!(
                "threshold {} outside (0, 1)",
                a.threshold
            )));
        }

        Ok(Self {
            name: a.name,
            version: a.version,
            mean,
            scale,
            coefficients,
            intercept: a.intercept,
            threshold: a.threshold,
        })
    }

    fn score(&self, row: &FeatureRow, index: usize) -> Result<f64> {
        let mut z = self.intercept;
        for (i, x) in row.iter().enumerate() {
            if !x.is_finite() {
                return Err(AppError::Inference(format!(
                    "row {}: {} is not a finite number",
                    index + 1,
                    REQUIRED_COLUMNS[i]
                )));
            }
            z += self.coefficients[i] * (x - self.mean[i]) / self.scale[i];
        }
        Ok(sigmoid(z))
    }
}

impl Classifier for LogisticModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn predict(&self, batch: &[FeatureRow]) -> Result<Vec<u8>> {
        batch
            .iter()
            .enumerate()
            .map(|(i, row)| self.score(row, i).map(|p| u8::from(p > self.threshold)))
            .collect()
    }

    fn predict_probability(&self, batch: &[FeatureRow]) -> Result<Vec<f64>> {
        batch
            .iter()
            .enumerate()
            .map(|(i, row)| self.score(row, i))
            .collect()
    }
}

fn to_row(field: &str, values: &[f64]) -> Result<FeatureRow> {
    let row: FeatureRow = values.try_into().map_err(|_| {
        AppError::ModelLoad(format!(
            "{field} has {} values, expected {FEATURE_COUNT}",
            values.len()
        ))
    })?;
    if row.iter().any(|v| !v.is_finite()) {
        return Err(AppError::ModelLoad(format!("{field} contains non-finite values")));
    }
    Ok(row)
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
