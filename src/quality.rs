use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{EvalError, Result};

/// One item of a quality-estimation batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityInput {
    pub source: String,
    pub candidate: String,
    pub reference: String,
}

/// A learned translation-quality scorer.
///
/// `predict` returns exactly one score per input, in submission order. The
/// instance is shared read-only for the whole run.
pub trait QualityEstimator: Send + Sync {
    /// Label used in report lines, e.g. `COMET`.
    fn metric_name(&self) -> &str;

    fn predict(&self, batch: &[QualityInput]) -> Result<Vec<f64>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Cpu,
    /// CUDA; loading fails if no accelerator is present.
    Accelerated,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Comet,
    TorchScript,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub backend: Backend,
    /// Checkpoint name to download when no local checkpoint is given.
    pub name: String,
    pub checkpoint: Option<PathBuf>,
    pub device: Device,
    pub batch_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Comet,
            name: "wmt20-comet-da".to_string(),
            checkpoint: None,
            device: Device::Cpu,
            batch_size: 16,
        }
    }
}

/// Loads the one estimator instance used for the run.
pub fn load_estimator(config: &ModelConfig) -> Result<Arc<dyn QualityEstimator>> {
    if config.batch_size == 0 {
        return Err(EvalError::Config("model batch_size must be positive".into()));
    }
    match config.backend {
        Backend::Comet => load_comet(config),
        Backend::TorchScript => load_torchscript(config),
    }
}

#[cfg(feature = "python")]
fn load_comet(config: &ModelConfig) -> Result<Arc<dyn QualityEstimator>> {
    Ok(Arc::new(crate::comet::CometModel::load(config)?))
}

#[cfg(not(feature = "python"))]
fn load_comet(_config: &ModelConfig) -> Result<Arc<dyn QualityEstimator>> {
    Err(EvalError::ModelUnavailable(
        "COMET scoring requires building with the `python` feature".into(),
    ))
}

#[cfg(feature = "torch")]
fn load_torchscript(config: &ModelConfig) -> Result<Arc<dyn QualityEstimator>> {
    Ok(Arc::new(
        crate::torchscript::TorchScriptEstimator::load(config)?,
    ))
}

#[cfg(not(feature = "torch"))]
fn load_torchscript(_config: &ModelConfig) -> Result<Arc<dyn QualityEstimator>> {
    Err(EvalError::ModelUnavailable(
        "TorchScript scoring requires building with the `torch` feature".into(),
    ))
}
