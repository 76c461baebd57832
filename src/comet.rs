use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use tracing::info;

use crate::error::{EvalError, Result};
use crate::quality::{Device, ModelConfig, QualityEstimator, QualityInput};

/// A COMET checkpoint driven through the embedded Python interpreter.
pub struct CometModel {
    model: Py<PyAny>,
    gpus: usize,
    batch_size: usize,
}

fn unavailable(err: PyErr) -> EvalError {
    EvalError::ModelUnavailable(err.to_string())
}

fn prediction_failed(err: PyErr) -> EvalError {
    EvalError::Prediction(err.to_string())
}

impl CometModel {
    pub fn load(config: &ModelConfig) -> Result<Self> {
        Python::with_gil(|py| {
            let comet = py.import("comet").map_err(unavailable)?;

            let checkpoint: String = match &config.checkpoint {
                Some(path) => path.display().to_string(),
                None => {
                    info!(model = %config.name, "downloading COMET checkpoint");
                    comet
                        .call_method1("download_model", (config.name.as_str(),))
                        .and_then(|path| path.extract())
                        .map_err(unavailable)?
                }
            };

            let gpus = match config.device {
                Device::Cpu => 0,
                Device::Accelerated => {
                    let available: bool = py
                        .import("torch")
                        .and_then(|torch| torch.getattr("cuda"))
                        .and_then(|cuda| cuda.call_method0("is_available"))
                        .and_then(|flag| flag.extract())
                        .map_err(unavailable)?;
                    if !available {
                        return Err(EvalError::ModelUnavailable(
                            "accelerated device requested but CUDA is not available".into(),
                        ));
                    }
                    1
                }
            };

            info!(checkpoint = %checkpoint, gpus, "loading COMET scorer");
            let model = comet
                .call_method1("load_from_checkpoint", (checkpoint,))
                .map_err(unavailable)?;

            Ok(Self {
                model: model.unbind(),
                gpus,
                batch_size: config.batch_size,
            })
        })
    }
}

impl QualityEstimator for CometModel {
    fn metric_name(&self) -> &str {
        "COMET"
    }

    fn predict(&self, batch: &[QualityInput]) -> Result<Vec<f64>> {
        Python::with_gil(|py| {
            let samples = PyList::empty(py);
            for input in batch {
                let sample = PyDict::new(py);
                sample.set_item("src", &input.source).map_err(prediction_failed)?;
                sample.set_item("mt", &input.candidate).map_err(prediction_failed)?;
                sample.set_item("ref", &input.reference).map_err(prediction_failed)?;
                samples.append(sample).map_err(prediction_failed)?;
            }

            let kwargs = PyDict::new(py);
            kwargs.set_item("batch_size", self.batch_size).map_err(prediction_failed)?;
            kwargs.set_item("gpus", self.gpus).map_err(prediction_failed)?;
            kwargs.set_item("progress_bar", false).map_err(prediction_failed)?;

            self.model
                .bind(py)
                .call_method("predict", (samples,), Some(&kwargs))
                .and_then(|output| output.getattr("scores"))
                .and_then(|scores| scores.extract::<Vec<f64>>())
                .map_err(prediction_failed)
        })
    }
}
