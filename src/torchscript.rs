use tch::{no_grad_guard, CModule, Device, IValue, Kind, Tensor};
use tracing::info;

use crate::error::{EvalError, Result};
use crate::quality::{self, ModelConfig, QualityEstimator, QualityInput};

/// A TorchScript regression module with the signature
/// `forward(src: List[str], mt: List[str], ref: List[str]) -> Tensor`,
/// returning one score per item.
pub struct TorchScriptEstimator {
    model: CModule,
    device: Device,
}

fn string_list<'a>(values: impl Iterator<Item = &'a str>) -> IValue {
    IValue::GenericList(values.map(|v| IValue::String(v.to_string())).collect())
}

impl TorchScriptEstimator {
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let path = config.checkpoint.as_ref().ok_or_else(|| {
            EvalError::Config("the torchscript backend needs a model checkpoint path".into())
        })?;

        let device = match config.device {
            quality::Device::Cpu => Device::Cpu,
            quality::Device::Accelerated => {
                if !tch::Cuda::is_available() {
                    return Err(EvalError::ModelUnavailable(
                        "accelerated device requested but CUDA is not available".into(),
                    ));
                }
                Device::Cuda(0)
            }
        };

        info!(checkpoint = %path.display(), ?device, "loading TorchScript scorer");
        let model = CModule::load_on_device(path, device)
            .map_err(|e| EvalError::ModelUnavailable(e.to_string()))?;
        Ok(Self { model, device })
    }
}

impl QualityEstimator for TorchScriptEstimator {
    fn metric_name(&self) -> &str {
        "QE"
    }

    fn predict(&self, batch: &[QualityInput]) -> Result<Vec<f64>> {
        let _guard = no_grad_guard();

        let output = self
            .model
            .forward_is(&[
                string_list(batch.iter().map(|input| input.source.as_str())),
                string_list(batch.iter().map(|input| input.candidate.as_str())),
                string_list(batch.iter().map(|input| input.reference.as_str())),
            ])
            .map_err(|e| EvalError::Prediction(e.to_string()))?;

        let IValue::Tensor(scores) = output else {
            return Err(EvalError::Prediction(
                "expected the module to return a tensor of scores".into(),
            ));
        };

        let scores: Tensor = scores
            .to_device(Device::Cpu)
            .to_kind(Kind::Double)
            .flatten(0, -1);
        Vec::<f64>::try_from(&scores).map_err(|e| EvalError::Prediction(e.to_string()))
    }
}

impl std::fmt::Debug for TorchScriptEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TorchScriptEstimator")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_string_list_keeps_order() {
        let list = string_list(["a", "b", "c"].into_iter());
        let IValue::GenericList(items) = list else {
            panic!("expected a generic list");
        };
        let values: Vec<String> = items
            .into_iter()
            .map(|item| match item {
                IValue::String(s) => s,
                other => panic!("expected a string, got {:?}", other),
            })
            .collect();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_load_requires_checkpoint() {
        let config = ModelConfig {
            backend: quality::Backend::TorchScript,
            checkpoint: None,
            ..Default::default()
        };
        assert!(matches!(
            TorchScriptEstimator::load(&config),
            Err(EvalError::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_module_is_unavailable() {
        let config = ModelConfig {
            backend: quality::Backend::TorchScript,
            checkpoint: Some(PathBuf::from("does/not/exist.pt")),
            ..Default::default()
        };
        assert!(matches!(
            TorchScriptEstimator::load(&config),
            Err(EvalError::ModelUnavailable(_))
        ));
    }
}
