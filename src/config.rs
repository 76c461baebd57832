use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bleu::BleuConfig;
use crate::error::{EvalError, Result};
use crate::quality::ModelConfig;
use crate::report::LanguagePair;

/// Run configuration. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EvalConfig {
    pub data_dir: PathBuf,
    pub source_language: String,
    pub target_languages: Vec<String>,
    /// Run identifier in `{a}_{b}_{suffix}.tsv`, usually the translation system.
    pub file_suffix: String,
    pub bleu: BleuConfig,
    pub model: ModelConfig,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            source_language: "en".to_string(),
            target_languages: ["de", "es", "fr", "it", "nl"]
                .into_iter()
                .map(String::from)
                .collect(),
            file_suffix: "translated_moonshine".to_string(),
            bleu: BleuConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

impl EvalConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| EvalError::from_io(path, e))?;
        let config: EvalConfig = toml::from_str(&contents)
            .map_err(|e| EvalError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_language.is_empty() {
            return Err(EvalError::Config("source_language is empty".into()));
        }
        if self.target_languages.is_empty() {
            return Err(EvalError::Config("target_languages is empty".into()));
        }
        if let Some(empty) = self.target_languages.iter().position(String::is_empty) {
            return Err(EvalError::Config(format!(
                "target_languages[{empty}] is empty"
            )));
        }
        if self.file_suffix.is_empty() {
            return Err(EvalError::Config("file_suffix is empty".into()));
        }
        Ok(())
    }

    /// Configured pairs in order, all sharing the source language.
    pub fn language_pairs(&self) -> Vec<LanguagePair> {
        self.target_languages
            .iter()
            .map(|target| LanguagePair::new(self.source_language.clone(), target.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bleu::Smoothing;
    use crate::quality::Device;
    use crate::tokenize::Tokenizer;
    use std::io::Write;

    #[test]
    fn test_defaults_cover_the_standard_run() {
        let config = EvalConfig::default();
        let pairs = config.language_pairs();
        assert_eq!(pairs.len(), 5);
        assert_eq!(pairs[0], LanguagePair::new("en", "de"));
        assert_eq!(pairs[4], LanguagePair::new("en", "nl"));
        assert_eq!(config.file_suffix, "translated_moonshine");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            data_dir = "runs/2024"
            target_languages = ["fr"]

            [bleu]
            tokenizer = "none"
            smoothing = "floor"
            smooth_value = 0.01

            [model]
            device = "accelerated"
            "#
        )
        .unwrap();

        let config = EvalConfig::from_file(file.path()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("runs/2024"));
        assert_eq!(config.source_language, "en");
        assert_eq!(config.target_languages, vec!["fr"]);
        assert_eq!(config.bleu.tokenizer, Tokenizer::None);
        assert_eq!(config.bleu.smoothing, Smoothing::Floor);
        assert_eq!(config.bleu.smooth_value(), 0.01);
        assert!(config.bleu.effective_order);
        assert_eq!(config.model.device, Device::Accelerated);
    }

    #[test]
    fn test_smoothing_name_alone_uses_method_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bleu]\nsmoothing = \"add-k\"").unwrap();

        let config = EvalConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bleu.smoothing, Smoothing::AddK);
        assert_eq!(config.bleu.smooth_value, None);
        assert_eq!(config.bleu.smooth_value(), 1.0);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "target_languages = 3").unwrap();
        assert!(matches!(
            EvalConfig::from_file(file.path()),
            Err(EvalError::Config(_))
        ));
    }

    #[test]
    fn test_empty_target_list_is_rejected() {
        let config = EvalConfig {
            target_languages: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
