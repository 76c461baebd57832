use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{EvalError, Result};

static LANGUAGE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{3}_[A-Z][a-z]{3}$").expect("language code pattern is valid"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Split {
    Dev,
    #[default]
    Devtest,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Dev => "dev",
            Split::Devtest => "devtest",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A FLORES-200 language identifier such as `eng_Latn` or `zho_Hans`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloresLanguage(String);

impl FloresLanguage {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for FloresLanguage {
    type Err = EvalError;

    fn from_str(code: &str) -> Result<Self> {
        if LANGUAGE_CODE.is_match(code) {
            Ok(Self(code.to_string()))
        } else {
            Err(EvalError::InvalidLanguage(code.to_string()))
        }
    }
}

impl fmt::Display for FloresLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Aligned reference sentences for two languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePair {
    pub sentence_a: String,
    pub sentence_b: String,
}

/// Source of sentence-aligned reference data.
pub trait CorpusSource {
    fn fetch(
        &self,
        lang_a: &FloresLanguage,
        lang_b: &FloresLanguage,
        split: Split,
    ) -> Result<Vec<ReferencePair>>;
}

fn check_sentence(sentence: &str, index: usize) -> Result<()> {
    if sentence.contains(['\t', '\n', '\r']) {
        return Err(EvalError::Corpus(format!(
            "sentence pair {index} contains a tab or line break"
        )));
    }
    Ok(())
}

/// Writes one `a<TAB>b` line per pair and returns the number written.
pub fn write_reference_pairs<W: Write>(writer: &mut W, pairs: &[ReferencePair]) -> Result<usize> {
    for (index, pair) in pairs.iter().enumerate() {
        check_sentence(&pair.sentence_a, index)?;
        check_sentence(&pair.sentence_b, index)?;
        writeln!(writer, "{}\t{}", pair.sentence_a, pair.sentence_b)
            .map_err(|e| EvalError::Corpus(e.to_string()))?;
    }
    Ok(pairs.len())
}

pub fn save_reference_pairs(path: impl AsRef<Path>, pairs: &[ReferencePair]) -> Result<usize> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| EvalError::from_io(path, e))?;
    let mut writer = BufWriter::new(file);
    let written = write_reference_pairs(&mut writer, pairs)?;
    writer.flush().map_err(|e| EvalError::from_io(path, e))?;
    Ok(written)
}

#[cfg(feature = "python")]
pub use hf::HfFloresSource;

#[cfg(feature = "python")]
mod hf {
    use pyo3::prelude::*;
    use tracing::info;

    use super::{CorpusSource, FloresLanguage, ReferencePair, Split};
    use crate::error::{EvalError, Result};

    /// FLORES-200 through the Hugging Face `datasets` package.
    pub struct HfFloresSource {
        dataset: String,
    }

    impl Default for HfFloresSource {
        fn default() -> Self {
            Self {
                dataset: "facebook/flores".to_string(),
            }
        }
    }

    fn corpus_error(err: PyErr) -> EvalError {
        EvalError::Corpus(err.to_string())
    }

    impl CorpusSource for HfFloresSource {
        fn fetch(
            &self,
            lang_a: &FloresLanguage,
            lang_b: &FloresLanguage,
            split: Split,
        ) -> Result<Vec<ReferencePair>> {
            Python::with_gil(|py| {
                let datasets = py.import("datasets").map_err(corpus_error)?;
                let config = format!("{lang_a}-{lang_b}");
                info!(
                    dataset = %self.dataset,
                    config = %config,
                    split = %split,
                    "downloading dataset"
                );

                let kwargs = pyo3::types::PyDict::new(py);
                kwargs.set_item("split", split.as_str()).map_err(corpus_error)?;
                let dataset = datasets
                    .call_method("load_dataset", (self.dataset.as_str(), config), Some(&kwargs))
                    .map_err(corpus_error)?;

                let column_a = format!("sentence_{lang_a}");
                let column_b = format!("sentence_{lang_b}");
                let mut pairs = Vec::new();
                for example in dataset.try_iter().map_err(corpus_error)? {
                    let example = example.map_err(corpus_error)?;
                    let sentence_a: String = example
                        .get_item(column_a.as_str())
                        .and_then(|v| v.extract())
                        .map_err(corpus_error)?;
                    let sentence_b: String = example
                        .get_item(column_b.as_str())
                        .and_then(|v| v.extract())
                        .map_err(corpus_error)?;
                    pairs.push(ReferencePair {
                        sentence_a,
                        sentence_b,
                    });
                }
                info!(pairs = pairs.len(), "extracted sentence pairs");
                Ok(pairs)
            })
        }
    }
}
