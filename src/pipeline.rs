use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::config::EvalConfig;
use crate::error::{EvalError, Result};
use crate::quality::QualityEstimator;
use crate::record::load_records;
use crate::report::{format_report, LanguagePair, PairReport};
use crate::score::BidirectionalScorer;

/// `{data_dir}/{a}_{b}_{suffix}.tsv`
pub fn pair_file(data_dir: &Path, pair: &LanguagePair, suffix: &str) -> PathBuf {
    data_dir.join(format!("{}_{}_{}.tsv", pair.source, pair.target, suffix))
}

/// Runs Load -> Score -> Format over every configured pair, one at a time.
pub struct Pipeline {
    config: EvalConfig,
    scorer: BidirectionalScorer,
}

impl Pipeline {
    pub fn new(config: EvalConfig, estimator: Arc<dyn QualityEstimator>) -> Self {
        let scorer = BidirectionalScorer::new(estimator, config.bleu);
        Self { config, scorer }
    }

    pub async fn score_pair(&self, pair: &LanguagePair) -> Result<PairReport> {
        let path = pair_file(&self.config.data_dir, pair, &self.config.file_suffix);
        info!(pair = %pair, path = %path.display(), "scoring file");
        let records = load_records(&path)?;
        self.scorer.score(pair, &records).await
    }

    /// Writes each pair's report to `out` before starting the next pair.
    /// The first failure ends the run; reports already written stay written.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<Vec<PairReport>> {
        let mut reports = Vec::new();
        for pair in self.config.language_pairs() {
            let report = self.score_pair(&pair).await?;
            for line in format_report(&report) {
                writeln!(out, "{line}").map_err(|e| EvalError::Io {
                    path: PathBuf::from("<output>"),
                    source: e,
                })?;
            }
            out.flush().map_err(|e| EvalError::Io {
                path: PathBuf::from("<output>"),
                source: e,
            })?;
            info!(
                pair = %pair,
                records = report.a_to_b.records,
                "pair report written"
            );
            reports.push(report);
        }
        Ok(reports)
    }
}
