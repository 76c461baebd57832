use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::bleu::{sentence_bleu, BleuConfig};
use crate::error::{EvalError, Result};
use crate::quality::{QualityEstimator, QualityInput};
use crate::record::TranslationRecord;
use crate::report::{DirectionScores, LanguagePair, PairReport};
use crate::utils::running_mean;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    AToB,
    BToA,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::AToB => f.write_str("A->B"),
            Direction::BToA => f.write_str("B->A"),
        }
    }
}

impl Direction {
    /// (source, candidate, reference) of `record` in this direction.
    fn project<'a>(&self, record: &'a TranslationRecord) -> (&'a str, &'a str, &'a str) {
        match self {
            Direction::AToB => (
                record.reference_a.as_str(),
                record.translation_a_to_b.as_str(),
                record.reference_b.as_str(),
            ),
            Direction::BToA => (
                record.reference_b.as_str(),
                record.translation_b_to_a.as_str(),
                record.reference_a.as_str(),
            ),
        }
    }

    pub fn quality_input(&self, record: &TranslationRecord) -> QualityInput {
        let (source, candidate, reference) = self.project(record);
        QualityInput {
            source: source.to_string(),
            candidate: candidate.to_string(),
            reference: reference.to_string(),
        }
    }

    pub fn lexical_score(&self, record: &TranslationRecord, config: &BleuConfig) -> f64 {
        let (_, candidate, reference) = self.project(record);
        sentence_bleu(candidate, &[reference], config)
    }
}

/// Running state for one direction of one language pair.
///
/// `record_count` always equals `quality_inputs.len()`.
#[derive(Debug)]
pub struct DirectionalScoreAccumulator {
    direction: Direction,
    lexical_score_sum: f64,
    record_count: usize,
    quality_inputs: Vec<QualityInput>,
}

impl DirectionalScoreAccumulator {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            lexical_score_sum: 0.0,
            record_count: 0,
            quality_inputs: Vec::new(),
        }
    }

    pub fn push(&mut self, lexical_score: f64, quality_input: QualityInput) {
        self.lexical_score_sum += lexical_score;
        self.record_count += 1;
        self.quality_inputs.push(quality_input);
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// `None` until at least one record has been pushed.
    pub fn lexical_mean(&self) -> Option<f64> {
        (self.record_count > 0).then(|| self.lexical_score_sum / self.record_count as f64)
    }

    pub fn quality_inputs(&self) -> &[QualityInput] {
        &self.quality_inputs
    }

    /// Submits the deferred batch and returns the finished direction scores.
    /// Failures are tagged with `pair` and this direction.
    async fn finish(
        self,
        pair: &LanguagePair,
        estimator: &Arc<dyn QualityEstimator>,
    ) -> Result<DirectionScores> {
        let empty = || EvalError::EmptyCorpus {
            pair: pair.to_string(),
        };
        let bleu = self.lexical_mean().ok_or_else(empty)?;
        let records = self.record_count;
        let direction = self.direction;

        let scores = predict_blocking(Arc::clone(estimator), self.quality_inputs)
            .await
            .map_err(|e| EvalError::Scoring {
                pair: pair.to_string(),
                direction: direction.to_string(),
                source: Box::new(e),
            })?;
        if scores.len() != records {
            return Err(EvalError::ScoreCountMismatch {
                pair: pair.to_string(),
                direction: direction.to_string(),
                expected: records,
                actual: scores.len(),
            });
        }
        let quality = running_mean(&scores).ok_or_else(empty)?;

        Ok(DirectionScores {
            bleu,
            quality,
            records,
        })
    }
}

async fn predict_blocking(
    estimator: Arc<dyn QualityEstimator>,
    batch: Vec<QualityInput>,
) -> Result<Vec<f64>> {
    tokio::task::spawn_blocking(move || estimator.predict(&batch))
        .await
        .map_err(|e| EvalError::Prediction(format!("prediction task failed: {e}")))?
}

/// Per-record BLEU for both directions. Records are independent, so each is
/// its own future; results come back in record order.
pub async fn get_lexical_scores(
    records: &[TranslationRecord],
    config: &BleuConfig,
) -> Vec<(f64, f64)> {
    let tasks = records.iter().map(|record| async move {
        (
            Direction::AToB.lexical_score(record, config),
            Direction::BToA.lexical_score(record, config),
        )
    });
    futures::future::join_all(tasks).await
}

/// Scores a language pair in both directions with an injected estimator.
pub struct BidirectionalScorer {
    estimator: Arc<dyn QualityEstimator>,
    bleu: BleuConfig,
}

impl BidirectionalScorer {
    pub fn new(estimator: Arc<dyn QualityEstimator>, bleu: BleuConfig) -> Self {
        Self { estimator, bleu }
    }

    pub async fn score(
        &self,
        pair: &LanguagePair,
        records: &[TranslationRecord],
    ) -> Result<PairReport> {
        if records.is_empty() {
            return Err(EvalError::EmptyCorpus {
                pair: pair.to_string(),
            });
        }

        let mut a_to_b = DirectionalScoreAccumulator::new(Direction::AToB);
        let mut b_to_a = DirectionalScoreAccumulator::new(Direction::BToA);

        let lexical = get_lexical_scores(records, &self.bleu).await;
        for (record, (bleu_a_to_b, bleu_b_to_a)) in records.iter().zip(lexical) {
            a_to_b.push(bleu_a_to_b, Direction::AToB.quality_input(record));
            b_to_a.push(bleu_b_to_a, Direction::BToA.quality_input(record));
        }
        debug!(pair = %pair, records = records.len(), "lexical scores accumulated");

        // One batch per direction, A->B strictly before B->A
        info!(pair = %pair, direction = %Direction::AToB, "running quality estimation");
        let a_to_b = a_to_b.finish(pair, &self.estimator).await?;
        info!(pair = %pair, direction = %Direction::BToA, "running quality estimation");
        let b_to_a = b_to_a.finish(pair, &self.estimator).await?;

        Ok(PairReport {
            pair: pair.clone(),
            quality_metric: self.estimator.metric_name().to_string(),
            a_to_b,
            b_to_a,
        })
    }
}
