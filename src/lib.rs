pub mod bleu;
#[cfg(feature = "python")]
pub mod comet;
pub mod config;
pub mod corpus;
pub mod error;
pub mod pipeline;
pub mod quality;
pub mod record;
pub mod report;
pub mod score;
pub mod telemetry;
pub mod tokenize;
#[cfg(feature = "torch")]
pub mod torchscript;
pub mod utils;

// TODO: Quality batches for all pairs could go through the model in one call for
//       throughput, splitting the scores back per pair and direction afterwards.

pub use bleu::{sentence_bleu, BleuConfig, Smoothing};
pub use config::EvalConfig;
pub use error::{EvalError, Result};
pub use pipeline::{pair_file, Pipeline};
pub use quality::{load_estimator, Backend, Device, ModelConfig, QualityEstimator, QualityInput};
pub use record::{load_records, RecordDefect, TranslationRecord};
pub use report::{format_report, DirectionScores, LanguagePair, PairReport};
pub use score::{BidirectionalScorer, Direction, DirectionalScoreAccumulator};
pub use tokenize::Tokenizer;
