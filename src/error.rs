use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::record::RecordDefect;

pub type Result<T, E = EvalError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("malformed record in {} at line {line}: {defect}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        defect: RecordDefect,
    },

    #[error("input file not found: {}", .path.display())]
    MissingFile { path: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Zero records for a language pair. Reported instead of a 0.00 mean.
    #[error("no records to score for {pair}")]
    EmptyCorpus { pair: String },

    #[error("quality-estimation model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("quality-estimation prediction failed: {0}")]
    Prediction(String),

    /// A backend failure while scoring one direction of a language pair.
    #[error("{direction} quality estimation failed for {pair}: {source}")]
    Scoring {
        pair: String,
        direction: String,
        #[source]
        source: Box<EvalError>,
    },

    #[error("model returned {actual} scores for {expected} {direction} inputs of {pair}")]
    ScoreCountMismatch {
        pair: String,
        direction: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("corpus error: {0}")]
    Corpus(String),

    #[error("invalid language code '{0}', expected the form eng_Latn")]
    InvalidLanguage(String),
}

impl EvalError {
    /// Maps an open/read failure, turning `NotFound` into [`EvalError::MissingFile`].
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            EvalError::MissingFile { path }
        } else {
            EvalError::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_becomes_missing_file() {
        let err = EvalError::from_io(
            "data/en_de_x.tsv",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, EvalError::MissingFile { .. }));
        assert_eq!(err.to_string(), "input file not found: data/en_de_x.tsv");
    }

    #[test]
    fn test_other_io_errors_keep_source() {
        let err = EvalError::from_io(
            "data/en_de_x.tsv",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, EvalError::Io { .. }));
    }

    #[test]
    fn test_malformed_record_message_names_file_and_line() {
        let err = EvalError::MalformedRecord {
            path: PathBuf::from("data/en_fr_x.tsv"),
            line: 7,
            defect: RecordDefect::FieldCount(3),
        };
        assert_eq!(
            err.to_string(),
            "malformed record in data/en_fr_x.tsv at line 7: found 3 tab-separated fields, expected 4"
        );
    }
}
