use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{EvalError, Result};

const FIELD_NAMES: [&str; 4] = [
    "reference_a",
    "reference_b",
    "translation_a_to_b",
    "translation_b_to_a",
];

/// One aligned evaluation unit: both references plus one machine
/// translation in each direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    pub reference_a: String,
    pub reference_b: String,
    pub translation_a_to_b: String,
    pub translation_b_to_a: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordDefect {
    FieldCount(usize),
    EmptyField(&'static str),
}

impl fmt::Display for RecordDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordDefect::FieldCount(found) => write!(
                f,
                "found {found} tab-separated fields, expected {}",
                FIELD_NAMES.len()
            ),
            RecordDefect::EmptyField(name) => write!(f, "field {name} is empty"),
        }
    }
}

impl TranslationRecord {
    /// Parses one line with its trailing whitespace already removed.
    pub fn parse(line: &str) -> Result<Self, RecordDefect> {
        let fields: Vec<&str> = line.split('\t').collect();
        let &[reference_a, reference_b, translation_a_to_b, translation_b_to_a] =
            fields.as_slice()
        else {
            return Err(RecordDefect::FieldCount(fields.len()));
        };

        if let Some(index) = fields.iter().position(|field| field.is_empty()) {
            return Err(RecordDefect::EmptyField(FIELD_NAMES[index]));
        }

        Ok(Self {
            reference_a: reference_a.to_string(),
            reference_b: reference_b.to_string(),
            translation_a_to_b: translation_a_to_b.to_string(),
            translation_b_to_a: translation_b_to_a.to_string(),
        })
    }
}

/// Loads every record of a tab-separated file, in file order.
///
/// Trailing whitespace, including the line terminator and a trailing tab, is
/// dropped before splitting. Any malformed line fails the whole load; an empty
/// file yields no records.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<TranslationRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| EvalError::from_io(path, e))?;
    let mut reader = BufReader::new(file);

    let mut records = Vec::new();
    let mut buf = String::new();
    let mut line_number = 0;
    loop {
        buf.clear();
        let read = reader
            .read_line(&mut buf)
            .map_err(|e| EvalError::from_io(path, e))?;
        if read == 0 {
            break;
        }
        line_number += 1;

        let record = TranslationRecord::parse(buf.trim_end()).map_err(|defect| {
            EvalError::MalformedRecord {
                path: path.to_path_buf(),
                line: line_number,
                defect,
            }
        })?;
        records.push(record);
    }

    debug!(path = %path.display(), records = records.len(), "loaded translation records");
    Ok(records)
}
