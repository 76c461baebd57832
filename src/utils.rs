use crate::tokenize::Tokenizer;

pub struct Sequence {
    pub word_vector: Vec<String>,
    pub n_words: usize,
}

impl Sequence {
    pub fn new(text: &str, tokenizer: Tokenizer, lowercase: bool) -> Self {
        let word_vec = if lowercase {
            tokenizer.tokenize(&text.to_lowercase())
        } else {
            tokenizer.tokenize(text)
        };
        let word_vec_len = word_vec.len();
        Sequence {
            word_vector: word_vec,
            n_words: word_vec_len,
        }
    }
}

/// Arithmetic mean computed incrementally, so a run of identical values
/// averages to exactly that value. `None` for an empty slice.
pub fn running_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut mean = 0.0;
    for (i, value) in values.iter().enumerate() {
        mean += (value - mean) / (i + 1) as f64;
    }
    Some(mean)
}
