use crate::tokenize::Tokenizer;
use crate::utils::Sequence;
use serde::Deserialize;
use std::collections::HashMap;
const MAX_NGRAMS: usize = 4;

// log(0) stand-in so a zero precision drives the score to ~0 instead of NaN
const LOG_ZERO: f64 = -9999999999.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Smoothing {
    None,
    /// Replace zero precisions with `smooth_value / total`.
    Floor,
    /// Add `smooth_value` to matches and totals for orders above unigrams.
    AddK,
    /// Halve the pseudo-count for every successive zero precision.
    #[default]
    Exp,
}

impl Smoothing {
    /// Value used when the config does not set `smooth_value`.
    pub fn default_value(&self) -> f64 {
        match self {
            Smoothing::Floor => 0.1,
            Smoothing::AddK => 1.0,
            Smoothing::None | Smoothing::Exp => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BleuConfig {
    pub tokenizer: Tokenizer,
    pub smoothing: Smoothing,
    /// Floor value or `k`; unset means the method's default.
    pub smooth_value: Option<f64>,
    pub lowercase: bool,
    /// Only average over the n-gram orders the candidate actually has.
    pub effective_order: bool,
}

impl Default for BleuConfig {
    fn default() -> Self {
        Self {
            tokenizer: Tokenizer::ThirteenA,
            smoothing: Smoothing::Exp,
            smooth_value: None,
            lowercase: false,
            effective_order: true,
        }
    }
}

impl BleuConfig {
    pub fn smooth_value(&self) -> f64 {
        self.smooth_value.unwrap_or_else(|| self.smoothing.default_value())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct NgramStats {
    correct: [usize; MAX_NGRAMS],
    total: [usize; MAX_NGRAMS],
    sys_len: usize,
    ref_len: usize,
}

fn get_ngrams_from_word_vec(word_vec: &[String], ngrams: usize) -> Vec<&[String]> {
    if word_vec.len() < ngrams {
        return vec![];
    }
    word_vec.windows(ngrams).collect()
}

fn get_ngram_counts<'a>(ngrams_vec: &[&'a [String]]) -> HashMap<&'a [String], usize> {
    let mut hashmap: HashMap<&[String], usize> = HashMap::new();
    for ngram in ngrams_vec {
        *hashmap.entry(*ngram).or_insert(0) += 1;
    }
    hashmap
}

fn get_matches_clipped(
    pred_map: &HashMap<&[String], usize>,
    gold_map: &HashMap<&[String], usize>,
) -> usize {
    let mut matches: usize = 0;
    for (ng, pred_count) in pred_map {
        if let Some(gold_count) = gold_map.get(ng) {
            matches += pred_count.min(gold_count);
        }
    }
    matches
}

// Closest reference length to the candidate; ties go to the shorter reference.
fn closest_ref_len(pred_len: usize, golds: &[Sequence]) -> usize {
    let mut closest_diff = usize::MAX;
    let mut closest_len = 0;
    for gold in golds {
        let diff = pred_len.abs_diff(gold.n_words);
        if diff < closest_diff || (diff == closest_diff && gold.n_words < closest_len) {
            closest_diff = diff;
            closest_len = gold.n_words;
        }
    }
    closest_len
}

fn collect_stats(pred: &Sequence, golds: &[Sequence]) -> NgramStats {
    let mut stats = NgramStats {
        sys_len: pred.n_words,
        ref_len: closest_ref_len(pred.n_words, golds),
        ..Default::default()
    };

    for n in 1..=MAX_NGRAMS {
        let pred_ngrams_vec = get_ngrams_from_word_vec(&pred.word_vector, n);
        stats.total[n - 1] = pred_ngrams_vec.len();
        if pred_ngrams_vec.is_empty() {
            continue;
        }
        let pred_ngrams_counts = get_ngram_counts(&pred_ngrams_vec);

        // Clip against the highest count of each n-gram over all references
        let mut gold_max_counts: HashMap<&[String], usize> = HashMap::new();
        for gold in golds {
            let gold_ngrams_vec = get_ngrams_from_word_vec(&gold.word_vector, n);
            for (ngram, count) in get_ngram_counts(&gold_ngrams_vec) {
                let entry = gold_max_counts.entry(ngram).or_insert(0);
                *entry = (*entry).max(count);
            }
        }
        stats.correct[n - 1] = get_matches_clipped(&pred_ngrams_counts, &gold_max_counts);
    }
    stats
}

fn compute_bleu(stats: &NgramStats, config: &BleuConfig) -> f64 {
    // No matching n-gram of any order (this includes an empty candidate)
    if stats.sys_len == 0 || stats.correct.iter().all(|&c| c == 0) {
        return 0.0;
    }

    let brevity_penalty: f64 = if stats.sys_len < stats.ref_len {
        (1.0 - stats.ref_len as f64 / stats.sys_len as f64).exp()
    } else {
        1.0
    };

    let mut precisions = [0.0f64; MAX_NGRAMS];
    let mut smooth_mteval = 1.0;
    let mut eff_order = MAX_NGRAMS;
    let smooth_value = config.smooth_value();

    for n in 1..=MAX_NGRAMS {
        let mut correct = stats.correct[n - 1] as f64;
        let mut total = stats.total[n - 1] as f64;
        if config.smoothing == Smoothing::AddK && n > 1 {
            correct += smooth_value;
            total += smooth_value;
        }
        if total == 0.0 {
            break;
        }
        if config.effective_order {
            eff_order = n;
        }

        precisions[n - 1] = if correct == 0.0 {
            match config.smoothing {
                Smoothing::Exp => {
                    smooth_mteval *= 2.0;
                    100.0 / (smooth_mteval * total)
                }
                Smoothing::Floor => 100.0 * smooth_value / total,
                Smoothing::None | Smoothing::AddK => 0.0,
            }
        } else {
            100.0 * correct / total
        };
    }

    let log_sum: f64 = precisions[..eff_order]
        .iter()
        .map(|&p| if p == 0.0 { LOG_ZERO } else { p.ln() })
        .sum();
    brevity_penalty * (log_sum / eff_order as f64).exp()
}

/// Sentence-level BLEU on the 0-100 scale.
pub fn bleu_score(pred: &Sequence, golds: &[Sequence], config: &BleuConfig) -> f64 {
    compute_bleu(&collect_stats(pred, golds), config)
}

/// Tokenizes `candidate` and each reference per `config` and scores them.
pub fn sentence_bleu(candidate: &str, references: &[&str], config: &BleuConfig) -> f64 {
    let pred = Sequence::new(candidate, config.tokenizer, config.lowercase);
    let golds: Vec<Sequence> = references
        .iter()
        .map(|reference| Sequence::new(reference, config.tokenizer, config.lowercase))
        .collect();
    bleu_score(&pred, &golds, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(pred: &str, gold: &str) -> f64 {
        sentence_bleu(pred, &[gold], &BleuConfig::default())
    }

    #[test]
    fn test_bleu_perfect_match() {
        let s = score("the quick brown fox", "the quick brown fox");
        assert!((s - 100.0).abs() < 1e-9, "Expected BLEU 100, got {}", s);
    }

    #[test]
    fn test_bleu_perfect_match_short_sentences_uses_effective_order() {
        // two tokens only have unigrams and bigrams
        let s = score("Hello world", "Hello world");
        assert!((s - 100.0).abs() < 1e-9, "Expected BLEU 100, got {}", s);
        let s = score("Bonne nuit", "Bonne nuit");
        assert!((s - 100.0).abs() < 1e-9, "Expected BLEU 100, got {}", s);
    }

    #[test]
    fn test_bleu_no_match() {
        let s = score("cats sleep all day", "the quick brown fox");
        assert_eq!(s, 0.0, "Expected BLEU 0.0, got {}", s);
    }

    #[test]
    fn test_bleu_floor_smoothing_value() {
        let config = BleuConfig {
            smoothing: Smoothing::Floor,
            ..Default::default()
        };
        let s = sentence_bleu("the cat sat down", &["the cat ran away down"], &config);
        let precisions: [f64; 4] = [75.0, 100.0 / 3.0, 5.0, 10.0];
        let geo = (precisions.iter().map(|p| p.ln()).sum::<f64>() / 4.0).exp();
        let bp = (1.0f64 - 5.0 / 4.0).exp();
        assert!((s - bp * geo).abs() < 1e-9, "Expected {}, got {}", bp * geo, s);
    }

    #[test]
    fn test_bleu_add_k_smoothing_value() {
        let config = BleuConfig {
            smoothing: Smoothing::AddK,
            ..Default::default()
        };
        let s = sentence_bleu("the cat sat down", &["the cat ran away down"], &config);
        // k = 1 on bigrams and up: 2/4, 1/3, 1/2
        let precisions: [f64; 4] = [75.0, 50.0, 100.0 / 3.0, 50.0];
        let geo = (precisions.iter().map(|p| p.ln()).sum::<f64>() / 4.0).exp();
        let bp = (1.0f64 - 5.0 / 4.0).exp();
        assert!((s - bp * geo).abs() < 1e-9, "Expected {}, got {}", bp * geo, s);
    }

    #[test]
    fn test_smooth_value_defaults_per_method() {
        let floor = BleuConfig {
            smoothing: Smoothing::Floor,
            ..Default::default()
        };
        assert_eq!(floor.smooth_value(), 0.1);
        let add_k = BleuConfig {
            smoothing: Smoothing::AddK,
            ..Default::default()
        };
        assert_eq!(add_k.smooth_value(), 1.0);
        let custom = BleuConfig {
            smoothing: Smoothing::Floor,
            smooth_value: Some(0.01),
            ..Default::default()
        };
        assert_eq!(custom.smooth_value(), 0.01);
    }

    #[test]
    fn test_bleu_exp_smoothing_value() {
        // 3 of 4 unigrams, 1 of 3 bigrams, 0 of 2 trigrams, 0 of 1 fourgram;
        // exp smoothing gives 100/(2*2) and 100/(4*1) for the zero orders.
        let s = score("the cat sat down", "the cat ran away down");
        let precisions: [f64; 4] = [75.0, 100.0 / 3.0, 25.0, 25.0];
        let geo = (precisions.iter().map(|p| p.ln()).sum::<f64>() / 4.0).exp();
        let bp = (1.0f64 - 5.0 / 4.0).exp();
        assert!((s - bp * geo).abs() < 1e-9, "Expected {}, got {}", bp * geo, s);
    }

    #[test]
    fn test_bleu_repeated_pred_is_clipped() {
        let config = BleuConfig {
            effective_order: true,
            smoothing: Smoothing::None,
            ..Default::default()
        };
        // unigram 2/4, bigram 1/3, trigram 0/2 -> zero precision
        let s = sentence_bleu("the the the the", &["the the"], &config);
        assert!(s < 1e-6, "Expected BLEU ~0, got {}", s);

        let pred = Sequence::new("the the the the", Tokenizer::ThirteenA, false);
        let gold = Sequence::new("the the", Tokenizer::ThirteenA, false);
        let stats = collect_stats(&pred, &[gold]);
        assert_eq!(stats.correct[0], 2);
        assert_eq!(stats.total[0], 4);
        assert_eq!(stats.correct[1], 1);
    }

    #[test]
    fn test_bleu_brevity_penalty() {
        let s = score("the quick brown", "the quick brown fox jumps");
        let expected = 100.0 * (1.0f64 - 5.0 / 3.0).exp();
        assert!((s - expected).abs() < 1e-9, "Expected {}, got {}", expected, s);
    }

    #[test]
    fn test_bleu_multiple_references_take_best_counts_and_closest_length() {
        let s = sentence_bleu(
            "the cat is here",
            &["a dog was there today", "the cat is here"],
            &BleuConfig::default(),
        );
        assert!((s - 100.0).abs() < 1e-9, "Expected BLEU 100, got {}", s);
    }

    #[test]
    fn test_closest_ref_len_prefers_shorter_on_tie() {
        let golds = vec![
            Sequence::new("a b c d e", Tokenizer::None, false),
            Sequence::new("a b c", Tokenizer::None, false),
        ];
        assert_eq!(closest_ref_len(4, &golds), 3);
    }

    #[test]
    fn test_bleu_empty_pred() {
        let s = score("", "the quick brown fox");
        assert_eq!(s, 0.0, "Expected BLEU 0.0 for empty prediction, got {}", s);
    }

    #[test]
    fn test_bleu_empty_gold() {
        let s = score("the quick brown fox", "");
        assert_eq!(s, 0.0, "Expected BLEU 0.0 for empty gold, got {}", s);
    }

    #[test]
    fn test_bleu_lowercase_option() {
        let config = BleuConfig {
            lowercase: true,
            ..Default::default()
        };
        let s = sentence_bleu("The Quick Fox", &["the quick fox"], &config);
        assert!((s - 100.0).abs() < 1e-9, "Expected BLEU 100, got {}", s);
    }

    #[test]
    fn test_bleu_tokenization_matters() {
        // with 13a the trailing period is its own token and matches
        let s = score("Good night.", "Good night.");
        assert!((s - 100.0).abs() < 1e-9, "Expected BLEU 100, got {}", s);
    }
}
