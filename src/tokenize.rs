use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

// mteval-v13a punctuation handling. Each rule is (pattern, replacement),
// applied in order over the space-padded line.
static RULES_13A: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        // ASCII symbols: { | } ~ [ \ ] ^ _ ` space ! " # $ % & ( ) * + : ; < = > ? @ /
        (r"([{-~\[-` -&(-+:-@/])", " ${1} "),
        // period and comma unless preceded by a digit
        (r"([^0-9])([.,])", "${1} ${2} "),
        // period and comma unless followed by a digit
        (r"([.,])([^0-9])", " ${1} ${2}"),
        // dash when preceded by a digit
        (r"([0-9])(-)", "${1} ${2} "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("13a tokenizer patterns are valid"),
            replacement,
        )
    })
    .collect()
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tokenizer {
    #[default]
    #[serde(rename = "13a")]
    ThirteenA,
    None,
}

impl Tokenizer {
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        match self {
            Tokenizer::ThirteenA => tokenize_13a(text),
            Tokenizer::None => text.split_whitespace().map(str::to_string).collect(),
        }
    }
}

fn tokenize_13a(text: &str) -> Vec<String> {
    let mut line = text
        .replace("<skipped>", "")
        .replace("-\n", "")
        .replace('\n', " ");

    if line.contains('&') {
        line = line
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">");
    }

    let mut padded = format!(" {line} ");
    for (pattern, replacement) in RULES_13A.iter() {
        padded = pattern.replace_all(&padded, *replacement).into_owned();
    }
    padded.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(text: &str) -> Vec<String> {
        Tokenizer::ThirteenA.tokenize(text)
    }

    #[test]
    fn test_13a_splits_trailing_punctuation() {
        assert_eq!(tok("Hello, world!"), vec!["Hello", ",", "world", "!"]);
    }

    #[test]
    fn test_13a_keeps_decimal_numbers_together() {
        assert_eq!(tok("It costs 3.50 today."), vec!["It", "costs", "3.50", "today", "."]);
        assert_eq!(tok("1,000 people"), vec!["1,000", "people"]);
    }

    #[test]
    fn test_13a_splits_dash_after_digit() {
        assert_eq!(tok("2-3 days"), vec!["2", "-", "3", "days"]);
    }

    #[test]
    fn test_13a_keeps_apostrophes_and_accents() {
        // apostrophe (0x27) is outside the punctuation class
        assert_eq!(tok("C'est déjà l'été"), vec!["C'est", "déjà", "l'été"]);
    }

    #[test]
    fn test_13a_unescapes_entities() {
        assert_eq!(tok("a &amp; b"), vec!["a", "&", "b"]);
        assert_eq!(tok("&quot;x&quot;"), vec!["\"", "x", "\""]);
    }

    #[test]
    fn test_13a_collapses_whitespace() {
        assert_eq!(tok("  the   cat\tsat  "), vec!["the", "cat", "sat"]);
        assert!(tok("   ").is_empty());
    }

    #[test]
    fn test_none_tokenizer_only_splits_whitespace() {
        assert_eq!(
            Tokenizer::None.tokenize("Hello, world!"),
            vec!["Hello,", "world!"]
        );
    }
}
