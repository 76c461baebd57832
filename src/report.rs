use std::fmt;

/// Ordered language pair; `source` is language A, `target` language B.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionScores {
    /// Mean sentence BLEU, 0-100.
    pub bleu: f64,
    /// Mean quality-estimation score.
    pub quality: f64,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairReport {
    pub pair: LanguagePair,
    pub quality_metric: String,
    pub a_to_b: DirectionScores,
    pub b_to_a: DirectionScores,
}

/// The four report lines: BLEU A→B, BLEU B→A, quality A→B, quality B→A.
pub fn format_report(report: &PairReport) -> [String; 4] {
    let a = &report.pair.source;
    let b = &report.pair.target;
    let metric = &report.quality_metric;
    [
        format!("{a} to {b} BLEU score: {:.2}", report.a_to_b.bleu),
        format!("{b} to {a} BLEU score: {:.2}", report.b_to_a.bleu),
        format!("{a} to {b} {metric} score: {:.2}", report.a_to_b.quality),
        format!("{b} to {a} {metric} score: {:.2}", report.b_to_a.quality),
    ]
}

impl fmt::Display for PairReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in format_report(self) {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
