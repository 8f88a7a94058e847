use crate::report::{Category, CategoryResult, CategoryStatus, Finding, Severity, SubScore};

/// Running score for one category
///
/// Scores start at 100 and every violated rule deducts its points while
/// recording exactly one [`Finding`]. The final score is clamped to 0..=100.
#[derive(Debug, Clone)]
pub struct Scorecard {
    category: Category,
    score: f64,
    findings: Vec<Finding>,
    sub_scores: Vec<SubScore>,
}

impl Scorecard {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            score: 100.0,
            findings: Vec::new(),
            sub_scores: Vec::new(),
        }
    }

    /// Current score before clamping
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// A finding in this card's category, not yet recorded
    pub fn finding(
        &self,
        rule: &str,
        severity: Severity,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Finding {
        Finding::new(self.category, rule, severity, message, recommendation)
    }

    /// Records a finding and deducts its points
    pub fn penalize(&mut self, points: f64, finding: Finding) {
        self.score -= points.max(0.0);
        self.findings.push(finding);
    }

    /// Shorthand for building and recording a finding
    pub fn flag(
        &mut self,
        points: f64,
        rule: &str,
        severity: Severity,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) {
        let finding = self.finding(rule, severity, message, recommendation);
        self.penalize(points, finding);
    }

    /// Replaces the running score with a blend of itself and `other`
    ///
    /// `share` is the weight of `other` in 0..=1.
    pub fn blend(&mut self, other: f64, share: f64) {
        let share = share.clamp(0.0, 1.0);
        self.score = self.score * (1.0 - share) + other * share;
    }

    pub fn sub_score(&mut self, sub_score: SubScore) {
        self.sub_scores.push(sub_score);
    }

    /// Closes the card into a successful [`CategoryResult`]
    pub fn finish(self, weight: f64) -> CategoryResult {
        CategoryResult {
            category_name: self.category,
            score: clamp_to_u8(self.score),
            weight,
            findings: self.findings,
            status: CategoryStatus::Ok,
            sub_scores: self.sub_scores,
        }
    }
}

fn clamp_to_u8(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as u8
}

/// Points for a rule whose cost grows with how far a value misses its target
///
/// `shortfall` is the miss as a fraction (0 = just missed, 1 = missed
/// entirely) and is clamped to 0..=1. The result runs from `base` to
/// `base + span`.
pub fn graduated(base: f64, span: f64, shortfall: f64) -> f64 {
    let shortfall = if shortfall.is_nan() {
        0.0
    } else {
        shortfall.clamp(0.0, 1.0)
    };
    base + span * shortfall
}
