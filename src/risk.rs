//! Composite disengagement risk scoring

use crate::data::StudentRecord;
use serde::Serialize;

/// Tri-level risk classification derived from the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLabel {
    Low,
    Medium,
    High,
}

impl RiskLabel {
    pub fn from_score(score: u32) -> RiskLabel {
        if score >= 5 {
            RiskLabel::High
        } else if score >= 3 {
            RiskLabel::Medium
        } else {
            RiskLabel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLabel::Low => "Low",
            RiskLabel::Medium => "Medium",
            RiskLabel::High => "High",
        }
    }
}

/// Compute the additive disengagement risk score and its label
///
/// Independent of clustering and personas; a pure function of raw fields.
/// The composite is a 0-9 scale, so the rule sum saturates at 9.
pub fn compute_risk(record: &StudentRecord) -> (u32, RiskLabel) {
    let mut score = 0;

    if record.attendance < 70.0 {
        score += 2;
    } else if record.attendance < 80.0 {
        score += 1;
    }

    match record.motivation_level.as_str() {
        "Low" => score += 2,
        "Medium" => score += 1,
        _ => {}
    }

    if record.exam_score < 62.0 {
        score += 2;
    } else if record.exam_score < 67.0 {
        score += 1;
    }

    if record.internet_access == "No" {
        score += 1;
    }
    if record.learning_disabilities == "Yes" {
        score += 1;
    }
    if record.hours_studied < 10.0 {
        score += 1;
    }
    if record.peer_influence == "Negative" {
        score += 1;
    }

    let score = score.min(9);
    (score, RiskLabel::from_score(score))
}
