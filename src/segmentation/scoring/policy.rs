use serde::{Deserialize, Serialize};

/// Minimum historical approval rate for an unconditional recommendation.
pub const ELIGIBLE_APPROVAL_RATE: f64 = 0.7;
/// Minimum historical approval rate for a conditional recommendation.
pub const CONDITIONAL_APPROVAL_RATE: f64 = 0.5;

/// Credit recommendation derived from the nearest segment's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Eligible,
    EligibleWithConditions,
    NotEligible,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Recommendation::Eligible => "ELIGIBLE",
            Recommendation::EligibleWithConditions => "ELIGIBLE_WITH_CONDITIONS",
            Recommendation::NotEligible => "NOT_ELIGIBLE",
        }
    }

    pub const fn summary(self) -> &'static str {
        match self {
            Recommendation::Eligible => "eligible for credit",
            Recommendation::EligibleWithConditions => "eligible subject to additional conditions",
            Recommendation::NotEligible => "not eligible for credit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }

    /// Display colour used by dashboards.
    pub const fn color(self) -> &'static str {
        match self {
            RiskLevel::Low => "green",
            RiskLevel::Medium => "yellow",
            RiskLevel::High => "red",
        }
    }
}

pub fn recommend(approval_rate: f64) -> (Recommendation, RiskLevel) {
    if approval_rate >= ELIGIBLE_APPROVAL_RATE {
        (Recommendation::Eligible, RiskLevel::Low)
    } else if approval_rate >= CONDITIONAL_APPROVAL_RATE {
        (Recommendation::EligibleWithConditions, RiskLevel::Medium)
    } else {
        (Recommendation::NotEligible, RiskLevel::High)
    }
}
