//! Plausibility label for a prediction.
//!
//! Each rule checks whether an input (or the predicted price) sits in the
//! range most listings in the training data fall into. Every rule is
//! evaluated, weights of the satisfied ones are summed in table order, and
//! the sum is mapped to a level. This is not a statistical interval.

use crate::domain::model::{ConfidenceLevel, PropertyDescriptor};

pub const HIGH_THRESHOLD: f64 = 0.8;
pub const MEDIUM_THRESHOLD: f64 = 0.5;

pub struct ConfidenceRule {
    pub name: &'static str,
    pub weight: f64,
    pub applies: fn(&PropertyDescriptor, f64) -> bool,
}

pub const RULES: [ConfidenceRule; 4] = [
    ConfidenceRule {
        name: "typical_area",
        weight: 0.3,
        applies: |d, _| (40.0..=200.0).contains(&d.area),
    },
    ConfidenceRule {
        name: "typical_rooms",
        weight: 0.2,
        applies: |d, _| (2..=5).contains(&d.rooms),
    },
    ConfidenceRule {
        name: "typical_year",
        weight: 0.2,
        applies: |d, _| (1960..=2025).contains(&d.year_constructed),
    },
    ConfidenceRule {
        name: "typical_price",
        weight: 0.3,
        applies: |_, price| (100_000.0..=1_500_000.0).contains(&price),
    },
];

pub fn score(descriptor: &PropertyDescriptor, price: f64) -> f64 {
    let mut total = 0.0;
    for rule in &RULES {
        if (rule.applies)(descriptor, price) {
            total += rule.weight;
        }
    }
    total
}

pub fn level_for(score: f64) -> ConfidenceLevel {
    if score >= HIGH_THRESHOLD {
        ConfidenceLevel::High
    } else if score >= MEDIUM_THRESHOLD {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

pub fn estimate(descriptor: &PropertyDescriptor, price: f64) -> ConfidenceLevel {
    let score = score(descriptor, price);
    let level = level_for(score);
    tracing::debug!("Confidence score {:.1} -> {}", score, level);
    level
}
