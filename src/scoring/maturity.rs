//! Maturity levels and the score thresholds that unlock them

use crate::checks::{MAX_GATE_LEVEL, MIN_GATE_LEVEL};
use crate::models::{GateResult, MAX_SCORE};
use std::collections::BTreeMap;
use thiserror::Error;

/// Level reached with no score and no gates
pub const BASE_LEVEL: u8 = 1;

/// Default minimum total score for levels 2..=5
pub const DEFAULT_THRESHOLDS: [f64; 4] = [6.0, 9.0, 13.0, 15.0];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("threshold level {0} is outside 2..=5")]
    LevelOutOfRange(u8),
    #[error("threshold for level {level} is {value}, must be within 0..=16")]
    OutOfScale { level: u8, value: f64 },
    #[error("thresholds must strictly increase with level (level {level} = {value}, level {previous_level} = {previous})")]
    NotIncreasing {
        level: u8,
        value: f64,
        previous_level: u8,
        previous: f64,
    },
}

/// Display name of a maturity level
pub fn level_name(level: u8) -> &'static str {
    match level {
        1 => "Functional",
        2 => "Documented",
        3 => "Standardized",
        4 => "Optimized",
        5 => "Autonomous",
        _ => "Unknown",
    }
}

/// Minimum total score per level (2..=5)
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    minimums: BTreeMap<u8, f64>,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            minimums: (MIN_GATE_LEVEL..=MAX_GATE_LEVEL)
                .zip(DEFAULT_THRESHOLDS)
                .collect(),
        }
    }
}

impl ThresholdTable {
    /// Apply per-level overrides on top of the defaults.
    ///
    /// The merged table must stay inside the 0..=16 scale and strictly
    /// increase from level 2 to level 5.
    pub fn from_overrides(overrides: &BTreeMap<u8, f64>) -> Result<Self, ThresholdError> {
        let mut table = Self::default();
        for (&level, &value) in overrides {
            if !(MIN_GATE_LEVEL..=MAX_GATE_LEVEL).contains(&level) {
                return Err(ThresholdError::LevelOutOfRange(level));
            }
            if !value.is_finite() || !(0.0..=MAX_SCORE).contains(&value) {
                return Err(ThresholdError::OutOfScale { level, value });
            }
            table.minimums.insert(level, value);
        }

        let mut previous: Option<(u8, f64)> = None;
        for (&level, &value) in &table.minimums {
            if let Some((previous_level, prev)) = previous {
                if value <= prev {
                    return Err(ThresholdError::NotIncreasing {
                        level,
                        value,
                        previous_level,
                        previous: prev,
                    });
                }
            }
            previous = Some((level, value));
        }
        Ok(table)
    }

    pub fn minimum(&self, level: u8) -> Option<f64> {
        self.minimums.get(&level).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.minimums.iter().map(|(&l, &v)| (l, v))
    }
}

/// Achieved level for a total score and per-level gate results.
///
/// Walks down from level 5 and returns the first level whose score
/// threshold is met and whose whole gate chain (2 through that level)
/// passes. A missing gate entry counts as failed.
pub fn classify(total_score: f64, gates: &BTreeMap<u8, GateResult>, thresholds: &ThresholdTable) -> u8 {
    let gate_passed = |level: u8| gates.get(&level).is_some_and(|g| g.passed);

    (MIN_GATE_LEVEL..=MAX_GATE_LEVEL)
        .rev()
        .find(|&level| {
            thresholds
                .minimum(level)
                .is_some_and(|min| total_score >= min)
                && (MIN_GATE_LEVEL..=level).all(gate_passed)
        })
        .unwrap_or(BASE_LEVEL)
}
