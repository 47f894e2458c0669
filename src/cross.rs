//! # Threshold crossings
//! Pure detection of a fee moving across one of the configured Gwei levels.
//!
//! When a single tick jumps over several levels only the one nearest to the
//! new value is reported: the highest crossed level on the way down, the
//! lowest on the way up.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

/// Ordered, strictly increasing set of positive Gwei levels.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSet(Vec<f64>);

impl ThresholdSet {
    /// Validate an already ordered list. Rejects duplicates, disorder,
    /// non-positive and non-finite values.
    pub fn new(levels: Vec<f64>) -> Result<Self, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::Thresholds("at least one threshold is required".into()));
        }
        for &t in &levels {
            if !(t.is_finite() && t > 0.0) {
                return Err(ConfigError::Thresholds(format!("{t} is not a positive number")));
            }
        }
        if let Some(w) = levels.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ConfigError::Thresholds(format!(
                "not strictly increasing at {} -> {}",
                w[0], w[1]
            )));
        }
        Ok(Self(levels))
    }

    /// Parse a comma separated list (`"1,2,3,5"`). Order does not matter and
    /// repeated values collapse into one, matching how operators write it.
    pub fn parse_csv(raw: &str) -> Result<Self, ConfigError> {
        let mut levels = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let v: f64 = part
                .parse()
                .map_err(|_| ConfigError::Thresholds(format!("cannot parse {part:?}")))?;
            levels.push(v);
        }
        levels.sort_by(f64::total_cmp);
        levels.dedup();
        Self::new(levels)
    }

    pub fn levels(&self) -> &[f64] {
        &self.0
    }
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self(vec![1.0, 2.0, 3.0, 5.0, 8.0, 12.0, 20.0, 35.0, 60.0, 100.0, 200.0])
    }
}

/// Side of the threshold the fee landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Above => "above",
            Direction::Below => "below",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossEvent {
    pub threshold: f64,
    pub direction: Direction,
}

/// Compare `prev` and `curr` against `thresholds`.
///
/// Down: levels with `prev >= t > curr`, report the max.
/// Up: levels with `prev <= t < curr`, report the min.
/// A value sitting exactly on a level has not crossed it.
pub fn detect_cross(prev: f64, curr: f64, thresholds: &ThresholdSet) -> Option<CrossEvent> {
    let levels = thresholds.levels();

    let down = levels
        .iter()
        .copied()
        .filter(|&t| prev >= t && t > curr)
        .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.max(t))));
    if let Some(threshold) = down {
        return Some(CrossEvent {
            threshold,
            direction: Direction::Below,
        });
    }

    levels
        .iter()
        .copied()
        .find(|&t| prev <= t && t < curr)
        .map(|threshold| CrossEvent {
            threshold,
            direction: Direction::Above,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(v: &[f64]) -> ThresholdSet {
        ThresholdSet::new(v.to_vec()).unwrap()
    }

    #[test]
    fn equal_values_never_cross() {
        let t = ThresholdSet::default();
        for v in [0.5, 1.0, 2.0, 19.99, 20.0, 250.0] {
            assert_eq!(detect_cross(v, v, &t), None, "prev == curr == {v}");
        }
    }

    #[test]
    fn upward_jump_reports_lowest_crossed() {
        let t = set(&[12.0, 20.0, 35.0]);
        let ev = detect_cross(10.0, 40.0, &t).unwrap();
        assert_eq!(ev.threshold, 12.0);
        assert_eq!(ev.direction, Direction::Above);
    }

    #[test]
    fn downward_jump_reports_highest_crossed() {
        let t = set(&[12.0, 20.0, 35.0]);
        let ev = detect_cross(40.0, 10.0, &t).unwrap();
        assert_eq!(ev.threshold, 35.0);
        assert_eq!(ev.direction, Direction::Below);
    }

    #[test]
    fn leaving_a_level_counts_landing_on_it_does_not() {
        let t = set(&[12.0, 20.0, 35.0]);
        // prev on the level, moves down: crossed
        assert_eq!(
            detect_cross(20.0, 19.0, &t),
            Some(CrossEvent { threshold: 20.0, direction: Direction::Below })
        );
        // lands exactly on the level: not crossed
        assert_eq!(detect_cross(21.0, 20.0, &t), None);
        assert_eq!(detect_cross(19.0, 20.0, &t), None);
        // leaves it upward
        assert_eq!(
            detect_cross(20.0, 21.0, &t),
            Some(CrossEvent { threshold: 20.0, direction: Direction::Above })
        );
    }

    #[test]
    fn movement_between_levels_is_silent() {
        let t = set(&[12.0, 20.0, 35.0]);
        assert_eq!(detect_cross(13.0, 19.5, &t), None);
        assert_eq!(detect_cross(300.0, 40.0, &t), None);
    }

    #[test]
    fn csv_is_sorted_and_deduplicated() {
        let t = ThresholdSet::parse_csv(" 20, 5 ,5,,1").unwrap();
        assert_eq!(t.levels(), &[1.0, 5.0, 20.0]);
    }

    #[test]
    fn invalid_sets_are_rejected() {
        assert!(ThresholdSet::new(vec![]).is_err());
        assert!(ThresholdSet::new(vec![1.0, 1.0]).is_err());
        assert!(ThresholdSet::new(vec![2.0, 1.0]).is_err());
        assert!(ThresholdSet::new(vec![0.0, 1.0]).is_err());
        assert!(ThresholdSet::parse_csv("1,abc").is_err());
        assert!(ThresholdSet::parse_csv("-3,4").is_err());
    }
}
