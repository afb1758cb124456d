//! Rule constants that batch runs may want to vary

use crate::{Result, SkirmishError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable battle rules
///
/// Every field has a default matching the standard game, so a rules file
/// only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Turns per battle
    pub max_turns: u32,
    /// Radius around a control point in which models count for scoring
    pub scoring_radius: f64,
    /// Furthest an enemy may be and still be charged
    pub charge_radius: f64,
    /// Distance at which two units count as touching
    pub engagement_radius: f64,
    /// Chance that a wounded regenerating unit regenerates instead of moving
    pub regenerate_chance: f64,
    /// Radius within which enemies make a control point "contested"
    pub presence_radius: f64,
    pub board_width: f64,
    pub board_height: f64,
    /// Size of the deployment and objective grid squares
    pub square_size: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            max_turns: 4,
            scoring_radius: 3.0,
            charge_radius: 12.0,
            engagement_radius: 1.0,
            regenerate_chance: 0.1,
            presence_radius: 6.0,
            board_width: 60.0,
            board_height: 40.0,
            square_size: 10.0,
        }
    }
}

impl RulesConfig {
    /// Load a rules file (JSON)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let rules: RulesConfig = serde_json::from_str(content)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Reject rules the board and dice cannot work with
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("board_width", self.board_width),
            ("board_height", self.board_height),
            ("square_size", self.square_size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SkirmishError::InvalidRules(format!("{name} must be positive, got {value}")));
            }
        }
        let radii = [
            ("scoring_radius", self.scoring_radius),
            ("charge_radius", self.charge_radius),
            ("engagement_radius", self.engagement_radius),
            ("presence_radius", self.presence_radius),
        ];
        for (name, value) in radii {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SkirmishError::InvalidRules(format!("{name} must not be negative, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.regenerate_chance) {
            return Err(SkirmishError::InvalidRules(format!(
                "regenerate_chance must be within 0..=1, got {}",
                self.regenerate_chance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let rules = RulesConfig::default();
        assert_eq!(rules.max_turns, 4);
        assert_eq!(rules.charge_radius, 12.0);
        assert_eq!(rules.scoring_radius, 3.0);
    }

    #[test]
    fn test_partial_rules_file() {
        let rules = RulesConfig::parse(r#"{ "max_turns": 6, "regenerate_chance": 0.5 }"#).unwrap();
        assert_eq!(rules.max_turns, 6);
        assert_eq!(rules.regenerate_chance, 0.5);
        assert_eq!(rules.board_width, 60.0);
    }

    #[test]
    fn test_bad_rules_file() {
        assert!(RulesConfig::parse("{ max_turns: }").is_err());
    }

    #[test]
    fn test_degenerate_geometry_rejected() {
        for content in [
            r#"{ "square_size": 0 }"#,
            r#"{ "square_size": -5.0 }"#,
            r#"{ "board_width": 0 }"#,
            r#"{ "charge_radius": -1.0 }"#,
            r#"{ "regenerate_chance": 1.5 }"#,
        ] {
            assert!(
                matches!(RulesConfig::parse(content), Err(SkirmishError::InvalidRules(_))),
                "{content} should be rejected"
            );
        }
        assert!(RulesConfig::default().validate().is_ok());
    }
}
