//! Search engine configuration and skill levels

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ChessError;
use crate::eval::Heuristics;

/// Playing strength from 1 (weakest) to 5 (strongest)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SkillLevel(u8);

impl SkillLevel {
    pub const MIN: SkillLevel = SkillLevel(1);
    pub const MAX: SkillLevel = SkillLevel(5);

    pub fn new(level: u8) -> Result<Self, ChessError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&level) {
            Ok(Self(level))
        } else {
            Err(ChessError::InvalidSkill(level))
        }
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Plies searched below the root
    pub fn depth(self) -> usize {
        match self.0 {
            0..=3 => 1,
            4 => 2,
            _ => 3,
        }
    }

    /// Chance that a leaf is scored as neutral instead of evaluated
    pub fn neutral_substitution_chance(self) -> f64 {
        (1.0 - f64::from(self.0) / 2.5).max(0.0)
    }

    /// Chance of playing the worst root move outright
    pub fn blunder_chance(self) -> f64 {
        (1.0 - f64::from(self.0) / 1.5).max(0.0)
    }

    /// Weight spread for root selection; large values favour the best move
    pub fn spread(self) -> f64 {
        f64::from(self.0).powi(10)
    }

    /// Multiplier applied to the draw willingness roll
    pub fn draw_scale(self) -> f64 {
        f64::from(self.0).powi(2)
    }
}

impl TryFrom<u8> for SkillLevel {
    type Error = ChessError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        SkillLevel::new(level)
    }
}

impl From<SkillLevel> for u8 {
    fn from(skill: SkillLevel) -> u8 {
        skill.0
    }
}

impl Default for SkillLevel {
    fn default() -> Self {
        SkillLevel::MAX
    }
}

/// Skill-independent search settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Children kept at a pruned node
    pub branching_factor: usize,
    /// Nodes with more legal moves than this get pruned
    pub prune_threshold: usize,
    /// Value substituted for a leaf when the engine plays weakly
    pub neutral_value: f64,
    /// Largest score drop after the chosen move that still allows a draw offer
    pub draw_drop_threshold: f64,
    /// Random seed for reproducibility (None = entropy)
    pub seed: Option<u64>,
    /// Evaluation weights
    pub heuristics: Heuristics,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            branching_factor: 5,
            prune_threshold: 7,
            neutral_value: 50.0,
            draw_drop_threshold: 5.0,
            seed: None,
            heuristics: Heuristics::default(),
        }
    }
}

impl SearchConfig {
    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set custom heuristics
    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Load a config from JSON. Missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_bounds() {
        assert!(SkillLevel::new(0).is_err());
        assert!(SkillLevel::new(6).is_err());
        assert_eq!(SkillLevel::new(3).unwrap().level(), 3);
    }

    #[test]
    fn test_skill_tiers() {
        let depths: Vec<usize> = (1..=5).map(|l| SkillLevel::new(l).unwrap().depth()).collect();
        assert_eq!(depths, vec![1, 1, 1, 2, 3]);

        let weakest = SkillLevel::MIN;
        assert!((weakest.neutral_substitution_chance() - 0.6).abs() < 1e-12);
        assert!((weakest.blunder_chance() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(SkillLevel::new(2).unwrap().blunder_chance(), 0.0);
        assert_eq!(SkillLevel::new(3).unwrap().neutral_substitution_chance(), 0.0);
        assert_eq!(SkillLevel::MAX.spread(), 9_765_625.0);
        assert_eq!(SkillLevel::MAX.draw_scale(), 25.0);
    }

    #[test]
    fn test_skill_serde() {
        let skill: SkillLevel = serde_json::from_str("4").unwrap();
        assert_eq!(skill.level(), 4);
        assert!(serde_json::from_str::<SkillLevel>("9").is_err());
        assert_eq!(serde_json::to_string(&skill).unwrap(), "4");
    }

    #[test]
    fn test_config_save_load() {
        let path = std::env::temp_dir().join(format!("chessmind-config-{}.json", std::process::id()));
        let config = SearchConfig::default().with_seed(7);
        config.save(&path).unwrap();
        let loaded = SearchConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config() {
        let config: SearchConfig = serde_json::from_str(r#"{"branching_factor": 3}"#).unwrap();
        assert_eq!(config.branching_factor, 3);
        assert_eq!(config.prune_threshold, 7);
        assert_eq!(config.seed, None);
    }
}
