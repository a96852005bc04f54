//! Tunable constants for speed tier computation.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::stats::{Multiplier, Nature};

/// Thresholds, nature tables and level conventions used by the pipeline.
///
/// Every field has a default, so a JSON override file only needs the keys it
/// changes:
/// ```json
/// { "multi_modal_threshold": 25.0, "doubles_format_tokens": ["vgc", "bss", "doubles"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Percentage a speed bucket must exceed to count toward a multi-modal credit.
    pub multi_modal_threshold: f64,
    pub speed_boosting_natures: Vec<Nature>,
    pub speed_hindering_natures: Vec<Nature>,
    /// Lowercase substrings of a format code that mark a level 50 ruleset.
    pub doubles_format_tokens: Vec<String>,
    pub doubles_level: u32,
    pub singles_level: u32,
    pub max_iv: u32,
    pub min_iv: u32,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            multi_modal_threshold: 20.0,
            speed_boosting_natures: vec![Nature::Timid, Nature::Hasty, Nature::Jolly, Nature::Naive],
            speed_hindering_natures: vec![
                Nature::Brave,
                Nature::Relaxed,
                Nature::Quiet,
                Nature::Sassy,
            ],
            doubles_format_tokens: vec!["vgc".to_string(), "bss".to_string()],
            doubles_level: 50,
            singles_level: 100,
            max_iv: 31,
            min_iv: 0,
        }
    }
}

impl TierConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading config '{path}'"))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing config '{path}'"))?;
        Ok(config)
    }

    /// Battle level for a format code.
    pub fn level_for(&self, format_code: &str) -> u32 {
        let code = format_code.to_lowercase();
        if self
            .doubles_format_tokens
            .iter()
            .any(|token| code.contains(token.as_str()))
        {
            self.doubles_level
        } else {
            self.singles_level
        }
    }

    pub fn multiplier_for(&self, nature: Nature) -> Multiplier {
        if self.speed_boosting_natures.contains(&nature) {
            Multiplier::Boosting
        } else if self.speed_hindering_natures.contains(&nature) {
            Multiplier::Hindering
        } else {
            Multiplier::Neutral
        }
    }

    /// Speed IV assumed for a build: minimized only when the nature already
    /// lowers speed and no EVs went into it.
    pub fn speed_iv(&self, multiplier: Multiplier, speed_evs: u32) -> u32 {
        if multiplier == Multiplier::Hindering && speed_evs == 0 {
            self.min_iv
        } else {
            self.max_iv
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_level_for_doubles_tokens() {
        let config = TierConfig::default();
        assert_eq!(config.level_for("gen9vgc2025regi"), 50);
        assert_eq!(config.level_for("gen9BSSRegG"), 50);
        assert_eq!(config.level_for("gen9ou"), 100);
        assert_eq!(config.level_for("gen9doublesou"), 100);
    }

    #[test]
    fn test_multiplier_for_natures() {
        let config = TierConfig::default();
        assert_eq!(config.multiplier_for(Nature::Jolly), Multiplier::Boosting);
        assert_eq!(config.multiplier_for(Nature::Quiet), Multiplier::Hindering);
        assert_eq!(config.multiplier_for(Nature::Adamant), Multiplier::Neutral);
        assert_eq!(config.multiplier_for(Nature::Serious), Multiplier::Neutral);
    }

    #[test]
    fn test_speed_iv_rule() {
        let config = TierConfig::default();
        assert_eq!(config.speed_iv(Multiplier::Hindering, 0), 0);
        assert_eq!(config.speed_iv(Multiplier::Hindering, 4), 31);
        assert_eq!(config.speed_iv(Multiplier::Neutral, 0), 31);
        assert_eq!(config.speed_iv(Multiplier::Boosting, 252), 31);
    }

    #[test]
    fn test_load_partial_override() {
        let path = format!("{}/speed_tiers_test_config.json", env::temp_dir().display());
        fs::write(
            &path,
            r#"{ "multi_modal_threshold": 25.0, "doubles_format_tokens": ["doubles"] }"#,
        )
        .unwrap();

        let config = TierConfig::load(&path).unwrap();
        assert_eq!(config.multi_modal_threshold, 25.0);
        assert_eq!(config.level_for("gen9doublesou"), 50);
        assert_eq!(config.singles_level, 100);
        assert_eq!(config.speed_boosting_natures.len(), 4);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file_errors() {
        assert!(TierConfig::load("/nonexistent/speed_tiers.json").is_err());
    }
}
