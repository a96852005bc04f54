use tracing::warn;

use crate::analyzers::types::{SpeedFrequency, SpreadDetail};
use crate::config::TierConfig;
use crate::parser::{CanonicalSpecies, Spread, UsageRecord};
use crate::stats::stat_value;

/// A species' speed frequency table plus how many spreads failed to decode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution {
    pub frequency: SpeedFrequency,
    pub malformed: usize,
}

/// Speed a spread produces for a species at `level`.
pub fn speed_for(base_speed: u32, spread: &Spread, level: u32, config: &TierConfig) -> u32 {
    let multiplier = config.multiplier_for(spread.nature);
    let speed_evs = spread.speed_evs();
    let iv = config.speed_iv(multiplier, speed_evs);
    stat_value(base_speed, iv, speed_evs, level, multiplier)
}

/// Buckets every decodable spread of `record` by the speed it produces.
///
/// Spreads that fail to decode are logged and skipped; the rest of the
/// distribution is still aggregated.
pub fn aggregate(
    label: &str,
    record: &UsageRecord,
    species: &CanonicalSpecies,
    level: u32,
    config: &TierConfig,
) -> Distribution {
    let base_speed = species.base_stats.spe;
    let mut distribution = Distribution::default();

    for (spread_label, &usage) in &record.spreads {
        let spread = match Spread::parse(spread_label) {
            Ok(spread) => spread,
            Err(e) => {
                warn!(species = label, spread = %spread_label, error = %e, "Skipping malformed spread");
                distribution.malformed += 1;
                continue;
            }
        };

        let speed = speed_for(base_speed, &spread, level, config);
        distribution.frequency.record(
            speed,
            SpreadDetail {
                spread: spread_label.clone(),
                nature: spread.nature,
                speed_evs: spread.speed_evs(),
                usage,
            },
        );
    }

    distribution
}
