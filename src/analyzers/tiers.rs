use std::collections::BTreeMap;

use crate::analyzers::types::{SpeedCredit, SpeedTier};

/// Merges every species' speed credits into tiers, fastest first.
///
/// Within a tier members are ordered by usage weight descending, then by
/// species label.
pub fn build<I>(credits: I) -> Vec<SpeedTier>
where
    I: IntoIterator<Item = SpeedCredit>,
{
    let mut by_speed: BTreeMap<u32, Vec<_>> = BTreeMap::new();
    for credit in credits {
        by_speed
            .entry(credit.speed)
            .or_default()
            .push(credit.membership);
    }

    by_speed
        .into_iter()
        .rev()
        .map(|(speed, mut members)| {
            members.sort_by(|a, b| {
                b.usage
                    .total_cmp(&a.usage)
                    .then_with(|| a.name.cmp(&b.name))
            });
            let total_usage = members.iter().map(|m| m.usage).sum();
            SpeedTier {
                speed,
                members,
                total_usage,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::TierMembership;
    use crate::stats::Nature;

    fn credit(speed: u32, name: &str, usage: f64) -> SpeedCredit {
        SpeedCredit {
            speed,
            membership: TierMembership {
                name: name.to_string(),
                usage,
                spread: "Jolly:0/252/0/0/4/252".to_string(),
                nature: Nature::Jolly,
                speed_evs: 252,
                base_speed: 100,
                speed_usage_ratio: 1.0,
            },
        }
    }

    #[test]
    fn test_build_sorts_tiers_descending() {
        let tiers = build(vec![
            credit(150, "A", 0.1),
            credit(300, "B", 0.2),
            credit(200, "C", 0.3),
        ]);

        let speeds: Vec<u32> = tiers.iter().map(|t| t.speed).collect();
        assert_eq!(speeds, vec![300, 200, 150]);
    }

    #[test]
    fn test_build_merges_equal_speeds() {
        let tiers = build(vec![
            credit(200, "A", 0.25),
            credit(200, "B", 0.5),
            credit(180, "C", 0.125),
            credit(200, "D", 0.25),
        ]);

        assert_eq!(tiers.len(), 2);
        let top = &tiers[0];
        assert_eq!(top.speed, 200);
        let names: Vec<&str> = top.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "D"]);
        assert_eq!(top.total_usage, 1.0);
        assert_eq!(tiers[1].total_usage, 0.125);
    }

    #[test]
    fn test_build_empty() {
        assert!(build(Vec::new()).is_empty());
    }
}
