use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::analyzers::distribution::aggregate;
use crate::analyzers::selection::select;
use crate::analyzers::tiers::build;
use crate::analyzers::types::{
    SkipCounts, SkipReason, SpeciesAnalysis, SpeedCredit, SpeedTierReport, TierMembership,
};
use crate::config::TierConfig;
use crate::matcher::{CloseMatcher, NameMatcher};
use crate::parser::{ReferenceSpecies, UsageData, UsageRecord};

/// Pseudo-species some snapshots use for format-wide totals.
const AGGREGATE_LABEL: &str = "ALL Pokemon";

/// Computes the speed tiers for one usage snapshot.
///
/// Species labels are resolved against `reference` with a [`CloseMatcher`]
/// built once for the run.
pub fn compute_speed_tiers(
    usage_data: &UsageData,
    format_code: &str,
    reference: &ReferenceSpecies,
    config: &TierConfig,
) -> SpeedTierReport {
    let matcher = CloseMatcher::new(reference.keys());
    if matcher.is_empty() {
        warn!("Reference dex is empty, no species can be matched");
    }
    debug!(candidates = matcher.len(), "Name index built");
    compute_speed_tiers_with(usage_data, format_code, reference, &matcher, config)
}

/// Same as [`compute_speed_tiers`] with a caller-supplied matcher.
///
/// Species are analyzed in parallel; the merge into tiers happens on the
/// calling thread in label order, so output does not depend on scheduling.
#[tracing::instrument(skip_all, fields(format = format_code, species = usage_data.len()))]
pub fn compute_speed_tiers_with<M>(
    usage_data: &UsageData,
    format_code: &str,
    reference: &ReferenceSpecies,
    matcher: &M,
    config: &TierConfig,
) -> SpeedTierReport
where
    M: NameMatcher + Sync,
{
    let mut skipped = SkipCounts::default();
    if usage_data.is_empty() {
        skipped.empty_input = true;
        info!("No species in usage data");
        return SpeedTierReport {
            tiers: Vec::new(),
            skipped,
        };
    }

    let level = config.level_for(format_code);
    debug!(level, "Battle level selected");

    let analyses: Vec<SpeciesAnalysis> = usage_data
        .par_iter()
        .filter(|(label, _)| label.as_str() != AGGREGATE_LABEL)
        .map(|(label, record)| analyze_species(label, record, reference, matcher, level, config))
        .collect();

    let mut credits = Vec::new();
    for analysis in analyses {
        skipped.malformed_spreads += analysis.malformed_spreads;
        match analysis.outcome {
            Ok(species_credits) => credits.extend(species_credits),
            Err(reason) => {
                debug!(species = %analysis.label, ?reason, "Species skipped");
                skipped.record(reason);
            }
        }
    }

    let tiers = build(credits);

    info!(
        tiers = tiers.len(),
        unmatched = skipped.unmatched_species,
        empty = skipped.empty_build_distribution,
        malformed_spreads = skipped.malformed_spreads,
        "Speed tiers computed"
    );

    SpeedTierReport { tiers, skipped }
}

/// Runs matching, aggregation and selection for a single species.
pub fn analyze_species<M>(
    label: &str,
    record: &UsageRecord,
    reference: &ReferenceSpecies,
    matcher: &M,
    level: u32,
    config: &TierConfig,
) -> SpeciesAnalysis
where
    M: NameMatcher + ?Sized,
{
    let skip = |reason: SkipReason, malformed_spreads: usize| SpeciesAnalysis {
        label: label.to_string(),
        outcome: Err(reason),
        malformed_spreads,
    };

    let Some(species) = matcher.best_match(label).and_then(|key| reference.get(key)) else {
        return skip(SkipReason::UnmatchedSpecies, 0);
    };

    if record.spreads.is_empty() {
        return skip(SkipReason::EmptyBuildDistribution, 0);
    }

    let distribution = aggregate(label, record, species, level, config);
    if distribution.frequency.is_empty() {
        return skip(SkipReason::EmptyBuildDistribution, distribution.malformed);
    }

    let total_usage = distribution.frequency.total_usage();
    let credits = select(
        &distribution.frequency,
        total_usage,
        config.multi_modal_threshold,
    )
    .into_iter()
    .filter_map(|selection| {
        let representative = selection.representative()?;
        Some(SpeedCredit {
            speed: selection.speed,
            membership: TierMembership {
                name: label.to_string(),
                usage: record.usage,
                spread: representative.spread.clone(),
                nature: representative.nature,
                speed_evs: representative.speed_evs,
                base_speed: species.base_stats.spe,
                speed_usage_ratio: selection.percentage / 100.0,
            },
        })
    })
    .collect();

    SpeciesAnalysis {
        label: label.to_string(),
        outcome: Ok(credits),
        malformed_spreads: distribution.malformed,
    }
}
