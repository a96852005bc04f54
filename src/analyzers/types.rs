//! Data types used by the speed tier pipeline.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::stats::Nature;

/// One spread that produced a given speed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadDetail {
    pub spread: String,
    pub nature: Nature,
    pub speed_evs: u32,
    pub usage: f64,
}

/// All spreads of one species that land on the same speed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpeedBucket {
    pub total_usage: f64,
    pub spreads: Vec<SpreadDetail>,
}

/// Speed value → bucket, for a single species.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeedFrequency {
    buckets: BTreeMap<u32, SpeedBucket>,
}

impl SpeedFrequency {
    pub fn record(&mut self, speed: u32, detail: SpreadDetail) {
        let bucket = self.buckets.entry(speed).or_default();
        bucket.total_usage += detail.usage;
        bucket.spreads.push(detail);
    }

    /// Buckets in ascending speed order.
    pub fn buckets(&self) -> impl DoubleEndedIterator<Item = (u32, &SpeedBucket)> {
        self.buckets.iter().map(|(speed, bucket)| (*speed, bucket))
    }

    pub fn get(&self, speed: u32) -> Option<&SpeedBucket> {
        self.buckets.get(&speed)
    }

    /// Sum of every bucket's cumulative usage.
    pub fn total_usage(&self) -> f64 {
        self.buckets.values().map(|b| b.total_usage).sum()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// A speed a species is credited with, chosen from its frequency table.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub speed: u32,
    pub bucket: &'a SpeedBucket,
    /// Share of the species' spread usage in this bucket, 0–100.
    pub percentage: f64,
}

/// One species' appearance in one tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierMembership {
    pub name: String,
    pub usage: f64,
    pub spread: String,
    pub nature: Nature,
    pub speed_evs: u32,
    pub base_speed: u32,
    /// Fraction (0–1) of the species' spread usage that produced this speed.
    pub speed_usage_ratio: f64,
}

/// A membership paired with the speed it belongs to, before merging.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedCredit {
    pub speed: u32,
    pub membership: TierMembership,
}

/// Every species credited with one speed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedTier {
    pub speed: u32,
    pub members: Vec<TierMembership>,
    pub total_usage: f64,
}

/// Why a species contributed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnmatchedSpecies,
    EmptyBuildDistribution,
}

/// Result of analyzing a single species.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesAnalysis {
    pub label: String,
    pub outcome: Result<Vec<SpeedCredit>, SkipReason>,
    pub malformed_spreads: usize,
}

/// Data-quality counters surfaced alongside the tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub unmatched_species: usize,
    pub empty_build_distribution: usize,
    /// Counted per spread, not per species.
    pub malformed_spreads: usize,
    pub empty_input: bool,
}

impl SkipCounts {
    pub fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::UnmatchedSpecies => self.unmatched_species += 1,
            SkipReason::EmptyBuildDistribution => self.empty_build_distribution += 1,
        }
    }

    pub fn skipped_species(&self) -> usize {
        self.unmatched_species + self.empty_build_distribution
    }
}

/// Output of a full pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpeedTierReport {
    pub tiers: Vec<SpeedTier>,
    pub skipped: SkipCounts,
}

impl SpeedTierReport {
    pub fn membership_count(&self) -> usize {
        self.tiers.iter().map(|t| t.members.len()).sum()
    }
}
