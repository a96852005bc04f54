//! Parsers for usage snapshots, reference dex data and spread labels.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::stats::{Nature, StatLine};

/// Species usage label → usage record, ordered by label.
pub type UsageData = BTreeMap<String, UsageRecord>;

/// Canonical species key → reference record.
pub type ReferenceSpecies = BTreeMap<String, CanonicalSpecies>;

/// Plain string → string lookup (translations, format display names).
pub type NameTable = BTreeMap<String, String>;

/// Usage statistics for one species label in a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Fraction of observed team slots in `[0, 1]`.
    #[serde(default)]
    pub usage: f64,
    /// Spread label → weighted occurrence count.
    #[serde(default, rename = "Spreads")]
    pub spreads: BTreeMap<String, f64>,
}

/// Header block of a usage snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotInfo {
    pub metagame: Option<String>,
    pub cutoff: Option<f64>,
    #[serde(rename = "number of battles")]
    pub battles: Option<u64>,
}

/// A decoded usage snapshot file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageSnapshot {
    #[serde(default)]
    pub info: SnapshotInfo,
    #[serde(default)]
    pub data: UsageData,
}

/// Reference record for one species.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CanonicalSpecies {
    #[serde(default)]
    pub num: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "baseStats")]
    pub base_stats: StatLine,
}

/// Failure to decode a spread label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpreadError {
    #[error("spread '{0}' has no nature separator")]
    MissingSeparator(String),

    #[error("unknown nature '{nature}' in spread '{label}'")]
    UnknownNature { label: String, nature: String },

    #[error("spread '{label}' has {found} EV values, expected 6")]
    WrongEvCount { label: String, found: usize },

    #[error("invalid EV value '{value}' in spread '{label}'")]
    InvalidEv { label: String, value: String },
}

/// One build: a nature plus six EVs in hp/atk/def/spa/spd/spe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spread {
    pub nature: Nature,
    pub evs: [u32; 6],
}

impl Spread {
    /// Decodes a `Nature:hp/atk/def/spa/spd/spe` label.
    ///
    /// # Errors
    ///
    /// Returns a [`SpreadError`] if the nature is unknown or the EV list is
    /// not exactly six non-negative integers.
    pub fn parse(label: &str) -> Result<Self, SpreadError> {
        let (nature, evs) = label
            .split_once(':')
            .ok_or_else(|| SpreadError::MissingSeparator(label.to_string()))?;

        let nature = nature
            .parse::<Nature>()
            .map_err(|_| SpreadError::UnknownNature {
                label: label.to_string(),
                nature: nature.to_string(),
            })?;

        let values: Vec<&str> = evs.split('/').collect();
        if values.len() != 6 {
            return Err(SpreadError::WrongEvCount {
                label: label.to_string(),
                found: values.len(),
            });
        }

        let mut parsed = [0u32; 6];
        for (slot, value) in parsed.iter_mut().zip(values) {
            *slot = value.trim().parse().map_err(|_| SpreadError::InvalidEv {
                label: label.to_string(),
                value: value.to_string(),
            })?;
        }

        Ok(Self {
            nature,
            evs: parsed,
        })
    }

    pub fn speed_evs(&self) -> u32 {
        self.evs[5]
    }
}

/// Decodes a JSON usage snapshot (`{"info": {...}, "data": {...}}`).
///
/// # Errors
///
/// Returns an error if the bytes are not valid JSON of that shape.
pub fn parse_usage_snapshot(bytes: &[u8]) -> Result<UsageSnapshot> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decodes a JSON dex file keyed by species id.
pub fn parse_pokedex(bytes: &[u8]) -> Result<ReferenceSpecies> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decodes a flat JSON object of strings.
pub fn parse_name_table(bytes: &[u8]) -> Result<NameTable> {
    Ok(serde_json::from_slice(bytes)?)
}
