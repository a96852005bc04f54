//! Stat formula and nature handling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A species' six base stats, keyed the way reference dex files spell them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub spa: u32,
    pub spd: u32,
    pub spe: u32,
}

/// Nature modifier applied to a single stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Multiplier {
    /// 0.9
    Hindering,
    /// 1.0
    Neutral,
    /// 1.1
    Boosting,
}

impl Multiplier {
    /// The modifier in tenths, so the formula stays in integer arithmetic.
    pub fn tenths(self) -> u32 {
        match self {
            Multiplier::Hindering => 9,
            Multiplier::Neutral => 10,
            Multiplier::Boosting => 11,
        }
    }
}

/// Computes a non-HP stat:
/// `floor((floor((2*base + iv + floor(ev/4)) * level / 100) + 5) * multiplier)`.
pub fn stat_value(base: u32, iv: u32, ev: u32, level: u32, multiplier: Multiplier) -> u32 {
    let raw = (2 * base + iv + ev / 4) * level / 100;
    (raw + 5) * multiplier.tenths() / 10
}

/// The 25 natures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Nature {
    Adamant,
    Bashful,
    Bold,
    Brave,
    Calm,
    Careful,
    Docile,
    Gentle,
    Hardy,
    Hasty,
    Impish,
    Jolly,
    Lax,
    Lonely,
    Mild,
    Modest,
    Naive,
    Naughty,
    Quiet,
    Quirky,
    Rash,
    Relaxed,
    Sassy,
    Serious,
    Timid,
}

const NATURES: [(&str, Nature); 25] = [
    ("Adamant", Nature::Adamant),
    ("Bashful", Nature::Bashful),
    ("Bold", Nature::Bold),
    ("Brave", Nature::Brave),
    ("Calm", Nature::Calm),
    ("Careful", Nature::Careful),
    ("Docile", Nature::Docile),
    ("Gentle", Nature::Gentle),
    ("Hardy", Nature::Hardy),
    ("Hasty", Nature::Hasty),
    ("Impish", Nature::Impish),
    ("Jolly", Nature::Jolly),
    ("Lax", Nature::Lax),
    ("Lonely", Nature::Lonely),
    ("Mild", Nature::Mild),
    ("Modest", Nature::Modest),
    ("Naive", Nature::Naive),
    ("Naughty", Nature::Naughty),
    ("Quiet", Nature::Quiet),
    ("Quirky", Nature::Quirky),
    ("Rash", Nature::Rash),
    ("Relaxed", Nature::Relaxed),
    ("Sassy", Nature::Sassy),
    ("Serious", Nature::Serious),
    ("Timid", Nature::Timid),
];

impl Nature {
    pub fn name(self) -> &'static str {
        NATURES
            .iter()
            .find(|(_, n)| *n == self)
            .map(|(name, _)| *name)
            .unwrap_or("Unknown")
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Nature {
    type Err = ();

    /// Matches nature names case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NATURES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, n)| *n)
            .ok_or(())
    }
}
