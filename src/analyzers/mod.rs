//! Speed tier computation.
//!
//! Each species' spread distribution is bucketed by resulting speed
//! ([`distribution`]), reduced to the speed(s) it is credited with
//! ([`selection`]), and every credit is merged into a globally sorted tier
//! list ([`tiers`]). [`analyzer`] wires the stages together.

pub mod analyzer;
pub mod distribution;
pub mod selection;
pub mod tiers;
pub mod types;
pub mod utility;
