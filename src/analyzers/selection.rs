use crate::analyzers::types::{Selection, SpeedFrequency, SpreadDetail};
use crate::analyzers::utility::pct;

/// Picks the speed(s) a species is credited with.
///
/// When more than one bucket holds over `threshold` percent of `total_usage`,
/// all of those are returned (fastest first). Otherwise the single bucket with
/// the greatest cumulative usage is returned; ties go to the higher speed.
pub fn select(frequency: &SpeedFrequency, total_usage: f64, threshold: f64) -> Vec<Selection<'_>> {
    let scored: Vec<Selection<'_>> = frequency
        .buckets()
        .rev()
        .map(|(speed, bucket)| Selection {
            speed,
            bucket,
            percentage: pct(bucket.total_usage, total_usage),
        })
        .collect();

    let multi: Vec<Selection<'_>> = scored
        .iter()
        .filter(|s| s.percentage > threshold)
        .copied()
        .collect();

    if multi.len() > 1 {
        return multi;
    }

    // `scored` is fastest first, so the first maximum is the higher speed.
    let mut dominant: Option<Selection<'_>> = None;
    for s in scored {
        if dominant.is_none_or(|d| s.bucket.total_usage > d.bucket.total_usage) {
            dominant = Some(s);
        }
    }

    dominant.into_iter().collect()
}

impl<'a> Selection<'a> {
    /// The bucket's most used spread; ties go to the smallest spread label.
    pub fn representative(&self) -> Option<&'a SpreadDetail> {
        self.bucket.spreads.iter().max_by(|a, b| {
            a.usage
                .total_cmp(&b.usage)
                .then_with(|| b.spread.cmp(&a.spread))
        })
    }
}
