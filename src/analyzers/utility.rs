/// Returns `part / total` as a percentage, or 0.0 when `total` is not positive.
pub fn pct(part: f64, total: f64) -> f64 {
    if total <= 0.0 {
        0.0
    } else {
        part * 100.0 / total
    }
}

/// Rounds to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(pct(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_pct_normal_values() {
        assert_eq!(pct(50.0, 100.0), 50.0);
        assert_eq!(pct(1.0, 4.0), 25.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.34567, 3), 12.346);
        assert_eq!(round_to(55.04, 1), 55.0);
    }
}
