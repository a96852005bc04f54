//! Ratcliff/Obershelp string similarity.

/// Similarity of two strings in `[0, 1]`: twice the number of characters in
/// matching blocks divided by the total length. Two empty strings score 1.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Upper bound on [`ratio`] for strings of the given character lengths.
pub fn length_bound(a_len: usize, b_len: usize) -> f64 {
    let total = a_len + b_len;
    if total == 0 {
        return 1.0;
    }
    2.0 * a_len.min(b_len) as f64 / total as f64
}

/// Sums the lengths of matching blocks found by recursively splitting around
/// the longest common substring.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, k) = longest_match(a, b);
    if k == 0 {
        return 0;
    }
    k + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + k..], &b[j + k..])
}

/// Longest common substring as `(start in a, start in b, length)`. Among equal
/// lengths the block starting earliest in `a`, then earliest in `b`, wins.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                let k = prev[j] + 1;
                cur[j + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            } else {
                cur[j + 1] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_identical() {
        assert_eq!(ratio("garchomp", "garchomp"), 1.0);
    }

    #[test]
    fn test_ratio_empty() {
        assert_eq!(ratio("", ""), 1.0);
        assert_eq!(ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_ratio_overlapping_blocks() {
        assert_eq!(ratio("abcd", "bcde"), 0.75);
    }

    #[test]
    fn test_ratio_splits_around_longest_block() {
        // "app" + "e" = 4 matching chars over 10
        assert_eq!(ratio("appel", "apple"), 0.8);
        // "pe" only
        assert_eq!(ratio("appel", "peach"), 0.4);
    }

    #[test]
    fn test_ratio_label_with_space() {
        // all 11 letters of "fluttermane" match around the space
        let r = ratio("flutter mane", "fluttermane");
        assert!((r - 22.0 / 23.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_bound_never_below_ratio() {
        for (a, b) in [("abcd", "bcde"), ("appel", "peach"), ("ab", "abcdef"), ("", "")] {
            let bound = length_bound(a.chars().count(), b.chars().count());
            assert!(bound >= ratio(a, b));
        }
        assert_eq!(length_bound(2, 6), 0.5);
    }

    #[test]
    fn test_longest_match_prefers_earliest_in_a() {
        let a: Vec<char> = "abxab".chars().collect();
        let b: Vec<char> = "ab".chars().collect();
        assert_eq!(longest_match(&a, &b), (0, 0, 2));
    }
}
