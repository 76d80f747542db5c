//! Name similarity
//!
//! String similarity is the Ratcliff/Obershelp ratio: find the longest common
//! block, recurse on both sides of it, and score `2 * matched / total_len`.
//! Name similarity blends first/last token similarity with the whole-string
//! ratio and a small middle-name adjustment.

use crate::error::RecordError;
use crate::matching::name_normalizer::{extract_name_parts, normalize_name};
use std::collections::HashMap;

/// Weight of first-name similarity
const WEIGHT_FIRST: f64 = 0.4;
/// Weight of last-name similarity
const WEIGHT_LAST: f64 = 0.4;
/// Weight of whole-name similarity
const WEIGHT_FULL: f64 = 0.2;

/// Scale applied to the best middle-token similarity when both names have middles
const MIDDLE_MATCH_SCALE: f64 = 0.1;
/// Bonus when only the candidate lists middle names (rosters often omit them)
const MIDDLE_ONLY_CANDIDATE_BONUS: f64 = 0.1;
/// Penalty when only the roster lists middle names
const MIDDLE_ONLY_ROSTER_PENALTY: f64 = -0.05;

/// Similarity ratio of two strings (0.0-1.0)
///
/// Two empty strings are identical (1.0).
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_characters(&a, &b);
    2.0 * matched as f64 / total as f64
}

/// Total size of the matching blocks between `a` and `b`
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut b_index: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, ch) in b.iter().enumerate() {
        b_index.entry(*ch).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, &b_index, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`
///
/// Ties resolve to the block starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b_index: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // run_len[j] = length of the match ending at a[i - 1], b[j]
    let mut run_len: HashMap<usize, usize> = HashMap::new();

    for (i, ch) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_run_len = HashMap::new();
        if let Some(positions) = b_index.get(ch) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run_len.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_run_len.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        run_len = next_run_len;
    }

    (best_i, best_j, best_size)
}

/// Similarity of a roster name and a candidate display name
///
/// `first * 0.4 + last * 0.4 + full * 0.2 + middle_bonus`, capped at 1.0.
/// There is no floor: a middle-name penalty can push a very poor match
/// slightly below zero.
///
/// # Errors
/// Returns `RecordError::EmptyName` if either name has no usable tokens.
pub fn calculate_name_similarity(
    payroll_name: &str,
    candidate_name: &str,
) -> Result<f64, RecordError> {
    let roster = extract_name_parts(payroll_name)?;
    let candidate = extract_name_parts(candidate_name)?;

    let full = similarity(&normalize_name(payroll_name), &normalize_name(candidate_name));
    let first = similarity(&roster.first, &candidate.first);
    let last = similarity(&roster.last, &candidate.last);

    let middle_bonus = match (roster.middle.is_empty(), candidate.middle.is_empty()) {
        (false, false) => {
            let best = roster
                .middle
                .iter()
                .flat_map(|rm| candidate.middle.iter().map(move |cm| similarity(rm, cm)))
                .fold(0.0_f64, f64::max);
            best * MIDDLE_MATCH_SCALE
        }
        (true, false) => MIDDLE_ONLY_CANDIDATE_BONUS,
        (false, true) => MIDDLE_ONLY_ROSTER_PENALTY,
        (true, true) => 0.0,
    };

    let combined = first * WEIGHT_FIRST + last * WEIGHT_LAST + full * WEIGHT_FULL + middle_bonus;
    Ok(combined.min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_similarity_identical_and_disjoint() {
        assert_eq!(similarity("smith", "smith"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
    }

    #[test]
    fn test_similarity_known_ratios() {
        // "abcd" vs "bcde": block "bcd" → 2*3/8
        assert!(approx(similarity("abcd", "bcde"), 0.75));
        // "jon" vs "john": blocks "jo" + "n" → 2*3/7
        assert!(approx(similarity("jon", "john"), 6.0 / 7.0));
        // "smith" vs "smyth": "sm" + "th" → 2*4/10
        assert!(approx(similarity("smith", "smyth"), 0.8));
    }

    #[test]
    fn test_similarity_is_symmetric_for_names() {
        let pairs = [("katherine", "catherine"), ("jon", "john"), ("mcdonald", "macdonald")];
        for (a, b) in pairs {
            assert!(approx(similarity(a, b), similarity(b, a)), "{} / {}", a, b);
        }
    }

    #[test]
    fn test_identical_names_score_exactly_one() {
        assert_eq!(calculate_name_similarity("John Smith", "John Smith").unwrap(), 1.0);
    }

    #[test]
    fn test_candidate_middle_name_is_capped_bonus() {
        // Full match terms sum past 1.0 with the +0.1 bonus; result is capped
        let sim = calculate_name_similarity("John Smith", "John Q Smith").unwrap();
        assert_eq!(sim, 1.0);
    }

    #[test]
    fn test_roster_middle_name_penalty() {
        let sim = calculate_name_similarity("John Q Smith", "John Smith").unwrap();
        // first = last = 1.0; full("john q smith", "john smith") = 20/22
        let expected = 0.4 + 0.4 + 0.2 * (20.0 / 22.0) - 0.05;
        assert!(approx(sim, expected), "got {}", sim);
    }

    #[test]
    fn test_both_middle_names_use_best_pair() {
        let sim = calculate_name_similarity("Ann Marie Lee", "Ann Marie Lee").unwrap();
        assert_eq!(sim, 1.0);

        let mismatch = calculate_name_similarity("Ann Beth Lee", "Ann Zed Lee").unwrap();
        // middle "beth" vs "zed": 'e' only → 2/7 * 0.1
        let full = similarity("ann beth lee", "ann zed lee");
        let expected = 0.8 + 0.2 * full + (2.0 / 7.0) * 0.1;
        assert!(approx(mismatch, expected), "got {}", mismatch);
    }

    #[test]
    fn test_single_token_names_compare_empty_last() {
        // Empty last names compare as identical
        let sim = calculate_name_similarity("Cher", "Cher").unwrap();
        assert_eq!(sim, 1.0);
    }

    #[test]
    fn test_poor_match_can_go_negative() {
        let sim = calculate_name_similarity("Xy Qq Zz", "Ab Cd").unwrap();
        assert!(sim < 0.0, "penalty without floor should go negative, got {}", sim);
    }

    #[test]
    fn test_empty_name_is_error() {
        assert!(calculate_name_similarity("", "John Smith").is_err());
        assert!(calculate_name_similarity("John Smith", "Dr.").is_err());
    }
}
