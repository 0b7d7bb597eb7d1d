//! Signature comparison and scoring.
//!
//! Scores two piecewise hashes on a 0-100 scale where 100 is an excellent
//! match. The pipeline is: parse, collapse character runs, gate on a shared
//! 7-byte substring via the rolling hash, then scale a bounded edit distance
//! into a score honoring the blocksize relationship. All scoring arithmetic
//! uses truncating integer division; downstream thresholds depend on this
//! exact curve, so none of the odd-looking steps may be simplified.

use crate::edit_distance;
use crate::rolling::{RollingHash, ROLLING_WINDOW};
use crate::signature::{eliminate_sequences, Signature, MIN_BLOCKSIZE, SPAMSUM_LENGTH};
use tracing::trace;

/// Returned when either input is absent.
pub const SCORE_NULL_INPUT: i32 = -1;
/// Returned when the first signature fails to parse.
pub const SCORE_MALFORMED_FIRST: i32 = -2;
/// Returned when the second signature fails to parse.
pub const SCORE_MALFORMED_SECOND: i32 = -3;

/// Compare two signature strings.
///
/// Returns a similarity score in `[0, 100]`, or one of the negative codes for
/// absent or malformed input. Valid signatures with unrelated blocksizes
/// score `0`: they simply cannot be compared, which is not an error. The
/// distinct per-side parse codes let batch callers know which entry to skip.
pub fn compare(sig1: Option<&str>, sig2: Option<&str>) -> i32 {
    let (Some(raw1), Some(raw2)) = (sig1, sig2) else {
        return SCORE_NULL_INPUT;
    };
    let Ok(first) = raw1.parse::<Signature>() else {
        return SCORE_MALFORMED_FIRST;
    };
    let Ok(second) = raw2.parse::<Signature>() else {
        return SCORE_MALFORMED_SECOND;
    };
    compare_parsed(&first, &second)
}

/// Compare two already-parsed signatures.
pub fn compare_parsed(first: &Signature, second: &Signature) -> i32 {
    let b1 = first.block_size;
    let b2 = second.block_size;

    // Unrelated blocksizes are apples to oranges: both signatures can be
    // perfectly valid and still incomparable.
    if b1 != b2 && Some(b1) != b2.checked_mul(2) && Some(b2) != b1.checked_mul(2) {
        trace!(b1, b2, "unrelated blocksizes");
        return 0;
    }

    let s1_1 = eliminate_sequences(&first.part1);
    let s1_2 = eliminate_sequences(&first.part2);
    let s2_1 = eliminate_sequences(&second.part1);
    let s2_2 = eliminate_sequences(&second.part2);

    if b1 == b2 && s1_1 == s2_1 && s1_2 == s2_2 {
        return 100;
    }

    // Each signature carries strings for two blocksizes; pick the pairing the
    // blocksize relationship allows. At least one exists, per the check above.
    if b1 == b2 {
        let score1 = score_strings(&s1_1, &s2_1, b1);
        let score2 = score_strings(&s1_2, &s2_2, b1.saturating_mul(2));
        score1.max(score2)
    } else if Some(b1) == b2.checked_mul(2) {
        score_strings(&s1_1, &s2_2, b1)
    } else {
        score_strings(&s1_2, &s2_1, b2)
    }
}

/// Score two signature fragments produced at the same blocksize.
///
/// Returns `0` for fragments longer than [`SPAMSUM_LENGTH`] (not real
/// signature content), for fragments with no shared 7-byte substring, and
/// for matches so poor the scaled distance reaches 100 before inversion.
/// That last rule intentionally folds "barely worse than worst" into
/// "incomparable"; the reference algorithm behaves the same way.
pub fn score_strings(s1: &str, s2: &str, block_size: u64) -> i32 {
    let len1 = s1.len() as u64;
    let len2 = s2.len() as u64;

    if s1.len() > SPAMSUM_LENGTH || s2.len() > SPAMSUM_LENGTH {
        return 0;
    }

    // Cheap reject: candidates must share a substring of the rolling window
    // length before we pay for the edit distance.
    if !has_common_substring(s1.as_bytes(), s2.as_bytes()) {
        trace!(len1, len2, "no common substring");
        return 0;
    }

    let distance = edit_distance::distance(s1.as_bytes(), s2.as_bytes()) as u64;

    // Scale by the combined length so the score measures the proportion of
    // content changed rather than an absolute quantity. This lands on a
    // rough 0-64 scale with 0 a perfect match.
    let mut score = distance * SPAMSUM_LENGTH as u64 / (len1 + len2);

    // Rescale to 0-100.
    score = 100 * score / 64;

    // A scaled distance at or past 100 is too poor a match to report.
    if score >= 100 {
        return 0;
    }

    // Invert so that higher means more similar.
    score = 100 - score;

    // Small blocksizes must not let short fragments report outsized
    // confidence. The cap only ever clamps a score of at most 100, so
    // saturation is exact for blocksizes where the product would overflow.
    let cap = (block_size / MIN_BLOCKSIZE).saturating_mul(len1.min(len2));
    if score > cap {
        score = cap;
    }

    score as i32
}

/// Rolling-hash gate for a shared substring of length [`ROLLING_WINDOW`].
///
/// The hash value at every offset of `s1` goes into a table; `s2` is then
/// scanned with a fresh state and any value hit past the warm-up is confirmed
/// with a direct 7-byte comparison to rule out checksum collisions.
fn has_common_substring(s1: &[u8], s2: &[u8]) -> bool {
    debug_assert!(s1.len() <= SPAMSUM_LENGTH);
    debug_assert!(s2.len() <= SPAMSUM_LENGTH);

    let mut hashes = [0u32; SPAMSUM_LENGTH];
    let mut state = RollingHash::new();
    for (i, &b) in s1.iter().enumerate() {
        state.push(b);
        hashes[i] = state.value();
    }
    let num_hashes = s1.len();

    state.reset();
    for (i, &b) in s2.iter().enumerate() {
        state.push(b);
        let h = state.value();
        if i < ROLLING_WINDOW - 1 {
            continue;
        }
        for j in (ROLLING_WINDOW - 1)..num_hashes {
            // A stored value of zero never gates a match.
            if hashes[j] != 0 && hashes[j] == h {
                // Potential hit; confirm against the raw bytes.
                let candidate = &s2[i + 1 - ROLLING_WINDOW..=i];
                let stored = &s1[j + 1 - ROLLING_WINDOW..=j];
                if candidate == stored {
                    return true;
                }
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const REF: &str = "24576:9dR6xbt+XUgTu2YL/ZtT8052UJNZyCWbGNLsw5opPm0Off225NP02Rf:9Ox56dFYr/j8CWaJopu0On22fs2Rf";

    #[test]
    fn identical_signature_scores_100() {
        assert_eq!(compare(Some(REF), Some(REF)), 100);
        assert_eq!(compare(Some("3:abc:def"), Some("3:abc:def")), 100);
    }

    #[test]
    fn comment_does_not_affect_score() {
        let with_comment = format!("{REF},\"some file\"");
        assert_eq!(compare(Some(&with_comment), Some(REF)), 100);
    }

    #[test]
    fn absent_input_is_minus_one() {
        assert_eq!(compare(None, Some(REF)), SCORE_NULL_INPUT);
        assert_eq!(compare(Some(REF), None), SCORE_NULL_INPUT);
        assert_eq!(compare(None, None), SCORE_NULL_INPUT);
    }

    #[test]
    fn malformed_sides_get_distinct_codes() {
        assert_eq!(compare(Some("not-a-sig"), Some("3:abc:def")), SCORE_MALFORMED_FIRST);
        assert_eq!(compare(Some("3:abc:def"), Some("")), SCORE_MALFORMED_SECOND);
        assert_eq!(compare(Some("not-a-sig"), Some("also-bad")), SCORE_MALFORMED_FIRST);
    }

    #[test]
    fn unrelated_blocksizes_score_zero() {
        assert_eq!(compare(Some("3:abcdefgh:ijklmnop"), Some("7:abcdefgh:ijklmnop")), 0);
        assert_eq!(compare(Some("3:abc:def"), Some("12:abc:def")), 0);
    }

    #[test]
    fn pinned_near_duplicate_score() {
        // Both parts mutated slightly; pinned against the reference scoring.
        let mutated = "24576:9dR6xbt+XUgTu2YL/ZtT8052UJNZyCWbGNLsw5opXm0Qff225NP02Rf:9Ox56dFYr/j8CWaJopu0Xn22fs2Rf";
        assert_eq!(compare(Some(REF), Some(mutated)), 97);
    }

    #[test]
    fn pinned_equal_blocksize_scores() {
        let a = "3:hAemDTVvYlBVgBWmDD3TWIGWn:hltplGWn";
        let b = "3:hAemDTVvYlBVgBWmDD3TWIGWn:hltplGWx";
        let c = "3:hAemDTVvYlBVgBWmDq3TWIGWn:hltplGWnXX";
        assert_eq!(compare(Some(a), Some(b)), 25);
        assert_eq!(compare(Some(a), Some(c)), 25);
    }

    #[test]
    fn double_blocksize_pairs_cross_parts() {
        // b1 == 2*b2: part1 of the first against part2 of the second.
        let a = "6:abcdefghijklmnop:qrstuvwxyz012345";
        let b = "3:zzzzzz:abcdefghijklmnop";
        assert_eq!(compare(Some(a), Some(b)), 32);

        // b2 == 2*b1: part2 of the first against part1 of the second.
        let c = "12:qrstuvwxyz012345:whatever";
        assert_eq!(compare(Some(a), Some(c)), 64);
    }

    #[test]
    fn score_strings_pinned_values() {
        assert_eq!(score_strings("abcdefghijklm", "abcdefghiXYZjklm", 3), 13);
        // Identical strings still pass through the full pipeline when the
        // comparator's short-circuit does not apply; the blocksize cap bites.
        assert_eq!(score_strings("abcdefgh", "abcdefgh", 3), 8);
        assert_eq!(score_strings("abcdefgh", "abcdefgh", 96), 100);
    }

    #[test]
    fn huge_blocksize_cap_saturates() {
        // 13835058055282163712 is 3 * 2^62: grammar-valid, fits u64, and the
        // naive cap product would overflow. The cap must saturate instead,
        // matching the reference's arbitrary-precision arithmetic.
        let a = "13835058055282163712:abcdefgh:ijklmnop";
        let b = "13835058055282163712:abcdefgX:ijklmnop";
        assert_eq!(compare(Some(a), Some(b)), 100);
        assert_eq!(
            score_strings("abcdefgh", "abcdefgX", 13_835_058_055_282_163_712),
            88
        );
    }

    #[test]
    fn score_strings_rejects_oversized_fragments() {
        let long = "a".repeat(SPAMSUM_LENGTH + 1);
        assert_eq!(score_strings(&long, "abcdefgh", 3), 0);
        assert_eq!(score_strings("abcdefgh", &long, 3), 0);
    }

    #[test]
    fn no_common_substring_scores_zero() {
        assert_eq!(score_strings("abcdefg", "gfedcba", 3), 0);
        assert_eq!(score_strings("short", "shor", 3), 0);
    }

    #[test]
    fn common_substring_gate() {
        assert!(has_common_substring(b"abcdefghijk", b"XXabcdefgYY"));
        assert!(!has_common_substring(b"abcdefghijk", b"XXabcdefYY"));
        assert!(!has_common_substring(b"", b"abcdefghijk"));
        assert!(!has_common_substring(b"abcdefghijk", b""));
        assert!(!has_common_substring(b"abcdef", b"abcdef"));
    }

    #[test]
    fn run_collapse_applies_before_identity_check() {
        // The parts differ only in run length past three, so after sequence
        // elimination they are identical.
        assert_eq!(compare(Some("3:aaaabc:defggggg"), Some("3:aaabc:defggg")), 100);
    }
}
