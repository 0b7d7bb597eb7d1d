//! Bounded Levenshtein-family distance used by the signature comparator.
//!
//! Costs are asymmetric on purpose: insertion and deletion cost 1 but a
//! substitution costs 2, so replacing a character is worth an insert plus a
//! delete. With these costs a swap and a pure substitution are
//! indistinguishable from insert/delete combinations at the same total cost.

/// Longest input the distance accepts; matches the signature fragment cap.
pub const EDIT_DISTN_MAXLEN: usize = 64;

const INSERT_COST: u32 = 1;
const REMOVE_COST: u32 = 1;
const REPLACE_COST: u32 = 2;

/// Edit distance between `a` and `b`.
///
/// Defined only for inputs of at most [`EDIT_DISTN_MAXLEN`] bytes; the
/// comparator rejects longer fragments before ever calling this. Computed
/// over two alternating row buffers rather than a full matrix: row `i` holds
/// the partial distances after consuming `i` bytes of `a`.
pub fn distance(a: &[u8], b: &[u8]) -> u32 {
    debug_assert!(a.len() <= EDIT_DISTN_MAXLEN);
    debug_assert!(b.len() <= EDIT_DISTN_MAXLEN);

    let mut prev = [0u32; EDIT_DISTN_MAXLEN + 1];
    let mut cur = [0u32; EDIT_DISTN_MAXLEN + 1];
    for (j, cell) in prev.iter_mut().enumerate().take(b.len() + 1) {
        *cell = j as u32;
    }

    for (i, &ca) in a.iter().enumerate() {
        cur[0] = i as u32 + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost_insert = prev[j + 1] + INSERT_COST;
            let cost_remove = cur[j] + REMOVE_COST;
            let cost_replace = prev[j] + if ca == cb { 0 } else { REPLACE_COST };
            cur[j + 1] = cost_insert.min(cost_remove).min(cost_replace);
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    prev[b.len()]
}

/// Convenience wrapper treating absent inputs as empty strings.
pub fn distance_opt(a: Option<&str>, b: Option<&str>) -> u32 {
    distance(
        a.unwrap_or_default().as_bytes(),
        b.unwrap_or_default().as_bytes(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = "Hello World!";

    #[test]
    fn identical_strings_are_zero() {
        assert_eq!(distance(b"", b""), 0);
        assert_eq!(distance(HELLO.as_bytes(), HELLO.as_bytes()), 0);
    }

    #[test]
    fn empty_against_anything_is_its_length() {
        assert_eq!(distance(b"", HELLO.as_bytes()), HELLO.len() as u32);
        assert_eq!(distance(HELLO.as_bytes(), b""), HELLO.len() as u32);
    }

    #[test]
    fn absent_inputs_count_as_empty() {
        assert_eq!(distance_opt(None, Some(HELLO)), HELLO.len() as u32);
        assert_eq!(distance_opt(Some(HELLO), None), HELLO.len() as u32);
        assert_eq!(distance_opt(None, None), 0);
    }

    #[test]
    fn single_edits() {
        assert_eq!(distance(b"Hello world", b"Hell world"), 1); // delete
        assert_eq!(distance(b"Hell world", b"Hello world"), 1); // insert
        assert_eq!(distance(b"Hello world", b"HellX world"), 2); // replace
        assert_eq!(distance(b"Hello world", b"Hello owrld"), 2); // swap
    }

    #[test]
    fn replace_costs_two() {
        assert_eq!(distance(b"ab", b"ba"), 2);
        assert_eq!(distance(b"a", b"b"), 2);
    }

    #[test]
    fn symmetric() {
        let pairs: &[(&[u8], &[u8])] = &[
            (b"kitten", b"sitting"),
            (b"abcdef", b"azced"),
            (b"", b"xyz"),
        ];
        for (a, b) in pairs {
            assert_eq!(distance(a, b), distance(b, a));
        }
    }

    #[test]
    fn max_length_inputs() {
        let a = [b'a'; EDIT_DISTN_MAXLEN];
        let b = [b'b'; EDIT_DISTN_MAXLEN];
        assert_eq!(distance(&a, &a), 0);
        // All replacements, each at cost 2.
        assert_eq!(distance(&a, &b), 2 * EDIT_DISTN_MAXLEN as u32);
    }
}
