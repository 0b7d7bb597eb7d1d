//! Piecewise hash signature values and their textual form.
//!
//! The wire format is `blocksize:part1:part2[,comment]`, ASCII. Each part is
//! drawn from a 64-symbol alphabet and is at most [`SPAMSUM_LENGTH`]
//! characters long; the blocksize is `MIN_BLOCKSIZE * 2^k` for the file that
//! produced it, which is why two signatures are comparable only when their
//! blocksizes are equal, double, or half of each other.

use crate::error::FuzzyError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest part a real signature can carry.
pub const SPAMSUM_LENGTH: usize = 64;

/// Smallest blocksize signatures are produced with.
pub const MIN_BLOCKSIZE: u64 = 3;

static SIGNATURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):([^:]+):([^,]+)(,.*)?$").expect("signature grammar"));

/// A parsed piecewise hash.
///
/// Equality and comparison ignore the comment; serialization reproduces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// Chunking granularity the signature was produced with.
    pub block_size: u64,
    /// Hash string at `block_size`.
    pub part1: String,
    /// Hash string at `2 * block_size`.
    pub part2: String,
    /// Trailing free text after the first comma, comma stripped.
    pub comment: Option<String>,
}

impl FromStr for Signature {
    type Err = FuzzyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = SIGNATURE_RE
            .captures(s)
            .ok_or_else(|| FuzzyError::MalformedSignature(s.to_string()))?;
        // Blocksizes that overflow u64 cannot come from a real signature
        // (blocksize is bounded by the producing file's size) and are
        // rejected the same way as non-numeric text.
        let block_size = caps[1]
            .parse::<u64>()
            .map_err(|_| FuzzyError::MalformedSignature(s.to_string()))?;
        Ok(Signature {
            block_size,
            part1: caps[2].to_string(),
            part2: caps[3].to_string(),
            comment: caps.get(4).map(|m| m.as_str()[1..].to_string()),
        })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.block_size, self.part1, self.part2)?;
        if let Some(comment) = &self.comment {
            write!(f, ",{comment}")?;
        }
        Ok(())
    }
}

/// Collapse any run of four or more identical characters down to three.
///
/// Long runs carry very little information, so they would bias both the
/// common-substring filter and the edit distance unfairly. Strings shorter
/// than three characters pass through unchanged.
pub fn eliminate_sequences(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < 3 {
        return s.to_string();
    }
    let mut out: String = chars[..3].iter().collect();
    for i in 3..chars.len() {
        let c = chars[i];
        if c != chars[i - 1] || c != chars[i - 2] || c != chars[i - 3] {
            out.push(c);
        }
    }
    out
}
