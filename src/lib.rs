//! fuzzyseek: context-triggered piecewise fuzzy hash comparison and search.
//!
//! Two files can be judged similar without exact matching by comparing their
//! piecewise hash signatures (`blocksize:part1:part2`). This crate implements
//! the comparison side of that family of algorithms, faithful to the
//! reference 32-bit semantics, plus a search layer that applies signatures
//! across a file tree while pruning candidates by the file-size interval
//! each blocksize implies.
//!
//! Signature *production* is delegated: the search driver obtains candidate
//! signatures through the [`search::SignatureSource`] capability (for
//! example [`search::SsdeepCommandSource`]) and candidate files through a
//! [`search::FileWalker`].
//!
//! ```
//! use fuzzyseek::compare;
//!
//! let sig = "3:hAemDTVvYlBVgBWmDD3TWIGWn:hltplGWn";
//! assert_eq!(compare(Some(sig), Some(sig)), 100);
//! assert_eq!(compare(None, Some(sig)), -1);
//! ```

/// Signature comparison and scoring.
pub mod compare;
/// Bounded edit distance primitive.
pub mod edit_distance;
/// Error types.
pub mod error;
/// Tracing setup.
pub mod logging;
/// Rolling checksum primitive.
pub mod rolling;
/// Search driver and its capability traits.
pub mod search;
/// Signature values, parsing, and sequence reduction.
pub mod signature;
/// Blocksize-derived file-size pruning.
pub mod size_range;

pub use compare::{compare, compare_parsed, score_strings};
pub use error::{FuzzyError, Result};
pub use search::{
    Deadline, FileEntry, FileWalker, Match, SearchDriver, SearchReport, SignatureSource,
    SsdeepCommandSource, WalkDirWalker,
};
pub use signature::{eliminate_sequences, Signature, MIN_BLOCKSIZE, SPAMSUM_LENGTH};
pub use size_range::{SizeApproximation, SizeRangeIndex};
