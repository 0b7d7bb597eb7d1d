//! Search driver: applies reference signatures across a file collection.
//!
//! The driver consumes candidates from a [`FileWalker`], prunes them with the
//! blocksize-derived size intervals, obtains each survivor's signature from a
//! [`SignatureSource`], and scores it against one or many references. Any
//! type exposing the two trait operations is usable; no shared base type is
//! needed. Scoring fans out across a rayon worker pool: the primitives hold
//! no shared mutable state, so candidates are independent and only the
//! result collection needs merging.

use crate::compare;
use crate::error::{FuzzyError, Result};
use crate::signature::Signature;
use crate::size_range::{SizeApproximation, SizeRangeIndex};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A candidate produced by a [`FileWalker`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
}

/// A scored hit against one reference signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub path: PathBuf,
    /// Similarity in `(0, 100]`; zero-score candidates are never reported.
    pub score: i32,
}

/// Produces a piecewise hash signature for a candidate file.
///
/// Implementations are called from multiple worker threads at once and must
/// be `Sync`. The core never inspects file contents itself; this is the only
/// way it learns a candidate's signature.
pub trait SignatureSource: Sync {
    fn signature_for(&self, path: &Path) -> Result<String>;
}

/// Produces the `(path, size)` candidates for one search.
pub trait FileWalker {
    fn files(&self) -> Result<Vec<FileEntry>>;
}

/// Wall-clock budget for one search run.
///
/// Checked between candidates. Cancellation is advisory: when the deadline
/// expires the driver stops dispatching and the results collected so far are
/// returned rather than discarded.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    pub fn expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }
}

/// Outcome of one search run.
///
/// Per-candidate failures never abort a search; they are collected here
/// alongside the matches. `timed_out` marks a run cut short by the deadline,
/// in which case `matches` holds the partial results gathered before expiry.
#[derive(Debug, Default)]
pub struct SearchReport {
    pub matches: Vec<Match>,
    pub errors: Vec<(PathBuf, FuzzyError)>,
    pub timed_out: bool,
}

enum Outcome {
    Scored(Vec<Match>),
    Failed(PathBuf, FuzzyError),
    Filtered,
    Skipped,
}

enum SizeFilter {
    Single(SizeApproximation),
    Index(SizeRangeIndex),
}

impl SizeFilter {
    fn admits(&self, size: u64) -> bool {
        match self {
            SizeFilter::Single(range) => range.contains(size),
            SizeFilter::Index(index) => index.contains(size),
        }
    }
}

/// Orchestrates size filtering, signature production, and scoring.
pub struct SearchDriver<S> {
    source: S,
    deadline: Option<Deadline>,
}

impl<S: SignatureSource> SearchDriver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            deadline: None,
        }
    }

    /// Bound the run by wall-clock time; see [`Deadline`].
    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Search for files matching a single reference signature.
    ///
    /// Candidates outside the size interval implied by the reference's
    /// blocksize are skipped without being hashed.
    pub fn search_one(&self, files: &[FileEntry], reference: &Signature) -> SearchReport {
        let range = SizeApproximation::for_block_size(reference.block_size);
        self.run(
            files,
            std::slice::from_ref(reference),
            Some(SizeFilter::Single(range)),
        )
    }

    /// Like [`search_one`](Self::search_one) but hashes every candidate.
    ///
    /// For truncated or partially overlapping content the size heuristic
    /// does not hold, so no candidate can be pruned by size.
    pub fn search_one_partial(&self, files: &[FileEntry], reference: &Signature) -> SearchReport {
        self.run(files, std::slice::from_ref(reference), None)
    }

    /// Search for files matching any of several reference signatures.
    ///
    /// A merged size cover over all reference blocksizes prunes candidates;
    /// each surviving file is hashed once and scored against every
    /// reference, so one file may produce several matches.
    pub fn search_many(&self, files: &[FileEntry], references: &[Signature]) -> SearchReport {
        let index = SizeRangeIndex::build(references.iter().map(|r| r.block_size));
        debug!(ranges = index.ranges().len(), "built size cover");
        self.run(files, references, Some(SizeFilter::Index(index)))
    }

    /// Like [`search_many`](Self::search_many) but hashes every candidate.
    pub fn search_many_partial(&self, files: &[FileEntry], references: &[Signature]) -> SearchReport {
        self.run(files, references, None)
    }

    fn run(
        &self,
        files: &[FileEntry],
        references: &[Signature],
        filter: Option<SizeFilter>,
    ) -> SearchReport {
        let span = tracing::info_span!(
            "search",
            candidates = files.len(),
            references = references.len(),
            size_filtered = filter.is_some()
        );
        let _guard = span.enter();

        let cancelled = AtomicBool::new(false);
        let outcomes: Vec<Outcome> = files
            .par_iter()
            .map(|entry| {
                if cancelled.load(Ordering::Relaxed) {
                    return Outcome::Skipped;
                }
                if self.deadline.is_some_and(|d| d.expired()) {
                    cancelled.store(true, Ordering::Relaxed);
                    return Outcome::Skipped;
                }
                if filter.as_ref().is_some_and(|f| !f.admits(entry.size)) {
                    return Outcome::Filtered;
                }
                self.score_candidate(entry, references)
            })
            .collect();

        let mut report = SearchReport {
            timed_out: cancelled.into_inner(),
            ..SearchReport::default()
        };
        let mut filtered = 0usize;
        for outcome in outcomes {
            match outcome {
                Outcome::Scored(hits) => report.matches.extend(hits),
                Outcome::Failed(path, err) => {
                    warn!(path = %path.display(), error = %err, "candidate skipped");
                    report.errors.push((path, err));
                }
                Outcome::Filtered => filtered += 1,
                Outcome::Skipped => {}
            }
        }
        info!(
            matches = report.matches.len(),
            errors = report.errors.len(),
            filtered,
            timed_out = report.timed_out,
            "search complete"
        );
        report
    }

    fn score_candidate(&self, entry: &FileEntry, references: &[Signature]) -> Outcome {
        let raw = match self.source.signature_for(&entry.path) {
            Ok(raw) => raw,
            Err(err) => return Outcome::Failed(entry.path.clone(), err),
        };
        let candidate: Signature = match raw.parse() {
            Ok(sig) => sig,
            Err(err) => return Outcome::Failed(entry.path.clone(), err),
        };
        let hits = references
            .iter()
            .filter_map(|reference| {
                let score = compare::compare_parsed(&candidate, reference);
                (score > 0).then(|| Match {
                    path: entry.path.clone(),
                    score,
                })
            })
            .collect();
        Outcome::Scored(hits)
    }
}

/// Walks a directory subtree with `walkdir`, yielding regular files only.
///
/// Unreadable entries are logged and skipped; only a missing root is fatal.
pub struct WalkDirWalker {
    root: PathBuf,
    follow_symlinks: bool,
    max_depth: Option<usize>,
}

impl WalkDirWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_symlinks: false,
            max_depth: None,
        }
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

impl FileWalker for WalkDirWalker {
    fn files(&self) -> Result<Vec<FileEntry>> {
        if !self.root.is_dir() {
            return Err(FuzzyError::DirectoryNotFound(self.root.clone()));
        }

        let mut walker = WalkDir::new(&self.root).follow_links(self.follow_symlinks);
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut entries = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "unreadable entry skipped");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            match entry.metadata() {
                Ok(meta) => entries.push(FileEntry {
                    path: entry.into_path(),
                    size: meta.len(),
                }),
                Err(err) => {
                    warn!(path = %entry.path().display(), error = %err, "stat failed, entry skipped");
                }
            }
        }
        Ok(entries)
    }
}

/// Obtains signatures by invoking the `ssdeep` command-line tool.
///
/// The tool prints a header line followed by one `signature,"filename"` line
/// per input; the signature is the text before the first comma on the second
/// line. Stderr is discarded.
pub struct SsdeepCommandSource {
    program: PathBuf,
}

impl SsdeepCommandSource {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ssdeep"),
        }
    }

    /// Use an explicit binary path instead of resolving `ssdeep` from `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SsdeepCommandSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureSource for SsdeepCommandSource {
    fn signature_for(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.program)
            .arg(path)
            .stderr(Stdio::null())
            .output()?;
        if !output.status.success() {
            return Err(FuzzyError::SignatureTool {
                path: path.to_path_buf(),
                message: format!("exit status {}", output.status),
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .nth(1)
            .and_then(|line| line.split(',').next())
            .filter(|sig| !sig.is_empty())
            .map(str::to_string)
            .ok_or_else(|| FuzzyError::EmptySignatureOutput {
                path: path.to_path_buf(),
            })
    }
}

/// One line of a reference hashlist: a signature plus the quoted filename it
/// was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashlistEntry {
    pub signature: Signature,
    pub filename: String,
}

/// Reads a reference hashlist in the comma-separated `signature,"filename"`
/// format.
///
/// A line qualifies only when it splits into exactly two comma fields and
/// the first field has exactly three colon-separated fields; anything else
/// is skipped rather than treated as fatal, so batch loading continues past
/// malformed entries.
pub fn read_hashlist<R: BufRead>(reader: R) -> Result<Vec<HashlistEntry>> {
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 2 {
            continue;
        }
        if fields[0].split(':').count() != 3 {
            continue;
        }
        let signature: Signature = match fields[0].parse() {
            Ok(sig) => sig,
            Err(_) => {
                debug!(line = %line, "skipping unparseable hashlist line");
                continue;
            }
        };
        let filename = fields[1].trim().trim_matches('"').to_string();
        entries.push(HashlistEntry {
            signature,
            filename,
        });
    }
    Ok(entries)
}

/// [`read_hashlist`] over a file on disk.
pub fn read_hashlist_file(path: &Path) -> Result<Vec<HashlistEntry>> {
    let file = std::fs::File::open(path)?;
    read_hashlist(std::io::BufReader::new(file))
}
