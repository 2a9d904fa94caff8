//! Delimiter detection.
//!
//! Every candidate delimiter is used to parse a small sample of records with
//! a quote-aware reader. A candidate qualifies when its most common field
//! count is at least two; qualified candidates are ranked by how many sampled
//! records share that field count, then by their position in the candidate
//! list. A file such as `1,12:30:00` splits consistently on both `,` and `:`,
//! so the candidate order has to decide.

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::trace;

/// How well one candidate delimiter splits the sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CandidateScore {
    delimiter: u8,
    /// Position in the candidate list (lower is preferred)
    rank: usize,
    /// Most common field count
    mode: usize,
    /// Records whose width equals `mode`
    matching: usize,
    /// Records sampled
    sampled: usize,
}

impl CandidateScore {
    /// Compares consistency first (`matching / sampled`), then rank
    fn better_than(&self, other: &CandidateScore) -> bool {
        let lhs = self.matching * other.sampled;
        let rhs = other.matching * self.sampled;
        match lhs.cmp(&rhs) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.rank < other.rank,
        }
    }
}

/// Detects the field delimiter of `data`.
///
/// Returns [`Error::DelimiterUndetermined`] if no candidate yields at least
/// two fields per record.
pub fn sniff_delimiter(data: &[u8], candidates: &[u8], sample: usize) -> Result<u8> {
    let mut best: Option<CandidateScore> = None;

    for (rank, &delimiter) in candidates.iter().enumerate() {
        let Some(score) = score_candidate(data, delimiter, rank, sample) else {
            continue;
        };
        trace!(
            "Delimiter {:?}: mode {} on {}/{} records",
            delimiter as char,
            score.mode,
            score.matching,
            score.sampled
        );

        if score.mode < 2 {
            continue;
        }
        if best.map_or(true, |current| score.better_than(&current)) {
            best = Some(score);
        }
    }

    best.map(|score| score.delimiter)
        .ok_or(Error::DelimiterUndetermined)
}

fn score_candidate(data: &[u8], delimiter: u8, rank: usize, sample: usize) -> Option<CandidateScore> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut widths: HashMap<usize, usize> = HashMap::new();
    let mut sampled = 0;
    for record in reader.byte_records().take(sample) {
        let Ok(record) = record else {
            break;
        };
        *widths.entry(record.len()).or_default() += 1;
        sampled += 1;
    }

    // Ties between widths resolve to the wider one
    let (mode, matching) = widths
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))?;

    Some(CandidateScore {
        delimiter,
        rank,
        mode,
        matching,
        sampled,
    })
}
