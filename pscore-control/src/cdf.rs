//! Empirical score distribution.
//!
//! Scores are collected during a measurement interval, then finalized into
//! an equal-width histogram over `[min, max]` and its cumulative fractions.
//! `search(p)` maps a cumulative fraction back to a score: the midpoint of
//! the first bin whose cumulative fraction reaches `p`.

/// Default number of histogram bins.
pub const DEFAULT_BINS: usize = 1000;

/// Largest supported number of histogram bins.
pub const MAX_BINS: usize = 1_000_000;

/// Finalized histogram: bin edges and cumulative fractions.
#[derive(Debug, Clone, PartialEq)]
struct Distribution {
    /// `bins + 1` ascending edges; the last bin is closed on the right.
    edges: Vec<f64>,
    /// Cumulative fraction of samples up to and including each bin.
    cumulative: Vec<f64>,
}

/// Score distribution collected over one measurement interval.
#[derive(Debug, Clone)]
pub struct ScoreCdf {
    bins: usize,
    samples: Vec<i32>,
    distribution: Option<Distribution>,
}

impl ScoreCdf {
    /// Create an empty distribution with `bins` histogram bins.
    ///
    /// The bin count is clamped to `[1, MAX_BINS]`.
    pub fn new(bins: usize) -> Self {
        Self {
            bins: bins.clamp(1, MAX_BINS),
            samples: Vec::new(),
            distribution: None,
        }
    }

    /// Record one observed score.
    pub fn add(&mut self, score: i32) {
        self.samples.push(score);
    }

    /// Number of recorded scores.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Whether `finalize` has produced a searchable distribution.
    pub fn is_finalized(&self) -> bool {
        self.distribution.is_some()
    }

    /// Build the histogram from the recorded scores.
    ///
    /// Returns false (and stays unsearchable) when no scores were recorded.
    /// Scores added afterwards are kept but not reflected until the next call.
    pub fn finalize(&mut self) -> bool {
        self.distribution = build_distribution(&self.samples, self.bins);
        self.distribution.is_some()
    }

    /// Score at cumulative fraction `p`, clamped to `[0, 1]`.
    ///
    /// Returns `None` until the distribution has been finalized.
    pub fn search(&self, p: f64) -> Option<f64> {
        let dist = self.distribution.as_ref()?;
        let p = p.min(1.0).max(0.0);

        let last = dist.cumulative.len() - 1;
        let loc = dist
            .cumulative
            .iter()
            .position(|&c| c >= p)
            .unwrap_or(last);

        Some((dist.edges[loc] + dist.edges[loc + 1]) / 2.0)
    }
}

impl Default for ScoreCdf {
    fn default() -> Self {
        Self::new(DEFAULT_BINS)
    }
}

fn build_distribution(samples: &[i32], bins: usize) -> Option<Distribution> {
    let min = *samples.iter().min()? as f64;
    let max = *samples.iter().max()? as f64;

    // A degenerate range is widened to one unit around the single value
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = hi - lo;

    let edges: Vec<f64> = (0..=bins)
        .map(|i| lo + width * i as f64 / bins as f64)
        .collect();

    let mut histogram = vec![0u64; bins];
    for &s in samples {
        histogram[bin_index(&edges, s as f64, lo, width)] += 1;
    }

    let total = samples.len() as f64;
    let mut running = 0u64;
    let cumulative = histogram
        .iter()
        .map(|&count| {
            running += count;
            running as f64 / total
        })
        .collect();

    Some(Distribution { edges, cumulative })
}

/// Bin holding `value`, consistent with the half-open `[edges[i], edges[i + 1])`.
///
/// The arithmetic estimate can land one bin off when `value` sits on an edge,
/// so it is corrected against the edges themselves.
fn bin_index(edges: &[f64], value: f64, lo: f64, width: f64) -> usize {
    let bins = edges.len() - 1;
    let offset = (value - lo) / width * bins as f64;
    let mut idx = (offset.floor().max(0.0) as usize).min(bins - 1);

    while idx > 0 && value < edges[idx] {
        idx -= 1;
    }
    while idx < bins - 1 && value >= edges[idx + 1] {
        idx += 1;
    }
    idx
}
