use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Counts the work done by grid matching and stride sweeps.
///
/// Cloning shares the counters, so one instance can be handed to many tasks.
#[derive(Debug, Clone)]
pub struct SearchMetrics {
    // Grid matching
    deltas_generated: Arc<AtomicU64>,
    walks_attempted: Arc<AtomicU64>,
    grid_matches: Arc<AtomicU64>,
    literal_matches: Arc<AtomicU64>,

    // Stride sweeps
    restrictions_scanned: Arc<AtomicU64>,
    sweep_hits: Arc<AtomicU64>,
}

impl SearchMetrics {
    pub fn new() -> Self {
        Self {
            deltas_generated: Arc::new(AtomicU64::new(0)),
            walks_attempted: Arc::new(AtomicU64::new(0)),
            grid_matches: Arc::new(AtomicU64::new(0)),
            literal_matches: Arc::new(AtomicU64::new(0)),
            restrictions_scanned: Arc::new(AtomicU64::new(0)),
            sweep_hits: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records the candidate deltas produced by pair selection
    pub fn record_deltas(&self, count: u64) {
        let total = self.deltas_generated.fetch_add(count, Ordering::Relaxed) + count;
        debug!("Candidate deltas: {}, total: {}", count, total);
    }

    /// Records walks started for one delta and how many completed
    pub fn record_walks(&self, attempted: u64, matched: u64) {
        self.walks_attempted.fetch_add(attempted, Ordering::Relaxed);
        self.grid_matches.fetch_add(matched, Ordering::Relaxed);
    }

    pub fn record_literal_matches(&self, count: u64) {
        self.literal_matches.fetch_add(count, Ordering::Relaxed);
    }

    /// Records one stride/offset restriction and whether it hit
    pub fn record_restriction(&self, hit: bool) {
        self.restrictions_scanned.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.sweep_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get_stats(&self) -> SearchStats {
        SearchStats {
            deltas_generated: self.deltas_generated.load(Ordering::Relaxed),
            walks_attempted: self.walks_attempted.load(Ordering::Relaxed),
            grid_matches: self.grid_matches.load(Ordering::Relaxed),
            literal_matches: self.literal_matches.load(Ordering::Relaxed),
            restrictions_scanned: self.restrictions_scanned.load(Ordering::Relaxed),
            sweep_hits: self.sweep_hits.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Search stats:\n\
             Candidate deltas: {}\n\
             Walks attempted/matched: {}/{}\n\
             Literal matches: {}\n\
             Restrictions scanned/hit: {}/{}",
            stats.deltas_generated,
            stats.walks_attempted,
            stats.grid_matches,
            stats.literal_matches,
            stats.restrictions_scanned,
            stats.sweep_hits
        );
    }
}

impl Default for SearchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of [`SearchMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    pub deltas_generated: u64,
    pub walks_attempted: u64,
    pub grid_matches: u64,
    pub literal_matches: u64,
    pub restrictions_scanned: u64,
    pub sweep_hits: u64,
}
