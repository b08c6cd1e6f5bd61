//! Shared per-tier flow counters.
//!
//! Three u32 counters named after the symbols external monitoring reads:
//! `white_flows`, `grey_flows`, `black_flows`. They start at zero, are only
//! ever incremented (wrapping at u32::MAX), and are never reset by the
//! handlers. The host creates one `TierCounters` per pipeline program and
//! shares it between every execution context.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::verdict::Tier;

/// Atomic tier counters.
#[derive(Debug, Default)]
pub struct TierCounters {
    white_flows: AtomicU32,
    grey_flows: AtomicU32,
    black_flows: AtomicU32,
}

impl TierCounters {
    /// Create counters initialized to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically add one to the counter for `tier`.
    #[inline]
    pub fn increment(&self, tier: Tier) {
        self.counter(tier).fetch_add(1, Ordering::Relaxed);
    }

    /// Current value of one counter.
    pub fn get(&self, tier: Tier) -> u32 {
        self.counter(tier).load(Ordering::Relaxed)
    }

    /// Read all three counters.
    ///
    /// Each load is individually atomic; the triple is not a consistent cut
    /// while handlers are still running.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            white_flows: self.white_flows.load(Ordering::Relaxed),
            grey_flows: self.grey_flows.load(Ordering::Relaxed),
            black_flows: self.black_flows.load(Ordering::Relaxed),
        }
    }

    fn counter(&self, tier: Tier) -> &AtomicU32 {
        match tier {
            Tier::White => &self.white_flows,
            Tier::Grey => &self.grey_flows,
            Tier::Black => &self.black_flows,
        }
    }
}

/// Point-in-time copy of the tier counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub white_flows: u32,
    pub grey_flows: u32,
    pub black_flows: u32,
}

impl CounterSnapshot {
    pub fn new(white_flows: u32, grey_flows: u32, black_flows: u32) -> Self {
        Self {
            white_flows,
            grey_flows,
            black_flows,
        }
    }

    /// Value of one tier's counter.
    pub fn get(&self, tier: Tier) -> u32 {
        match tier {
            Tier::White => self.white_flows,
            Tier::Grey => self.grey_flows,
            Tier::Black => self.black_flows,
        }
    }

    /// Sum of all three counters, widened so it cannot wrap.
    pub fn total(&self) -> u64 {
        self.white_flows as u64 + self.grey_flows as u64 + self.black_flows as u64
    }

    /// Per-tier increments since `earlier`, tolerating counter wrap-around.
    pub fn delta_since(&self, earlier: &CounterSnapshot) -> CounterSnapshot {
        CounterSnapshot {
            white_flows: self.white_flows.wrapping_sub(earlier.white_flows),
            grey_flows: self.grey_flows.wrapping_sub(earlier.grey_flows),
            black_flows: self.black_flows.wrapping_sub(earlier.black_flows),
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).expect("CounterSnapshot serialization cannot fail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    // ===========================================
    // TierCounters
    // ===========================================

    #[test]
    fn test_counters_start_at_zero() {
        let counters = TierCounters::new();
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
    }

    #[test]
    fn test_increment_touches_only_one_counter() {
        let counters = TierCounters::new();
        counters.increment(Tier::Grey);

        assert_eq!(counters.get(Tier::White), 0);
        assert_eq!(counters.get(Tier::Grey), 1);
        assert_eq!(counters.get(Tier::Black), 0);
    }

    #[test]
    fn test_increment_wraps_at_u32_max() {
        let counters = TierCounters::new();
        counters.black_flows.store(u32::MAX, Ordering::Relaxed);

        counters.increment(Tier::Black);

        assert_eq!(counters.get(Tier::Black), 0);
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let counters = Arc::new(TierCounters::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let counters = Arc::clone(&counters);
                thread::spawn(move || {
                    let tier = match i % 3 {
                        0 => Tier::White,
                        1 => Tier::Grey,
                        _ => Tier::Black,
                    };
                    for _ in 0..10_000 {
                        counters.increment(tier);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("join");
        }

        let snapshot = counters.snapshot();
        // Threads 0,3,6 -> white; 1,4,7 -> grey; 2,5 -> black
        assert_eq!(snapshot.white_flows, 30_000);
        assert_eq!(snapshot.grey_flows, 30_000);
        assert_eq!(snapshot.black_flows, 20_000);
        assert_eq!(snapshot.total(), 80_000);
    }

    // ===========================================
    // CounterSnapshot
    // ===========================================

    #[test]
    fn test_snapshot_get() {
        let snapshot = CounterSnapshot::new(1, 2, 3);
        assert_eq!(snapshot.get(Tier::White), 1);
        assert_eq!(snapshot.get(Tier::Grey), 2);
        assert_eq!(snapshot.get(Tier::Black), 3);
    }

    #[test]
    fn test_snapshot_total_does_not_wrap() {
        let snapshot = CounterSnapshot::new(u32::MAX, u32::MAX, 1);
        assert_eq!(snapshot.total(), 2 * u32::MAX as u64 + 1);
    }

    #[test]
    fn test_delta_since() {
        let earlier = CounterSnapshot::new(10, 20, 30);
        let later = CounterSnapshot::new(15, 20, 31);
        assert_eq!(later.delta_since(&earlier), CounterSnapshot::new(5, 0, 1));
    }

    #[test]
    fn test_delta_since_across_wrap() {
        let earlier = CounterSnapshot::new(u32::MAX - 1, 0, 0);
        let later = CounterSnapshot::new(3, 0, 0);
        assert_eq!(later.delta_since(&earlier).white_flows, 5);
    }

    #[test]
    fn test_snapshot_json_uses_exported_names() {
        let json = CounterSnapshot::new(4, 5, 6).to_json_pretty();
        assert!(json.contains("\"white_flows\": 4"));
        assert!(json.contains("\"grey_flows\": 5"));
        assert!(json.contains("\"black_flows\": 6"));
    }
}
