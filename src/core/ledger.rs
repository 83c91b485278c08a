//! Time-stamped allocation ledger
//!
//! Records each logical write so stale entries can be reclaimed in bulk.
//! Reclamation is gated on queue length to keep the per-tick scan from
//! running when there is nothing worth freeing.

use std::time::{Duration, Instant};

/// Entry count above which reclamation actually runs
pub const RECLAIM_PRESSURE_LEN: usize = 50;

/// Entries older than this are reclaimed
pub const MAX_ENTRY_AGE: Duration = Duration::from_secs(30);

/// One recorded logical allocation
#[derive(Debug, Clone, Copy)]
pub struct LedgerEntry {
    pub size: usize,
    pub created_at: Instant,
}

/// Append-only allocation log with batch reclamation
#[derive(Debug, Default)]
pub struct AllocationLedger {
    entries: Vec<LedgerEntry>,
}

impl AllocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry unconditionally
    pub fn record(&mut self, size: usize, created_at: Instant) {
        self.entries.push(LedgerEntry { size, created_at });
    }

    /// Remove every entry older than [`MAX_ENTRY_AGE`] and return the total
    /// bytes freed. A no-op returning 0 unless the ledger holds more than
    /// [`RECLAIM_PRESSURE_LEN`] entries. Survivor order is preserved.
    pub fn reclaim(&mut self, now: Instant) -> usize {
        if self.entries.len() <= RECLAIM_PRESSURE_LEN {
            return 0;
        }

        let mut freed = 0;
        self.entries.retain(|entry| {
            if now.duration_since(entry.created_at) > MAX_ENTRY_AGE {
                freed += entry.size;
                false
            } else {
                true
            }
        });
        freed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all recorded entry sizes
    pub fn total_bytes(&self) -> usize {
        self.entries.iter().map(|e| e.size).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reclaim_noop_under_pressure_threshold() {
        let mut ledger = AllocationLedger::new();
        let t0 = Instant::now();
        for _ in 0..RECLAIM_PRESSURE_LEN {
            ledger.record(10, t0);
        }
        // All entries are stale, but the queue is not long enough
        assert_eq!(ledger.reclaim(t0 + Duration::from_secs(120)), 0);
        assert_eq!(ledger.len(), RECLAIM_PRESSURE_LEN);
    }

    #[test]
    fn test_reclaim_removes_only_stale_entries() {
        let mut ledger = AllocationLedger::new();
        let t0 = Instant::now();
        for _ in 0..40 {
            ledger.record(100, t0);
        }
        for _ in 0..20 {
            ledger.record(7, t0 + Duration::from_secs(20));
        }
        // At t0+35s the first batch is 35s old, the second 15s
        let freed = ledger.reclaim(t0 + Duration::from_secs(35));
        assert_eq!(freed, 40 * 100);
        assert_eq!(ledger.len(), 20);
        assert_eq!(ledger.total_bytes(), 20 * 7);
    }

    #[test]
    fn test_reclaim_preserves_survivor_order() {
        let mut ledger = AllocationLedger::new();
        let t0 = Instant::now();
        for i in 0..60 {
            // Interleave stale and fresh entries
            let at = if i % 2 == 0 { t0 } else { t0 + Duration::from_secs(20) };
            ledger.record(i, at);
        }
        ledger.reclaim(t0 + Duration::from_secs(35));
        let sizes: Vec<usize> = ledger.entries.iter().map(|e| e.size).collect();
        let expected: Vec<usize> = (0..60).filter(|i| i % 2 == 1).collect();
        assert_eq!(sizes, expected);
    }

    #[test]
    fn test_no_survivor_is_stale_after_reclaim() {
        let mut ledger = AllocationLedger::new();
        let t0 = Instant::now();
        for i in 0..80 {
            ledger.record(1, t0 + Duration::from_secs(i % 50));
        }
        let now = t0 + Duration::from_secs(60);
        ledger.reclaim(now);
        for entry in &ledger.entries {
            assert!(now.duration_since(entry.created_at) <= MAX_ENTRY_AGE);
        }
    }

    #[test]
    fn test_clear() {
        let mut ledger = AllocationLedger::new();
        ledger.record(10, Instant::now());
        ledger.clear();
        assert!(ledger.is_empty());
    }
}
