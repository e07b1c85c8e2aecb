//! Debug and statistics module

/// Outcome of one registry update
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Assets destroyed because they stayed unreferenced for a full tick
    pub assets_reclaimed: usize,
    /// Bundles unloaded because they stayed unreferenced for a full tick
    pub bundles_unloaded: usize,
    /// Released copies returned to a pool
    pub copies_pooled: usize,
    /// Released copies destroyed
    pub copies_destroyed: usize,
}

impl SweepReport {
    /// Check if the sweep reclaimed nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Running totals of the resource lifecycle
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleStats {
    /// Updates run
    pub ticks: u64,
    /// Assets destroyed by sweeps or teardown
    pub assets_reclaimed: u64,
    /// Bundles unloaded by sweeps, explicit unloads or teardown
    pub bundles_unloaded: u64,
    /// Pending reclaims cancelled by a re-acquire
    pub reclaims_cancelled: u64,
    /// Pool allocations served from the free list
    pub pool_hits: u64,
    /// Pool allocations that had to instantiate
    pub pool_misses: u64,
    /// Released copies returned to a pool
    pub copies_pooled: u64,
    /// Released copies destroyed
    pub copies_destroyed: u64,
}

impl LifecycleStats {
    /// Create zeroed stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one update into the totals
    pub fn record_sweep(&mut self, sweep: &SweepReport) {
        self.ticks += 1;
        self.copies_pooled += sweep.copies_pooled as u64;
        self.copies_destroyed += sweep.copies_destroyed as u64;
    }

    /// Fraction of pool allocations served without instantiating
    pub fn pool_hit_rate(&self) -> f32 {
        let total = self.pool_hits + self.pool_misses;
        if total == 0 {
            0.0
        } else {
            self.pool_hits as f32 / total as f32
        }
    }

    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        format!(
            "Ticks: {} | Reclaimed: {} assets, {} bundles | Cancelled: {} | Pool hit: {:.0}%",
            self.ticks,
            self.assets_reclaimed,
            self.bundles_unloaded,
            self.reclaims_cancelled,
            self.pool_hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sweep() {
        let mut stats = LifecycleStats::new();
        stats.record_sweep(&SweepReport {
            copies_pooled: 2,
            copies_destroyed: 1,
            ..Default::default()
        });
        stats.record_sweep(&SweepReport::default());

        assert_eq!(stats.ticks, 2);
        assert_eq!(stats.copies_pooled, 2);
        assert_eq!(stats.copies_destroyed, 1);
    }

    #[test]
    fn test_pool_hit_rate() {
        let mut stats = LifecycleStats::new();
        assert_eq!(stats.pool_hit_rate(), 0.0);

        stats.pool_hits = 3;
        stats.pool_misses = 1;
        assert_eq!(stats.pool_hit_rate(), 0.75);
        assert!(stats.format_stats().contains("Pool hit: 75%"));
    }
}
