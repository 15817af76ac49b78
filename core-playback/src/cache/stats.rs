//! Cache statistics

use serde::{Deserialize, Serialize};

/// Snapshot of cache disk usage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cached files under the cache root
    pub cached_files: usize,

    /// Total bytes used by cached files
    pub total_bytes: u64,

    /// Files whose metadata could not be read (skipped, not fatal)
    pub unreadable_files: usize,
}

impl CacheStats {
    /// Cache usage as a percentage of a given budget.
    pub fn usage_percentage(&self, budget_bytes: u64) -> f64 {
        if budget_bytes == 0 {
            return 0.0;
        }
        (self.total_bytes as f64 / budget_bytes as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_percentage_handles_zero_budget() {
        let stats = CacheStats {
            cached_files: 3,
            total_bytes: 100,
            unreadable_files: 0,
        };
        assert_eq!(stats.usage_percentage(0), 0.0);
        assert_eq!(stats.usage_percentage(200), 50.0);
    }
}
