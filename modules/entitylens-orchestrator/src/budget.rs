use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

/// Tracks spend against a run's USD budget. Amounts are tracked in
/// micro-dollars (1e-6 USD) so concurrent connector tasks can record spend
/// with a plain atomic rather than a lock.
pub struct BudgetTracker {
    limit_micros: u64,
    spent_micros: AtomicU64,
}

const MICROS_PER_USD: f64 = 1_000_000.0;

impl BudgetTracker {
    /// `limit_usd` of `None` means unlimited.
    pub fn new(limit_usd: Option<f64>) -> Self {
        let limit_micros = limit_usd.map(to_micros).unwrap_or(0);
        Self {
            limit_micros,
            spent_micros: AtomicU64::new(0),
        }
    }

    pub fn is_active(&self) -> bool {
        self.limit_micros > 0
    }

    pub fn has_budget(&self, cost_usd: f64) -> bool {
        if !self.is_active() {
            return true;
        }
        self.spent_micros.load(Ordering::Relaxed) + to_micros(cost_usd) <= self.limit_micros
    }

    /// Record spend. Returns false if this pushed total spend over the
    /// limit (spend is still recorded either way).
    pub fn spend(&self, cost_usd: f64) -> bool {
        let cost_micros = to_micros(cost_usd);
        let prev = self.spent_micros.fetch_add(cost_micros, Ordering::Relaxed);
        if self.is_active() && prev + cost_micros > self.limit_micros {
            warn!(
                spent_usd = (prev + cost_micros) as f64 / MICROS_PER_USD,
                limit_usd = self.limit_micros as f64 / MICROS_PER_USD,
                "run budget exceeded"
            );
            return false;
        }
        true
    }

    pub fn total_spent_usd(&self) -> f64 {
        self.spent_micros.load(Ordering::Relaxed) as f64 / MICROS_PER_USD
    }

    /// Post-phase check (spec.md §4.4): has total spend reached or passed
    /// the run's budget? Always false for an unlimited budget.
    pub fn is_exhausted(&self) -> bool {
        self.is_active() && self.spent_micros.load(Ordering::Relaxed) >= self.limit_micros
    }
}

fn to_micros(usd: f64) -> u64 {
    (usd.max(0.0) * MICROS_PER_USD).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_budget_always_has_room() {
        let tracker = BudgetTracker::new(None);
        assert!(tracker.has_budget(1_000_000.0));
        assert!(tracker.spend(1_000_000.0));
        assert!(!tracker.is_active());
    }

    #[test]
    fn tracks_spend_within_limit() {
        let tracker = BudgetTracker::new(Some(10.0));
        assert!(tracker.has_budget(5.0));
        assert!(tracker.spend(5.0));
        assert_eq!(tracker.total_spent_usd(), 5.0);
    }

    #[test]
    fn spend_past_limit_returns_false_but_still_records() {
        let tracker = BudgetTracker::new(Some(10.0));
        assert!(tracker.spend(8.0));
        assert!(!tracker.has_budget(5.0));
        assert!(!tracker.spend(5.0));
        assert_eq!(tracker.total_spent_usd(), 13.0);
    }

    #[test]
    fn is_exhausted_tracks_limit_crossing() {
        let tracker = BudgetTracker::new(Some(0.03));
        assert!(!tracker.is_exhausted());
        tracker.spend(0.03);
        assert!(tracker.is_exhausted());
    }

    #[test]
    fn unlimited_budget_is_never_exhausted() {
        let tracker = BudgetTracker::new(None);
        tracker.spend(1_000_000.0);
        assert!(!tracker.is_exhausted());
    }
}
