use std::collections::HashMap;

use tracing::warn;

use shared::domain::Domain;

/// Count-based tracker of in-flight fetches, keyed by domain. Pure
/// observation surface for "is anything still loading" queries; it never
/// gates whether a fetch is issued.
#[derive(Debug, Clone, Default)]
pub struct PendingCalls {
    counts: HashMap<Domain, u32>,
}

impl PendingCalls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, domain: Domain) {
        *self.counts.entry(domain).or_insert(0) += 1;
    }

    /// Balanced with `increment`: called exactly once per dispatched fetch
    /// when it settles, whether it succeeded, failed, or was superseded.
    pub fn decrement(&mut self, domain: Domain) {
        match self.counts.get_mut(&domain) {
            Some(count) if *count > 0 => *count -= 1,
            _ => warn!(domain = %domain, "registry: decrement without matching increment"),
        }
    }

    pub fn pending_count(&self, domain: Domain) -> u32 {
        self.counts.get(&domain).copied().unwrap_or(0)
    }

    pub fn is_pending(&self, domain: Domain) -> bool {
        self.pending_count(domain) > 0
    }

    pub fn is_any_pending(&self) -> bool {
        self.counts.values().any(|count| *count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_reports_nothing_pending() {
        let registry = PendingCalls::new();
        assert!(!registry.is_any_pending());
        assert!(!registry.is_pending(Domain::Rent));
        assert_eq!(registry.pending_count(Domain::Rent), 0);
    }

    #[test]
    fn counts_are_per_domain() {
        let mut registry = PendingCalls::new();
        registry.increment(Domain::Rent);
        registry.increment(Domain::Rent);
        registry.increment(Domain::Affordability);

        assert_eq!(registry.pending_count(Domain::Rent), 2);
        assert_eq!(registry.pending_count(Domain::Affordability), 1);
        assert!(!registry.is_pending(Domain::Neighborhoods));
        assert!(registry.is_any_pending());
    }

    #[test]
    fn balanced_sequences_drain_to_idle() {
        let mut registry = PendingCalls::new();
        for _ in 0..3 {
            registry.increment(Domain::Neighborhoods);
        }
        for _ in 0..3 {
            registry.decrement(Domain::Neighborhoods);
        }
        assert!(!registry.is_any_pending());
    }

    #[test]
    fn decrement_on_empty_entry_stays_at_zero() {
        let mut registry = PendingCalls::new();
        registry.decrement(Domain::Rent);
        assert_eq!(registry.pending_count(Domain::Rent), 0);
        assert!(!registry.is_any_pending());
    }
}
