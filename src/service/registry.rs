//! Subscription registry: company key to subscriber fan-out.

use std::sync::Arc;

use dashmap::DashMap;

use crate::domain::Cik;
use crate::service::market::EarningsMarket;

/// Concurrent multi-map from CIK to the markets watching that company.
///
/// Several markets may watch the same filer (e.g. GAAP and non-GAAP EPS
/// markets for one earnings report); an alert fans out to all of them.
/// Registration happens from subscriber-construction call sites, lookups
/// from the poller; a registration landing mid-poll joins the fan-out on
/// the next cycle at the latest.
#[derive(Default)]
pub struct SubscriptionRegistry {
    subscribers: DashMap<Cik, Vec<Arc<EarningsMarket>>>,
}

impl SubscriptionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a market under its company key.
    pub fn register(&self, market: Arc<EarningsMarket>) {
        self.subscribers
            .entry(market.cik().clone())
            .or_default()
            .push(market);
    }

    /// Snapshot of the markets watching `cik`. Empty when the company is
    /// unwatched.
    #[must_use]
    pub fn subscribers_for(&self, cik: &Cik) -> Vec<Arc<EarningsMarket>> {
        self.subscribers
            .get(cik)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Total number of registered markets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.iter().map(|entry| entry.value().len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Number of distinct companies watched.
    #[must_use]
    pub fn company_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::market::tests::market_with_cik;

    #[test]
    fn lookup_on_empty_registry_is_empty() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.subscribers_for(&Cik::new("123")).is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn register_then_lookup() {
        let registry = SubscriptionRegistry::new();
        let market = market_with_cik("m1-quarterly-earnings", "0000123");
        registry.register(market.clone());

        let hits = registry.subscribers_for(&Cik::new("0000123"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slug(), market.slug());
    }

    #[test]
    fn padded_and_unpadded_keys_collide() {
        let registry = SubscriptionRegistry::new();
        registry.register(market_with_cik("m1-quarterly-earnings", "0000123"));
        assert_eq!(registry.subscribers_for(&Cik::new("123")).len(), 1);
    }

    #[test]
    fn multiple_markets_same_company_all_returned() {
        let registry = SubscriptionRegistry::new();
        registry.register(market_with_cik("gaap-market", "777"));
        registry.register(market_with_cik("nongaap-market", "777"));

        let hits = registry.subscribers_for(&Cik::new("777"));
        assert_eq!(hits.len(), 2);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.company_count(), 1);
    }

    #[test]
    fn unrelated_company_not_returned() {
        let registry = SubscriptionRegistry::new();
        registry.register(market_with_cik("m1", "123"));
        assert!(registry.subscribers_for(&Cik::new("9999999")).is_empty());
    }
}
