//! Retailer subscription bookkeeping
//!
//! Stores one JSON document mapping user ids to subscribed retailer ids,
//! behind the injected key-value store.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::store::KvStore;

const SUBSCRIPTIONS_KEY: &str = "retailer_subscriptions";

type SubscriptionMap = BTreeMap<String, Vec<i64>>;

/// Subscription service over an injected key-value store
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn KvStore>,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// A corrupt or missing document reads as no subscriptions
    fn load(&self) -> SubscriptionMap {
        self.store
            .get(SUBSCRIPTIONS_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn save(&self, map: &SubscriptionMap) {
        if let Ok(raw) = serde_json::to_string(map) {
            self.store.set(SUBSCRIPTIONS_KEY, raw);
        }
    }

    /// Retailer ids a user is subscribed to
    pub fn subscriptions_for(&self, user_id: i64) -> Vec<i64> {
        self.load()
            .get(&user_id.to_string())
            .cloned()
            .unwrap_or_default()
    }

    /// Subscribe a user to a retailer; idempotent
    pub fn subscribe(&self, user_id: i64, retailer_id: i64) -> Vec<i64> {
        let mut map = self.load();
        let subs = map.entry(user_id.to_string()).or_default();
        if !subs.contains(&retailer_id) {
            subs.push(retailer_id);
        }
        let result = subs.clone();
        self.save(&map);
        result
    }

    /// Unsubscribe a user from a retailer
    pub fn unsubscribe(&self, user_id: i64, retailer_id: i64) -> Vec<i64> {
        let mut map = self.load();
        let subs = map.entry(user_id.to_string()).or_default();
        subs.retain(|id| *id != retailer_id);
        let result = subs.clone();
        self.save(&map);
        result
    }

    pub fn is_subscribed(&self, user_id: i64, retailer_id: i64) -> bool {
        self.subscriptions_for(user_id).contains(&retailer_id)
    }
}
