use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

use oneclick_core::TenantId;

/// Tenant-partitioned key/value storage for rebuildable read models.
///
/// Every operation names its tenant; there is no cross-tenant read.
pub trait TenantStore<K, V>: Send + Sync {
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V>;

    fn upsert(&self, tenant_id: TenantId, key: K, value: V);

    fn list(&self, tenant_id: TenantId) -> Vec<V>;

    /// Values of the tenant for which `predicate` holds.
    fn filter(&self, tenant_id: TenantId, predicate: &dyn Fn(&V) -> bool) -> Vec<V> {
        self.list(tenant_id)
            .into_iter()
            .filter(|v| predicate(v))
            .collect()
    }

    /// Drop the tenant's partition (rebuild support).
    fn clear_tenant(&self, tenant_id: TenantId);
}

impl<K, V, S> TenantStore<K, V> for Arc<S>
where
    S: TenantStore<K, V> + ?Sized,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        (**self).get(tenant_id, key)
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        (**self).upsert(tenant_id, key, value)
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        (**self).list(tenant_id)
    }

    fn filter(&self, tenant_id: TenantId, predicate: &dyn Fn(&V) -> bool) -> Vec<V> {
        (**self).filter(tenant_id, predicate)
    }

    fn clear_tenant(&self, tenant_id: TenantId) {
        (**self).clear_tenant(tenant_id)
    }
}

/// In-memory store, one map per tenant.
///
/// Read models are disposable, so a poisoned lock is recovered rather than reported.
#[derive(Debug)]
pub struct InMemoryTenantStore<K, V> {
    partitions: RwLock<HashMap<TenantId, HashMap<K, V>>>,
}

impl<K, V> InMemoryTenantStore<K, V> {
    pub fn new() -> Self {
        Self {
            partitions: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryTenantStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> TenantStore<K, V> for InMemoryTenantStore<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        let partitions = self.partitions.read().unwrap_or_else(PoisonError::into_inner);
        partitions.get(&tenant_id)?.get(key).cloned()
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        let mut partitions = self.partitions.write().unwrap_or_else(PoisonError::into_inner);
        partitions.entry(tenant_id).or_default().insert(key, value);
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        self.filter(tenant_id, &|_| true)
    }

    fn filter(&self, tenant_id: TenantId, predicate: &dyn Fn(&V) -> bool) -> Vec<V> {
        let partitions = self.partitions.read().unwrap_or_else(PoisonError::into_inner);
        partitions
            .get(&tenant_id)
            .map(|partition| partition.values().filter(|v| predicate(v)).cloned().collect())
            .unwrap_or_default()
    }

    fn clear_tenant(&self, tenant_id: TenantId) {
        let mut partitions = self.partitions.write().unwrap_or_else(PoisonError::into_inner);
        partitions.remove(&tenant_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenants_never_see_each_other() {
        let store = InMemoryTenantStore::<u32, &str>::new();
        let a = TenantId::new();
        let b = TenantId::new();

        store.upsert(a, 1, "widget");
        store.upsert(b, 1, "gadget");

        assert_eq!(store.get(a, &1), Some("widget"));
        assert_eq!(store.get(b, &1), Some("gadget"));
        assert_eq!(store.list(a), vec!["widget"]);

        store.clear_tenant(a);
        assert!(store.list(a).is_empty());
        assert_eq!(store.list(b), vec!["gadget"]);
    }

    #[test]
    fn filter_only_clones_matches() {
        let store = InMemoryTenantStore::<u32, String>::new();
        let tenant_id = TenantId::new();
        for (k, v) in [(1, "W-100"), (2, "W-200"), (3, "X-1")] {
            store.upsert(tenant_id, k, v.to_string());
        }

        let mut found = store.filter(tenant_id, &|v| v.starts_with("W-"));
        found.sort();
        assert_eq!(found, vec!["W-100".to_string(), "W-200".to_string()]);
        assert!(store.filter(TenantId::new(), &|_| true).is_empty());
    }
}
