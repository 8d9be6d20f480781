use std::any::TypeId;
use std::collections::HashMap;

use parking_lot::Mutex;

/// Matching rows of one group, tagged with the structure version they were
/// computed against.
struct CachedRows {
    version: u64,
    rows: Vec<u32>,
}

/// Per-signature cache of group memberships.
///
/// A group signature is the sorted set of required component types. Entries
/// go stale whenever the registry's structure version moves (entity created
/// or destroyed, component attached or removed) and are rebuilt lazily on the
/// next access.
#[derive(Default)]
pub(crate) struct GroupCache {
    entries: Mutex<HashMap<Vec<TypeId>, CachedRows>>,
}

impl GroupCache {
    /// Rows for `signature`, rebuilt with `compute` when stale.
    pub fn rows(
        &self,
        mut signature: Vec<TypeId>,
        version: u64,
        compute: impl FnOnce() -> Vec<u32>,
    ) -> Vec<u32> {
        signature.sort_unstable();
        signature.dedup();

        let mut entries = self.entries.lock();
        let entry = entries.entry(signature).or_insert(CachedRows {
            version: u64::MAX,
            rows: Vec::new(),
        });
        if entry.version != version {
            entry.rows = compute();
            entry.version = version;
        }
        entry.rows.clone()
    }

    /// Number of signatures currently tracked.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recomputes_only_on_version_change() {
        let cache = GroupCache::default();
        let sig = vec![TypeId::of::<u32>(), TypeId::of::<f32>()];
        let mut calls = 0;

        let rows = cache.rows(sig.clone(), 1, || {
            calls += 1;
            vec![1, 2]
        });
        assert_eq!(rows, vec![1, 2]);

        let rows = cache.rows(sig.clone(), 1, || {
            calls += 1;
            vec![9]
        });
        assert_eq!(rows, vec![1, 2]);

        let rows = cache.rows(sig, 2, || {
            calls += 1;
            vec![3]
        });
        assert_eq!(rows, vec![3]);
        assert_eq!(calls, 2);
    }

    #[test]
    fn signature_order_is_irrelevant() {
        let cache = GroupCache::default();
        cache.rows(vec![TypeId::of::<u32>(), TypeId::of::<f32>()], 0, Vec::new);
        cache.rows(vec![TypeId::of::<f32>(), TypeId::of::<u32>()], 0, Vec::new);
        assert_eq!(cache.len(), 1);
    }
}
