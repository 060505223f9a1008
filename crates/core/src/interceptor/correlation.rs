//! Correlation ids and the active-request registry

use std::collections::HashSet;
use std::sync::Arc;

use clinicflow_domain::constants::CORRELATION_ID_PREFIX;
use parking_lot::Mutex;
use uuid::Uuid;

/// `req_` followed by a UUIDv7 in simple form
///
/// The v7 layout gives a millisecond timestamp prefix and a random suffix,
/// so ids sort by creation time in logs.
pub fn new_correlation_id() -> String {
    format!("{CORRELATION_ID_PREFIX}{}", Uuid::now_v7().simple())
}

/// Set of correlation ids for calls currently inside the interceptor
#[derive(Debug, Clone, Default)]
pub struct ActiveRequests {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl ActiveRequests {
    /// Register `id` until the returned guard is dropped
    pub fn track(&self, id: &str) -> ActiveRequestGuard {
        self.inner.lock().insert(id.to_string());
        ActiveRequestGuard { registry: Arc::clone(&self.inner), id: id.to_string() }
    }

    pub fn snapshot(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.lock().iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().contains(id)
    }
}

/// Removes its id from the registry on drop, including on panic and when
/// the owning future is dropped mid-flight.
#[derive(Debug)]
pub struct ActiveRequestGuard {
    registry: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl ActiveRequestGuard {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for ActiveRequestGuard {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_prefixed_and_unique() {
        let a = new_correlation_id();
        let b = new_correlation_id();

        assert!(a.starts_with("req_"));
        assert_eq!(a.len(), 4 + 32);
        assert_ne!(a, b);
    }

    #[test]
    fn guard_removes_on_drop() {
        let active = ActiveRequests::default();
        {
            let guard = active.track("req_1");
            assert!(active.contains(guard.id()));
            assert_eq!(active.len(), 1);
        }
        assert!(active.is_empty());
    }

    #[test]
    fn guard_removes_on_panic() {
        let active = ActiveRequests::default();
        let registry = active.clone();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = registry.track("req_panic");
            panic!("boom");
        }));

        assert!(result.is_err());
        assert!(active.is_empty());
    }
}
