use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OwnedMutexGuard;

use crate::db::PlanStore;
use crate::services::CatalogStore;

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogStore,
    pub plans: Arc<dyn PlanStore>,
    pub plan_locks: PlanLocks,
}

impl AppState {
    pub fn new(catalog: CatalogStore, plans: Arc<dyn PlanStore>) -> Self {
        Self {
            catalog,
            plans,
            plan_locks: PlanLocks::default(),
        }
    }
}

type LockMap = HashMap<String, Arc<tokio::sync::Mutex<()>>>;

/// One exclusive lock per plan key, held across load-modify-save of that plan.
/// An entry lives only while some request holds or waits on it.
#[derive(Clone, Default)]
pub struct PlanLocks(Arc<Mutex<LockMap>>);

impl PlanLocks {
    pub async fn acquire(&self, key: &str) -> PlanGuard {
        let lock = self.map().entry(key.to_string()).or_default().clone();
        let guard = lock.lock_owned().await;
        PlanGuard {
            locks: self.clone(),
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    fn map(&self) -> MutexGuard<'_, LockMap> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn prune(&self, key: &str) {
        let mut locks = self.map();
        if locks.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(key);
        }
    }
}

pub struct PlanGuard {
    locks: PlanLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for PlanGuard {
    fn drop(&mut self) {
        // release first so the map holds the last reference when nobody waits
        self.guard.take();
        self.locks.prune(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn released_locks_leave_the_map() {
        let locks = PlanLocks::default();
        for n in 0..50 {
            let _guard = locks.acquire(&format!("student-{n}")).await;
        }
        assert!(locks.map().is_empty());
    }

    #[tokio::test]
    async fn waiter_keeps_the_entry_until_it_is_done() {
        let locks = PlanLocks::default();
        let first = locks.acquire("jane").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("jane").await;
            })
        };
        while locks.map().get("jane").is_none_or(|lock| Arc::strong_count(lock) < 3) {
            tokio::task::yield_now().await;
        }

        drop(first);
        assert!(locks.map().contains_key("jane"));

        waiter.await.expect("waiter finishes");
        assert!(locks.map().is_empty());
    }
}
