//! Per-(book, issuer) mutual exclusion for ledger mutations

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

type PairLock = Arc<AsyncMutex<()>>;

/// Serializes issue/return of the same book to the same issuer within this process
#[derive(Clone, Default)]
pub struct IssueLocks {
    locks: Arc<Mutex<HashMap<(Uuid, String), PairLock>>>,
}

impl IssueLocks {
    /// Wait for exclusive access to the pair. Released when the guard drops.
    pub async fn acquire(&self, book: Uuid, issuer: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // Entries nobody holds or waits on are dropped.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry((book, issuer.to_string()))
                .or_default()
                .clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
