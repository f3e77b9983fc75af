/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! In-memory message store implementation.
//!
//! Nothing survives the process; suitable for tests and sessions that do
//! not need persistence.

use crate::traits::{MessageStore, MessageStoreFactory};
use chrono::{DateTime, Utc};
use fixgate_core::SessionId;
use fixgate_core::error::StoreError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory message store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    session_id: SessionId,
    creation_time: DateTime<Utc>,
}

impl MemoryStore {
    /// Creates the store of `session_id`, stamped with the current time.
    #[must_use]
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            creation_time: Utc::now(),
        }
    }
}

impl MessageStore for MemoryStore {
    fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    fn creation_time(&self) -> DateTime<Utc> {
        self.creation_time
    }
}

/// Factory handing out one [`MemoryStore`] per session identity.
///
/// Opening the same identity twice returns the same store.
#[derive(Debug, Default)]
pub struct MemoryStoreFactory {
    stores: Mutex<HashMap<SessionId, Arc<MemoryStore>>>,
}

impl MemoryStoreFactory {
    /// Creates a factory with no open stores.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stores opened so far.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.stores.lock().len()
    }

    /// Returns the store of `session_id` if it has been opened.
    #[must_use]
    pub fn get(&self, session_id: &SessionId) -> Option<Arc<MemoryStore>> {
        self.stores.lock().get(session_id).cloned()
    }
}

impl MessageStoreFactory for MemoryStoreFactory {
    fn create(&self, session_id: &SessionId) -> Result<Arc<dyn MessageStore>, StoreError> {
        let store = Arc::clone(
            self.stores
                .lock()
                .entry(session_id.clone())
                .or_insert_with(|| Arc::new(MemoryStore::new(session_id.clone()))),
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_new() {
        let before = Utc::now();
        let id = SessionId::new("FIX.4.2", "A", "B").unwrap();
        let store = MemoryStore::new(id.clone());
        assert_eq!(store.session_id(), &id);
        assert!(store.creation_time() >= before);
    }

    #[test]
    fn test_factory_reuses_store_per_session() {
        let factory = MemoryStoreFactory::new();
        let a = SessionId::new("FIX.4.2", "A", "B").unwrap();
        let b = SessionId::new("FIX.4.4", "A", "B").unwrap();

        let first = factory.create(&a).unwrap();
        let again = factory.create(&a).unwrap();
        let other = factory.create(&b).unwrap();

        assert_eq!(first.creation_time(), again.creation_time());
        assert_eq!(again.session_id(), &a);
        assert_eq!(other.session_id(), &b);
        assert_eq!(factory.open_count(), 2);
        assert!(Arc::ptr_eq(&factory.get(&a).unwrap(), &factory.get(&a).unwrap()));
        assert!(factory.get(&SessionId::new("FIX.4.3", "A", "B").unwrap()).is_none());
    }
}
