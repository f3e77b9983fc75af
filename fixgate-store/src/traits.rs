/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message store trait definitions.
//!
//! Stores are opened per session through a [`MessageStoreFactory`]. Session
//! construction only hands the factory to the session; nothing is opened
//! until the session asks for its store.

use chrono::{DateTime, Utc};
use fixgate_core::SessionId;
use fixgate_core::error::StoreError;
use std::sync::Arc;

/// Persistent state of one session.
///
/// The session layer treats a store as an opaque handle; the persisted
/// layout belongs to the implementation.
pub trait MessageStore: Send + Sync {
    /// Returns the session this store belongs to.
    fn session_id(&self) -> &SessionId;

    /// Returns when the store's current state was created.
    fn creation_time(&self) -> DateTime<Utc>;
}

/// Opens message stores for sessions.
pub trait MessageStoreFactory: Send + Sync {
    /// Opens the store of `session_id`.
    ///
    /// # Errors
    /// Returns [`StoreError::OpenFailed`] if the store cannot be opened.
    fn create(&self, session_id: &SessionId) -> Result<Arc<dyn MessageStore>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedStore {
        session_id: SessionId,
        created: DateTime<Utc>,
    }

    impl MessageStore for FixedStore {
        fn session_id(&self) -> &SessionId {
            &self.session_id
        }

        fn creation_time(&self) -> DateTime<Utc> {
            self.created
        }
    }

    struct FixedFactory(DateTime<Utc>);

    impl MessageStoreFactory for FixedFactory {
        fn create(&self, session_id: &SessionId) -> Result<Arc<dyn MessageStore>, StoreError> {
            Ok(Arc::new(FixedStore {
                session_id: session_id.clone(),
                created: self.0,
            }))
        }
    }

    struct FailingFactory;

    impl MessageStoreFactory for FailingFactory {
        fn create(&self, session_id: &SessionId) -> Result<Arc<dyn MessageStore>, StoreError> {
            Err(StoreError::OpenFailed {
                session_id: session_id.clone(),
                reason: "read-only".to_string(),
            })
        }
    }

    #[test]
    fn test_factory_opens_store_for_session() {
        let created = Utc::now();
        let id = SessionId::new("FIX.4.2", "A", "B").unwrap();
        let store = FixedFactory(created).create(&id).unwrap();
        assert_eq!(store.session_id(), &id);
        assert_eq!(store.creation_time(), created);
    }

    #[test]
    fn test_factory_open_failure_names_session() {
        let id = SessionId::new("FIX.4.2", "A", "B").unwrap();
        let err = FailingFactory.create(&id).err().unwrap();
        assert_eq!(err.to_string(), "cannot open store for FIX.4.2:A->B: read-only");
    }
}
