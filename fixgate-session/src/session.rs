/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Configured session.
//!
//! A [`Session`] bundles everything one counterparty connection needs: its
//! identity, the schema provider it validates against, its typed
//! configuration and the shared collaborators. It is immutable once built.

use crate::application::Application;
use crate::config::SessionConfig;
use crate::log::Log;
use chrono::{DateTime, Utc};
use fixgate_core::SessionId;
use fixgate_core::error::StoreError;
use fixgate_dictionary::SchemaProvider;
use fixgate_store::{MessageStore, MessageStoreFactory};
use std::fmt;
use std::sync::Arc;

/// A fully configured FIX session.
pub struct Session {
    session_id: SessionId,
    schemas: SchemaProvider,
    config: SessionConfig,
    application: Arc<dyn Application>,
    store_factory: Arc<dyn MessageStoreFactory>,
    log: Option<Box<dyn Log>>,
}

impl Session {
    /// Assembles a session from its parts.
    #[must_use]
    pub fn new(
        session_id: SessionId,
        schemas: SchemaProvider,
        config: SessionConfig,
        application: Arc<dyn Application>,
        store_factory: Arc<dyn MessageStoreFactory>,
    ) -> Self {
        Self {
            session_id,
            schemas,
            config,
            application,
            store_factory,
            log: None,
        }
    }

    /// Attaches a diagnostic log.
    #[must_use]
    pub fn with_log(mut self, log: Box<dyn Log>) -> Self {
        self.log = Some(log);
        self
    }

    /// Returns the session identity.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the schema provider.
    #[must_use]
    pub fn schemas(&self) -> &SchemaProvider {
        &self.schemas
    }

    /// Returns the typed configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the application callback target.
    #[must_use]
    pub fn application(&self) -> &Arc<dyn Application> {
        &self.application
    }

    /// Returns the persistence factory.
    #[must_use]
    pub fn store_factory(&self) -> &Arc<dyn MessageStoreFactory> {
        &self.store_factory
    }

    /// Returns the diagnostic log, if one is configured.
    #[must_use]
    pub fn log(&self) -> Option<&dyn Log> {
        self.log.as_deref()
    }

    /// Opens this session's message store.
    ///
    /// # Errors
    /// Returns the persistence factory's [`StoreError`].
    pub fn open_store(&self) -> Result<Arc<dyn MessageStore>, StoreError> {
        self.store_factory.create(&self.session_id)
    }

    /// Records a session event on the diagnostic log, if any.
    pub fn log_event(&self, text: &str) {
        if let Some(log) = &self.log {
            log.on_event(text);
        }
    }

    /// Tells the application this session exists and records the event.
    pub async fn notify_created(&self) {
        self.application.on_create(&self.session_id).await;
        self.log_event("Created session");
    }

    /// Returns true if `now` lies inside the configured schedule.
    #[must_use]
    pub fn is_session_time(&self, now: DateTime<Utc>) -> bool {
        self.config.schedule.is_session_time(now)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("session_id", &self.session_id)
            .field("family", &self.schemas.family())
            .field("config", &self.config)
            .field("has_log", &self.log.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::NoOpApplication;
    use crate::config::ConnectionType;
    use crate::log::{LogFactory, LogKind, MemoryLogFactory};
    use chrono::{NaiveTime, TimeZone};
    use fixgate_dictionary::{
        Dictionary, FieldDef, FieldType, LegacySchema, ValidationOptions, Version,
    };
    use fixgate_store::MemoryStoreFactory;
    use parking_lot::Mutex;

    fn session(store_factory: Arc<MemoryStoreFactory>) -> Session {
        let mut dictionary = Dictionary::new(Version::Fix42);
        dictionary.add_field(FieldDef::new(35, "MsgType", FieldType::String));
        let schemas = SchemaProvider::legacy(
            LegacySchema::new(Version::Fix42, Arc::new(dictionary)),
            ValidationOptions::default(),
        );
        Session::new(
            SessionId::new("FIX.4.2", "A", "B").unwrap(),
            schemas,
            SessionConfig::new(ConnectionType::Acceptor),
            Arc::new(NoOpApplication),
            store_factory,
        )
    }

    #[test]
    fn test_session_accessors() {
        let session = session(Arc::new(MemoryStoreFactory::new()));
        assert_eq!(session.session_id().to_string(), "FIX.4.2:A->B");
        assert!(session.schemas().schema().unwrap().get_field(35).is_some());
        assert!(!session.config().is_initiator());
        assert!(session.log().is_none());
        session.log_event("ignored");
    }

    #[test]
    fn test_session_opens_store_on_demand() {
        let stores = Arc::new(MemoryStoreFactory::new());
        let session = session(Arc::clone(&stores));
        assert_eq!(stores.open_count(), 0);

        let store = session.open_store().unwrap();
        assert_eq!(store.session_id(), session.session_id());
        assert_eq!(stores.open_count(), 1);
        assert!(stores.get(session.session_id()).is_some());
    }

    #[test]
    fn test_session_log() {
        let logs = MemoryLogFactory::new();
        let base = session(Arc::new(MemoryStoreFactory::new()));
        let log = logs.create(base.session_id()).unwrap();
        let session = base.with_log(log);

        session.log_event("created");
        let entries = logs.entries(session.session_id());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, LogKind::Event);
    }

    #[tokio::test]
    async fn test_session_notify_created() {
        struct Counting(Mutex<Vec<SessionId>>);

        #[async_trait::async_trait]
        impl Application for Counting {
            async fn on_create(&self, session_id: &SessionId) {
                self.0.lock().push(session_id.clone());
            }
        }

        let app = Arc::new(Counting(Mutex::new(Vec::new())));
        let logs = MemoryLogFactory::new();
        let base = session(Arc::new(MemoryStoreFactory::new()));
        let log = logs.create(base.session_id()).unwrap();
        let session = Session {
            application: app.clone(),
            ..base
        }
        .with_log(log);

        session.notify_created().await;
        assert_eq!(*app.0.lock(), vec![session.session_id().clone()]);
        assert_eq!(logs.entries(session.session_id())[0].text, "Created session");
    }

    #[test]
    fn test_session_schedule() {
        let mut session = session(Arc::new(MemoryStoreFactory::new()));
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        session.config = session
            .config
            .clone()
            .with_schedule(crate::schedule::SessionSchedule::daily(start, end));

        assert!(session.is_session_time(Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap()));
        assert!(!session.is_session_time(Utc.with_ymd_and_hms(2026, 1, 5, 20, 0, 0).unwrap()));
    }

    #[test]
    fn test_session_debug_omits_collaborators() {
        let session = session(Arc::new(MemoryStoreFactory::new()));
        let debug = format!("{session:?}");
        assert!(debug.contains("FIX.4.2"));
        assert!(debug.contains("has_log: false"));
    }
}
