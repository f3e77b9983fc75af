/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fixgate
//!
//! FIX session configuration for Rust.
//!
//! fixgate turns QuickFIX-style settings into fully configured sessions. Each
//! session gets a schema provider matching its protocol family: a single
//! schema for FIX 4.x, or a transport schema plus per-version application
//! schemas for FIXT 1.1. Schema documents are loaded once per path and shared
//! between sessions.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fixgate::prelude::*;
//! use std::sync::Arc;
//!
//! let settings = SessionSettings::from_file("sessions.cfg".as_ref())?;
//! let factory = SessionFactory::builder(
//!     Arc::new(NoOpApplication),
//!     Arc::new(MemoryStoreFactory::new()),
//! )
//! .with_schema_directory("spec")
//! .build();
//!
//! for session in factory.create_all(&settings)? {
//!     println!("{}", session.session_id());
//! }
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Session identity and error definitions
//! - [`dictionary`]: Schema documents, versions, providers and the schema cache
//! - [`session`]: Settings, typed configuration, schedules, logs and sessions
//! - [`store`]: Message persistence
//! - [`engine`]: Session factory

pub mod core {
    //! Session identity and error definitions.
    pub use fixgate_core::*;
}

pub mod dictionary {
    //! Schema documents, versions, providers and the schema cache.
    pub use fixgate_dictionary::*;
}

pub mod session {
    //! Settings, typed configuration, schedules, logs and sessions.
    pub use fixgate_session::*;
}

pub mod store {
    //! Message persistence.
    pub use fixgate_store::*;
}

pub mod engine {
    //! Session factory.
    pub use fixgate_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use fixgate_core::{CompId, ConfigError, LookupError, SchemaError, SessionId, StoreError};

    // Dictionary
    pub use fixgate_dictionary::{
        ApplVerId, Dictionary, LayeredSchemas, LegacySchema, ProtocolFamily, SchemaCache,
        SchemaProvider, ValidationOptions, Version,
    };

    // Session
    pub use fixgate_session::{
        ConnectionType, Log, LogFactory, MemoryLogFactory, Session, SessionConfig,
        SessionSchedule, SessionSettings, Settings, TracingLogFactory,
    };

    // Store
    pub use fixgate_store::{MemoryStore, MemoryStoreFactory, MessageStore, MessageStoreFactory};

    // Engine
    pub use fixgate_engine::{
        Application, CanonicalSchemas, NoOpApplication, RejectReason, SessionFactory,
        SessionFactoryBuilder,
    };
}
