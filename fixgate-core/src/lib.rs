/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FixGate Core
//!
//! Core types and error definitions shared by the FixGate crates.
//!
//! This crate provides:
//! - **Error types**: Configuration, lookup, schema and store errors built with `thiserror`
//! - **Session identity**: [`SessionId`], the composite key for one counterparty
//! - **Core types**: [`CompId`]

pub mod error;
pub mod session_id;
pub mod types;

pub use error::{ConfigError, LookupError, SchemaError, StoreError};
pub use session_id::SessionId;
pub use types::CompId;
