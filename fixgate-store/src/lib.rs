/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FixGate Store
//!
//! Message persistence collaborators for FixGate sessions.
//!
//! This crate provides:
//! - **MessageStore trait**: Opaque per-session store handle
//! - **MessageStoreFactory trait**: Opens one store per session identity
//! - **MemoryStore**: In-memory store for testing and simple use cases

pub mod memory;
pub mod traits;

pub use memory::{MemoryStore, MemoryStoreFactory};
pub use traits::{MessageStore, MessageStoreFactory};
