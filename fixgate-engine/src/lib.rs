/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FixGate Engine
//!
//! Session construction for the FixGate engine.
//!
//! This crate provides:
//! - **Session factory**: Builds configured sessions from identities and settings
//! - **Canonical schemas**: Default schema file per application version
//! - **Builder API**: Fluent configuration for factory setup

pub mod builder;
pub mod factory;

pub use builder::SessionFactoryBuilder;
pub use factory::{CanonicalSchemas, SessionFactory};
pub use fixgate_session::application::{Application, NoOpApplication, RejectReason};
