/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FixGate Session
//!
//! Session settings, typed configuration and the assembled session object.
//!
//! This crate provides:
//! - **Settings**: Case-insensitive settings bundles and the settings file reader
//! - **Configuration**: Typed, validated session configuration
//! - **Schedule**: Daily and weekly session windows
//! - **Collaborators**: Application callbacks and per-session diagnostic logs
//! - **Session**: The configured session handed out by the session factory

pub mod application;
pub mod config;
pub mod log;
pub mod schedule;
pub mod session;
pub mod settings;

pub use application::{Application, NoOpApplication, RejectReason};
pub use config::{ConnectionType, SessionConfig};
pub use log::{Log, LogFactory, MemoryLogFactory, TracingLogFactory};
pub use schedule::SessionSchedule;
pub use session::Session;
pub use settings::{SessionSettings, Settings};
