/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Application callback interface.
//!
//! Sessions hand raw tag=value buffers to an [`Application`]. Every callback
//! has a default body accepting the message unchanged, so implementations
//! only override what they care about.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use fixgate_core::SessionId;
use std::fmt;

/// Why an inbound message was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectReason {
    /// SessionRejectReason (373) code.
    pub code: u32,
    /// Text (58) sent back to the counterparty.
    pub text: String,
    /// RefTagID (371), when a single tag is at fault.
    pub ref_tag: Option<u32>,
}

impl RejectReason {
    /// Creates a rejection with an explicit code.
    #[must_use]
    pub fn new(code: u32, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
            ref_tag: None,
        }
    }

    /// Sets RefTagID.
    #[must_use]
    pub const fn with_ref_tag(mut self, tag: u32) -> Self {
        self.ref_tag = Some(tag);
        self
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.text)?;
        if let Some(tag) = self.ref_tag {
            write!(f, " (tag {tag})")?;
        }
        Ok(())
    }
}

/// Receiver of session lifecycle events and messages.
///
/// One instance is shared by every session a factory creates, so it must be
/// safe to call from several sessions at once.
#[async_trait]
pub trait Application: Send + Sync {
    /// A session was configured.
    async fn on_create(&self, _session_id: &SessionId) {}

    /// Logon completed.
    async fn on_logon(&self, _session_id: &SessionId) {}

    /// The session logged out or lost its connection.
    async fn on_logout(&self, _session_id: &SessionId) {}

    /// An admin message (Logon, Heartbeat, ...) is about to be sent.
    async fn to_admin(&self, _message: &mut BytesMut, _session_id: &SessionId) {}

    /// An admin message arrived.
    #[allow(clippy::wrong_self_convention)]
    async fn from_admin(
        &self,
        _message: &Bytes,
        _session_id: &SessionId,
    ) -> Result<(), RejectReason> {
        Ok(())
    }

    /// An application message is about to be sent.
    async fn to_app(&self, _message: &mut BytesMut, _session_id: &SessionId) {}

    /// An application message arrived.
    #[allow(clippy::wrong_self_convention)]
    async fn from_app(&self, _message: &Bytes, _session_id: &SessionId) -> Result<(), RejectReason> {
        Ok(())
    }
}

/// Application that accepts everything and does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpApplication;

impl Application for NoOpApplication {}
