/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Per-session diagnostic logs.
//!
//! A [`LogFactory`] hands out one [`Log`] per session identity. Two
//! implementations are provided: [`TracingLogFactory`] forwards to `tracing`
//! and [`MemoryLogFactory`] keeps entries in memory for inspection.

use chrono::{DateTime, Utc};
use fixgate_core::SessionId;
use fixgate_core::error::ConfigError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Diagnostic log of one session.
pub trait Log: Send + Sync {
    /// Records a received message.
    fn on_incoming(&self, message: &str);

    /// Records a sent message.
    fn on_outgoing(&self, message: &str);

    /// Records a session event.
    fn on_event(&self, text: &str);

    /// Discards recorded entries, if the log keeps any.
    fn clear(&self) {}
}

/// Creates one [`Log`] per session.
pub trait LogFactory: Send + Sync {
    /// Creates the log of `session_id`.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the log cannot be set up.
    fn create(&self, session_id: &SessionId) -> Result<Box<dyn Log>, ConfigError>;
}

/// Log forwarding every entry to `tracing`, tagged with the session.
#[derive(Debug, Clone)]
pub struct TracingLog {
    session: String,
}

impl Log for TracingLog {
    fn on_incoming(&self, message: &str) {
        debug!(session = %self.session, direction = "in", "{message}");
    }

    fn on_outgoing(&self, message: &str) {
        debug!(session = %self.session, direction = "out", "{message}");
    }

    fn on_event(&self, text: &str) {
        info!(session = %self.session, "{text}");
    }
}

/// Factory for [`TracingLog`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogFactory;

impl LogFactory for TracingLogFactory {
    fn create(&self, session_id: &SessionId) -> Result<Box<dyn Log>, ConfigError> {
        Ok(Box::new(TracingLog {
            session: session_id.to_string(),
        }))
    }
}

/// Kind of a recorded log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// Received message.
    Incoming,
    /// Sent message.
    Outgoing,
    /// Session event.
    Event,
}

/// One recorded log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
    /// Entry kind.
    pub kind: LogKind,
    /// Message or event text.
    pub text: String,
}

type Entries = Arc<Mutex<Vec<LogEntry>>>;

/// In-memory log.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    entries: Entries,
}

impl MemoryLog {
    fn push(&self, kind: LogKind, text: &str) {
        self.entries.lock().push(LogEntry {
            timestamp: Utc::now(),
            kind,
            text: text.to_string(),
        });
    }

    /// Returns a copy of the recorded entries.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }
}

impl Log for MemoryLog {
    fn on_incoming(&self, message: &str) {
        self.push(LogKind::Incoming, message);
    }

    fn on_outgoing(&self, message: &str) {
        self.push(LogKind::Outgoing, message);
    }

    fn on_event(&self, text: &str) {
        self.push(LogKind::Event, text);
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Factory for [`MemoryLog`].
///
/// Keeps a handle on every log it creates so entries can be read back by
/// session identity.
#[derive(Debug, Default)]
pub struct MemoryLogFactory {
    logs: Mutex<HashMap<SessionId, MemoryLog>>,
}

impl MemoryLogFactory {
    /// Creates a factory with no logs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entries recorded for `session_id`.
    #[must_use]
    pub fn entries(&self, session_id: &SessionId) -> Vec<LogEntry> {
        self.logs
            .lock()
            .get(session_id)
            .map(MemoryLog::entries)
            .unwrap_or_default()
    }

    /// Returns the number of sessions a log was created for.
    #[must_use]
    pub fn created(&self) -> usize {
        self.logs.lock().len()
    }
}

impl LogFactory for MemoryLogFactory {
    fn create(&self, session_id: &SessionId) -> Result<Box<dyn Log>, ConfigError> {
        let log = self
            .logs
            .lock()
            .entry(session_id.clone())
            .or_default()
            .clone();
        Ok(Box::new(log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> SessionId {
        SessionId::new("FIX.4.2", "A", "B").unwrap()
    }

    #[test]
    fn test_memory_log_records_entries() {
        let factory = MemoryLogFactory::new();
        let log = factory.create(&id()).unwrap();

        log.on_event("created");
        log.on_outgoing("8=FIX.4.2|35=A|");
        log.on_incoming("8=FIX.4.2|35=A|");

        let entries = factory.entries(&id());
        let kinds: Vec<LogKind> = entries.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![LogKind::Event, LogKind::Outgoing, LogKind::Incoming]);
        assert_eq!(entries[0].text, "created");
        assert!(entries[0].timestamp <= entries[2].timestamp);
        assert_eq!(factory.created(), 1);
    }

    #[test]
    fn test_memory_log_clear() {
        let factory = MemoryLogFactory::new();
        let log = factory.create(&id()).unwrap();
        log.on_event("one");
        log.clear();
        assert!(factory.entries(&id()).is_empty());
    }

    #[test]
    fn test_memory_log_unknown_session_is_empty() {
        let factory = MemoryLogFactory::new();
        assert!(factory.entries(&id()).is_empty());
        assert_eq!(factory.created(), 0);
    }

    #[test]
    fn test_tracing_log_factory() {
        let log = TracingLogFactory.create(&id()).unwrap();
        log.on_event("created");
        log.on_incoming("8=FIX.4.2|");
        log.on_outgoing("8=FIX.4.2|");
        log.clear();
    }
}
