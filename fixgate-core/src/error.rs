/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the FixGate session factory.
//!
//! This module provides a unified error hierarchy using `thiserror`:
//! - [`ConfigError`]: anything that prevents a session from being assembled
//! - [`LookupError`]: a caller querying a schema provider it does not match
//! - [`SchemaError`]: failures of the schema file reader
//! - [`StoreError`]: failures reported by persistence collaborators

use crate::session_id::SessionId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that prevent a valid session from being assembled.
///
/// Configuration errors are always raised synchronously while a session is
/// being created. Errors raised by the session factory are wrapped in
/// [`ConfigError::Session`] so the offending identity is always attached.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A mandatory setting is absent.
    #[error("missing setting {key}")]
    MissingSetting {
        /// The settings key that was expected.
        key: String,
    },

    /// A setting is present but its value is unusable.
    #[error("invalid value {value:?} for setting {key}: {reason}")]
    InvalidSetting {
        /// The settings key.
        key: String,
        /// The offending value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The protocol version token is not recognized.
    #[error("unsupported protocol version {token:?}")]
    UnsupportedVersion {
        /// The token as it appeared in the configuration.
        token: String,
    },

    /// A schema file could not be loaded.
    #[error("failed to load schema {}: {source}", .path.display())]
    SchemaLoad {
        /// The resolved schema file path.
        path: PathBuf,
        /// The underlying reader failure.
        #[source]
        source: SchemaError,
    },

    /// A settings file could not be parsed.
    #[error("settings parse error at line {line}: {reason}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// Description of the problem.
        reason: String,
    },

    /// The same session identity was configured twice.
    #[error("duplicate session {0}")]
    DuplicateSession(SessionId),

    /// An error attributed to one session identity.
    #[error("session {session_id}: {source}")]
    Session {
        /// The identity whose configuration failed.
        session_id: SessionId,
        /// The underlying configuration error.
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// Creates a [`ConfigError::MissingSetting`] for `key`.
    #[must_use]
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingSetting { key: key.into() }
    }

    /// Creates a [`ConfigError::InvalidSetting`].
    #[must_use]
    pub fn invalid(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Attributes this error to a session identity.
    ///
    /// Errors that are already attributed are returned unchanged.
    #[must_use]
    pub fn for_session(self, session_id: &SessionId) -> Self {
        match self {
            Self::Session { .. } => self,
            other => Self::Session {
                session_id: session_id.clone(),
                source: Box::new(other),
            },
        }
    }

    /// Returns the innermost error, skipping identity wrappers.
    #[must_use]
    pub fn root(&self) -> &ConfigError {
        match self {
            Self::Session { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns the session identity this error is attributed to, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::Session { session_id, .. } => Some(session_id),
            _ => None,
        }
    }
}

/// Caller misuse of a schema provider.
///
/// This is a programming error on the caller's side, not a configuration
/// problem, and is therefore kept apart from [`ConfigError`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The accessor does not exist for the provider's protocol family.
    #[error("{accessor} is not available for {family} schema providers")]
    WrongMode {
        /// The accessor that was called.
        accessor: &'static str,
        /// The family of the provider.
        family: &'static str,
    },

    /// No application schema is registered for the version identifier.
    #[error("no application schema registered for ApplVerID {appl_ver_id}")]
    UnregisteredVersion {
        /// The requested ApplVerID.
        appl_ver_id: String,
    },
}

/// Errors raised while reading a schema document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The file could not be read.
    #[error("io error: {0}")]
    Io(String),

    /// The document is not well-formed XML.
    #[error("malformed xml: {0}")]
    Xml(String),

    /// The root element is not `<fix>`.
    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),

    /// A required attribute is absent.
    #[error("<{element}> is missing attribute {attribute:?}")]
    MissingAttribute {
        /// The element name.
        element: String,
        /// The attribute name.
        attribute: &'static str,
    },

    /// An attribute value could not be interpreted.
    #[error("<{element}> has invalid {attribute:?}: {value:?}")]
    InvalidAttribute {
        /// The element name.
        element: String,
        /// The attribute name.
        attribute: &'static str,
        /// The offending value.
        value: String,
    },

    /// The declared protocol version is not supported.
    #[error("unsupported schema version {0}")]
    UnsupportedVersion(String),

    /// A field is referenced by name but never defined.
    #[error("unknown field {name:?} referenced in {context}")]
    UnknownField {
        /// The referenced field name.
        name: String,
        /// Where the reference appeared.
        context: String,
    },

    /// A component is referenced but never defined.
    #[error("unknown component {name:?} referenced in {context}")]
    UnknownComponent {
        /// The referenced component name.
        name: String,
        /// Where the reference appeared.
        context: String,
    },

    /// Two field definitions share a tag.
    #[error("duplicate field tag {0}")]
    DuplicateField(u32),

    /// A repeating group has no members.
    #[error("group {0:?} has no members")]
    EmptyGroup(String),
}

/// Errors in message store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store for a session could not be opened.
    #[error("cannot open store for {session_id}: {reason}")]
    OpenFailed {
        /// The session whose store was requested.
        session_id: SessionId,
        /// Reason for failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::missing("DataDictionary");
        assert_eq!(err.to_string(), "missing setting DataDictionary");
    }

    #[test]
    fn test_config_error_for_session() {
        let id = SessionId::new("FIX.4.2", "SENDER", "TARGET").unwrap();
        let err = ConfigError::missing("DataDictionary").for_session(&id);

        assert_eq!(
            err.to_string(),
            "session FIX.4.2:SENDER->TARGET: missing setting DataDictionary"
        );
        assert_eq!(err.session_id(), Some(&id));
        assert!(matches!(
            err.root(),
            ConfigError::MissingSetting { key } if key == "DataDictionary"
        ));
    }

    #[test]
    fn test_config_error_for_session_is_idempotent() {
        let first = SessionId::new("FIX.4.2", "A", "B").unwrap();
        let second = SessionId::new("FIX.4.4", "C", "D").unwrap();
        let err = ConfigError::missing("X")
            .for_session(&first)
            .for_session(&second);
        assert_eq!(err.session_id(), Some(&first));
    }

    #[test]
    fn test_schema_load_preserves_cause() {
        let err = ConfigError::SchemaLoad {
            path: PathBuf::from("fix42.xml"),
            source: SchemaError::DuplicateField(35),
        };
        assert_eq!(
            err.to_string(),
            "failed to load schema fix42.xml: duplicate field tag 35"
        );
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("duplicate field tag 35"));
    }

    #[test]
    fn test_lookup_error_display() {
        let err = LookupError::UnregisteredVersion {
            appl_ver_id: "FIX.5.0SP2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no application schema registered for ApplVerID FIX.5.0SP2"
        );
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::OpenFailed {
            session_id: SessionId::new("FIX.4.2", "A", "B").unwrap(),
            reason: "locked".to_string(),
        };
        assert_eq!(err.to_string(), "cannot open store for FIX.4.2:A->B: locked");
    }
}
