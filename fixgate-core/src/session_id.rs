/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session identity.
//!
//! A [`SessionId`] is the composite key that identifies one counterparty
//! connection configuration. It is an immutable value type and is used as the
//! lookup key for schemas, stores and logs.

use crate::error::ConfigError;
use crate::types::CompId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId {
    begin_string: String,
    sender_comp_id: CompId,
    target_comp_id: CompId,
    sender_sub_id: Option<String>,
    sender_location_id: Option<String>,
    target_sub_id: Option<String>,
    target_location_id: Option<String>,
    session_qualifier: Option<String>,
}

impl SessionId {
    /// Creates a new session ID.
    ///
    /// # Arguments
    /// * `begin_string` - The protocol version token (tag 8)
    /// * `sender_comp_id` - SenderCompID (tag 49)
    /// * `target_comp_id` - TargetCompID (tag 56)
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidSetting`] if the begin string is empty or a
    /// CompID is not valid.
    pub fn new(
        begin_string: impl Into<String>,
        sender_comp_id: &str,
        target_comp_id: &str,
    ) -> Result<Self, ConfigError> {
        let begin_string = begin_string.into();
        if begin_string.trim().is_empty() {
            return Err(ConfigError::invalid(
                "BeginString",
                begin_string,
                "must not be empty",
            ));
        }

        Ok(Self {
            begin_string,
            sender_comp_id: parse_comp_id("SenderCompID", sender_comp_id)?,
            target_comp_id: parse_comp_id("TargetCompID", target_comp_id)?,
            sender_sub_id: None,
            sender_location_id: None,
            target_sub_id: None,
            target_location_id: None,
            session_qualifier: None,
        })
    }

    /// Sets the sender sub ID (tag 50).
    #[must_use]
    pub fn with_sender_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sender_sub_id = Some(sub_id.into());
        self
    }

    /// Sets the sender location ID (tag 142).
    #[must_use]
    pub fn with_sender_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.sender_location_id = Some(location_id.into());
        self
    }

    /// Sets the target sub ID (tag 57).
    #[must_use]
    pub fn with_target_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.target_sub_id = Some(sub_id.into());
        self
    }

    /// Sets the target location ID (tag 143).
    #[must_use]
    pub fn with_target_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.target_location_id = Some(location_id.into());
        self
    }

    /// Sets the session qualifier, used to tell apart otherwise identical
    /// initiator sessions.
    #[must_use]
    pub fn with_session_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.session_qualifier = Some(qualifier.into());
        self
    }

    /// Returns the BeginString.
    #[must_use]
    pub fn begin_string(&self) -> &str {
        &self.begin_string
    }

    /// Returns the SenderCompID.
    #[must_use]
    pub const fn sender_comp_id(&self) -> &CompId {
        &self.sender_comp_id
    }

    /// Returns the TargetCompID.
    #[must_use]
    pub const fn target_comp_id(&self) -> &CompId {
        &self.target_comp_id
    }

    /// Returns the SenderSubID.
    #[must_use]
    pub fn sender_sub_id(&self) -> Option<&str> {
        self.sender_sub_id.as_deref()
    }

    /// Returns the SenderLocationID.
    #[must_use]
    pub fn sender_location_id(&self) -> Option<&str> {
        self.sender_location_id.as_deref()
    }

    /// Returns the TargetSubID.
    #[must_use]
    pub fn target_sub_id(&self) -> Option<&str> {
        self.target_sub_id.as_deref()
    }

    /// Returns the TargetLocationID.
    #[must_use]
    pub fn target_location_id(&self) -> Option<&str> {
        self.target_location_id.as_deref()
    }

    /// Returns the session qualifier.
    #[must_use]
    pub fn session_qualifier(&self) -> Option<&str> {
        self.session_qualifier.as_deref()
    }

    /// Returns the identity as seen from the counterparty.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            begin_string: self.begin_string.clone(),
            sender_comp_id: self.target_comp_id,
            target_comp_id: self.sender_comp_id,
            sender_sub_id: self.target_sub_id.clone(),
            sender_location_id: self.target_location_id.clone(),
            target_sub_id: self.sender_sub_id.clone(),
            target_location_id: self.sender_location_id.clone(),
            session_qualifier: self.session_qualifier.clone(),
        }
    }
}

fn parse_comp_id(key: &str, value: &str) -> Result<CompId, ConfigError> {
    CompId::new(value).ok_or_else(|| {
        ConfigError::invalid(key, value, crate::types::InvalidCompId.to_string())
    })
}

fn write_party(
    f: &mut fmt::Formatter<'_>,
    comp_id: &CompId,
    sub_id: Option<&str>,
    location_id: Option<&str>,
) -> fmt::Result {
    write!(f, "{comp_id}")?;
    if let Some(sub) = sub_id {
        write!(f, "/{sub}")?;
    }
    if let Some(location) = location_id {
        write!(f, "/{location}")?;
    }
    Ok(())
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.begin_string)?;
        write_party(
            f,
            &self.sender_comp_id,
            self.sender_sub_id(),
            self.sender_location_id(),
        )?;
        write!(f, "->")?;
        write_party(
            f,
            &self.target_comp_id,
            self.target_sub_id(),
            self.target_location_id(),
        )?;
        if let Some(qualifier) = &self.session_qualifier {
            write!(f, ":{qualifier}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_session_id() {
        let id = SessionId::new("FIX.4.4", "SENDER", "TARGET").unwrap();
        assert_eq!(id.begin_string(), "FIX.4.4");
        assert_eq!(id.sender_comp_id().as_str(), "SENDER");
        assert_eq!(id.target_comp_id().as_str(), "TARGET");
        assert_eq!(id.to_string(), "FIX.4.4:SENDER->TARGET");
    }

    #[test]
    fn test_session_id_display_with_qualifiers() {
        let id = SessionId::new("FIXT.1.1", "SENDER", "TARGET")
            .unwrap()
            .with_sender_sub_id("DESK")
            .with_target_location_id("LDN")
            .with_session_qualifier("Q1");
        assert_eq!(id.to_string(), "FIXT.1.1:SENDER/DESK->TARGET/LDN:Q1");
    }

    #[test]
    fn test_session_id_rejects_invalid_comp_id() {
        let err = SessionId::new("FIX.4.2", "", "TARGET").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidSetting { ref key, .. } if key == "SenderCompID"
        ));

        let err = SessionId::new("  ", "SENDER", "TARGET").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidSetting { ref key, .. } if key == "BeginString"
        ));
    }

    #[test]
    fn test_session_id_qualifier_distinguishes_identity() {
        let plain = SessionId::new("FIX.4.2", "A", "B").unwrap();
        let qualified = plain.clone().with_session_qualifier("2");

        let mut set = HashSet::new();
        set.insert(plain);
        set.insert(qualified);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_session_id_reversed() {
        let id = SessionId::new("FIX.4.2", "A", "B")
            .unwrap()
            .with_sender_sub_id("S");
        let rev = id.reversed();
        assert_eq!(rev.sender_comp_id().as_str(), "B");
        assert_eq!(rev.target_comp_id().as_str(), "A");
        assert_eq!(rev.target_sub_id(), Some("S"));
        assert_eq!(rev.reversed(), id);
    }
}
