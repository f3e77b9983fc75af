/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session settings.
//!
//! [`Settings`] is the key/value bundle configuring one session. Keys are
//! matched case-insensitively. [`SessionSettings`] reads the QuickFIX-style
//! settings file: a `[DEFAULT]` section inherited by every `[SESSION]`
//! section.
//!
//! ```text
//! [DEFAULT]
//! ConnectionType=initiator
//! HeartBtInt=30
//!
//! [SESSION]
//! BeginString=FIX.4.2
//! SenderCompID=CLIENT
//! TargetCompID=BROKER
//! DataDictionary=spec/FIX42.xml
//! ```

use chrono::{NaiveTime, Weekday};
use fixgate_core::SessionId;
use fixgate_core::error::ConfigError;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

/// Well-known settings keys.
pub mod keys {
    /// Protocol version token of the session.
    pub const BEGIN_STRING: &str = "BeginString";
    /// SenderCompID.
    pub const SENDER_COMP_ID: &str = "SenderCompID";
    /// SenderSubID.
    pub const SENDER_SUB_ID: &str = "SenderSubID";
    /// SenderLocationID.
    pub const SENDER_LOCATION_ID: &str = "SenderLocationID";
    /// TargetCompID.
    pub const TARGET_COMP_ID: &str = "TargetCompID";
    /// TargetSubID.
    pub const TARGET_SUB_ID: &str = "TargetSubID";
    /// TargetLocationID.
    pub const TARGET_LOCATION_ID: &str = "TargetLocationID";
    /// Distinguishes otherwise identical initiator sessions.
    pub const SESSION_QUALIFIER: &str = "SessionQualifier";
    /// `initiator` or `acceptor`.
    pub const CONNECTION_TYPE: &str = "ConnectionType";
    /// Heartbeat interval in seconds.
    pub const HEARTBT_INT: &str = "HeartBtInt";
    /// Daily or weekly session start time.
    pub const START_TIME: &str = "StartTime";
    /// Daily or weekly session end time.
    pub const END_TIME: &str = "EndTime";
    /// Weekly session start day.
    pub const START_DAY: &str = "StartDay";
    /// Weekly session end day.
    pub const END_DAY: &str = "EndDay";
    /// Evaluate the schedule in local time instead of UTC.
    pub const USE_LOCAL_TIME: &str = "UseLocalTime";
    /// Verify CompIDs of incoming messages.
    pub const CHECK_COMP_ID: &str = "CheckCompID";
    /// Verify SendingTime against the local clock.
    pub const CHECK_LATENCY: &str = "CheckLatency";
    /// Tolerated SendingTime skew in seconds.
    pub const MAX_LATENCY: &str = "MaxLatency";
    /// Seconds to wait for a Logon response.
    pub const LOGON_TIMEOUT: &str = "LogonTimeout";
    /// Seconds to wait for a Logout response.
    pub const LOGOUT_TIMEOUT: &str = "LogoutTimeout";
    /// Reset sequence numbers on Logon.
    pub const RESET_ON_LOGON: &str = "ResetOnLogon";
    /// Reset sequence numbers on Logout.
    pub const RESET_ON_LOGOUT: &str = "ResetOnLogout";
    /// Reset sequence numbers on disconnect.
    pub const RESET_ON_DISCONNECT: &str = "ResetOnDisconnect";
    /// Reload the message store on Logon.
    pub const REFRESH_ON_LOGON: &str = "RefreshOnLogon";
    /// Emit milliseconds in timestamps.
    pub const MILLISECONDS_IN_TIMESTAMP: &str = "MillisecondsInTimeStamp";
    /// Keep outgoing messages for resend.
    pub const PERSIST_MESSAGES: &str = "PersistMessages";
    /// Verify BodyLength and CheckSum.
    pub const VALIDATE_LENGTH_AND_CHECKSUM: &str = "ValidateLengthAndChecksum";
    /// Reject interleaved header, body and trailer fields.
    pub const VALIDATE_FIELDS_OUT_OF_ORDER: &str = "ValidateFieldsOutOfOrder";
    /// Reject empty field values.
    pub const VALIDATE_FIELDS_HAVE_VALUES: &str = "ValidateFieldsHaveValues";
    /// Validate user-defined fields.
    pub const VALIDATE_USER_DEFINED_FIELDS: &str = "ValidateUserDefinedFields";
    /// Schema file of a legacy session.
    pub const DATA_DICTIONARY: &str = "DataDictionary";
    /// Transport schema file of a FIXT.1.1 session.
    pub const TRANSPORT_DATA_DICTIONARY: &str = "TransportDataDictionary";
    /// Application schema file, optionally suffixed with `.<version>`.
    pub const APP_DATA_DICTIONARY: &str = "AppDataDictionary";
    /// Default application version of a FIXT.1.1 session.
    pub const DEFAULT_APPL_VER_ID: &str = "DefaultApplVerID";
}

/// Case-insensitive key/value settings for one session.
///
/// Entries iterate in key order; the original spelling of each key is kept
/// for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    entries: BTreeMap<String, (String, String)>,
}

impl Settings {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.entries
            .insert(key.to_ascii_lowercase(), (key, value.into()));
    }

    /// Sets `key` to `value` and returns the bundle.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Fills in every key of `defaults` that is not set here.
    #[must_use]
    pub fn with_defaults(mut self, defaults: &Settings) -> Self {
        for (lower, entry) in &defaults.entries {
            self.entries
                .entry(lower.clone())
                .or_insert_with(|| entry.clone());
        }
        self
    }

    /// Returns the raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if `key` is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_ascii_lowercase())
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no key is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the value of a mandatory `key`.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingSetting`] if the key is absent.
    pub fn get_string(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::missing(key))
    }

    /// Returns `key` as a `Y`/`N` flag, or `default` when absent.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidSetting`] for any other value.
    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => match value.trim() {
                v if v.eq_ignore_ascii_case("Y") => Ok(true),
                v if v.eq_ignore_ascii_case("N") => Ok(false),
                _ => Err(ConfigError::invalid(key, value, "expected Y or N")),
            },
        }
    }

    /// Returns `key` as an integer, or `None` when absent.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidSetting`] if the value is not an integer.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        self.get(key)
            .map(|value| {
                value
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| ConfigError::invalid(key, value, e.to_string()))
            })
            .transpose()
    }

    /// Returns `key` as a positive number of seconds, or `default` when absent.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidSetting`] for non-integer or
    /// non-positive values.
    pub fn get_positive_or(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        match self.get_int(key)? {
            None => Ok(default),
            Some(value) if value > 0 => Ok(value.unsigned_abs()),
            Some(value) => Err(ConfigError::invalid(
                key,
                value.to_string(),
                "must be greater than zero",
            )),
        }
    }

    /// Returns `key` as a day of the week, or `None` when absent.
    ///
    /// Accepts full and three-letter English day names in any case.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidSetting`] for unknown names.
    pub fn get_day(&self, key: &str) -> Result<Option<Weekday>, ConfigError> {
        self.get(key)
            .map(|value| {
                value
                    .trim()
                    .parse::<Weekday>()
                    .map_err(|_| ConfigError::invalid(key, value, "expected a day of the week"))
            })
            .transpose()
    }

    /// Returns `key` as an `HH:MM:SS` time of day, or `None` when absent.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidSetting`] for malformed times.
    pub fn get_time(&self, key: &str) -> Result<Option<NaiveTime>, ConfigError> {
        self.get(key)
            .map(|value| {
                NaiveTime::parse_from_str(value.trim(), "%H:%M:%S")
                    .map_err(|_| ConfigError::invalid(key, value, "expected HH:MM:SS"))
            })
            .transpose()
    }

    /// Builds the session identity described by these settings.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingSetting`] if BeginString, SenderCompID or
    /// TargetCompID is absent, or [`ConfigError::InvalidSetting`] if one of
    /// them is malformed.
    pub fn session_id(&self) -> Result<SessionId, ConfigError> {
        let mut id = SessionId::new(
            self.get_string(keys::BEGIN_STRING)?,
            self.get_string(keys::SENDER_COMP_ID)?,
            self.get_string(keys::TARGET_COMP_ID)?,
        )?;
        if let Some(v) = self.get(keys::SENDER_SUB_ID) {
            id = id.with_sender_sub_id(v);
        }
        if let Some(v) = self.get(keys::SENDER_LOCATION_ID) {
            id = id.with_sender_location_id(v);
        }
        if let Some(v) = self.get(keys::TARGET_SUB_ID) {
            id = id.with_target_sub_id(v);
        }
        if let Some(v) = self.get(keys::TARGET_LOCATION_ID) {
            id = id.with_target_location_id(v);
        }
        if let Some(v) = self.get(keys::SESSION_QUALIFIER) {
            id = id.with_session_qualifier(v);
        }
        Ok(id)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut settings = Self::new();
        for (key, value) in iter {
            settings.set(key, value);
        }
        settings
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            writeln!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// All sessions of a settings file, in file order.
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    defaults: Settings,
    sessions: Vec<(SessionId, Settings)>,
    ids: HashSet<SessionId>,
}

enum Section {
    Default,
    Session { line: usize, settings: Settings },
}

impl SessionSettings {
    /// Creates an empty set with no defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set whose sessions inherit `defaults`.
    #[must_use]
    pub fn with_defaults(defaults: Settings) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    /// Reads a settings file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            line: 0,
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::parse(&text)
    }

    /// Parses settings text.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] with the offending line for syntax
    /// errors and session sections without a valid identity, and
    /// [`ConfigError::DuplicateSession`] when two sections share an identity.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut defaults = Settings::new();
        let mut sections: Vec<(usize, Settings)> = Vec::new();
        let mut current: Option<Section> = None;

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if let Some(name) = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                if let Some(Section::Session { line, settings }) = current.take() {
                    sections.push((line, settings));
                }
                current = Some(match name.trim() {
                    n if n.eq_ignore_ascii_case("DEFAULT") => Section::Default,
                    n if n.eq_ignore_ascii_case("SESSION") => Section::Session {
                        line,
                        settings: Settings::new(),
                    },
                    other => {
                        return Err(ConfigError::Parse {
                            line,
                            reason: format!("unknown section [{other}]"),
                        });
                    }
                });
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigError::Parse {
                    line,
                    reason: format!("expected Key=Value, found {trimmed:?}"),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::Parse {
                    line,
                    reason: "empty key".to_string(),
                });
            }

            match current.as_mut() {
                Some(Section::Default) => defaults.set(key, value.trim()),
                Some(Section::Session { settings, .. }) => settings.set(key, value.trim()),
                None => {
                    return Err(ConfigError::Parse {
                        line,
                        reason: format!("{key} appears outside of a section"),
                    });
                }
            }
        }
        if let Some(Section::Session { line, settings }) = current {
            sections.push((line, settings));
        }

        let mut result = Self::with_defaults(defaults);
        for (line, settings) in sections {
            let settings = settings.with_defaults(&result.defaults);
            let id = settings.session_id().map_err(|e| ConfigError::Parse {
                line,
                reason: e.to_string(),
            })?;
            result.insert(id, settings)?;
        }
        Ok(result)
    }

    /// Adds a session, filling in the defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::DuplicateSession`] if `session_id` is already
    /// configured.
    pub fn add(&mut self, session_id: SessionId, settings: Settings) -> Result<(), ConfigError> {
        let settings = settings.with_defaults(&self.defaults);
        self.insert(session_id, settings)
    }

    fn insert(&mut self, session_id: SessionId, settings: Settings) -> Result<(), ConfigError> {
        if !self.ids.insert(session_id.clone()) {
            return Err(ConfigError::DuplicateSession(session_id));
        }
        self.sessions.push((session_id, settings));
        Ok(())
    }

    /// Returns the `[DEFAULT]` settings.
    #[must_use]
    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }

    /// Returns the settings of `session_id`.
    #[must_use]
    pub fn get(&self, session_id: &SessionId) -> Option<&Settings> {
        self.sessions
            .iter()
            .find(|(id, _)| id == session_id)
            .map(|(_, settings)| settings)
    }

    /// Iterates over the configured identities in file order.
    pub fn session_ids(&self) -> impl Iterator<Item = &SessionId> {
        self.sessions.iter().map(|(id, _)| id)
    }

    /// Iterates over `(identity, settings)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&SessionId, &Settings)> {
        self.sessions.iter().map(|(id, settings)| (id, settings))
    }

    /// Returns the number of sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true if no session is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
# sample
[DEFAULT]
ConnectionType=initiator
HeartBtInt=30

[SESSION]
BeginString=FIX.4.2
SenderCompID=CLIENT
TargetCompID=BROKER
DataDictionary=spec/FIX42.xml

[session]
BeginString=FIXT.1.1
SenderCompID=CLIENT
TargetCompID=BROKER
HeartBtInt=60
TransportDataDictionary=spec/FIXT11.xml
DefaultApplVerID=FIX.5.0SP2
";

    #[test]
    fn test_settings_keys_are_case_insensitive() {
        let settings = Settings::new().with("HeartBtInt", "30");
        assert_eq!(settings.get("heartbtint"), Some("30"));
        assert_eq!(settings.get("HEARTBTINT"), Some("30"));
        assert!(settings.contains("HeartBtInt"));
        assert_eq!(settings.iter().next(), Some(("HeartBtInt", "30")));
    }

    #[test]
    fn test_settings_with_defaults_does_not_override() {
        let defaults = Settings::new().with("HeartBtInt", "30").with("CheckCompID", "N");
        let settings = Settings::new().with("heartbtint", "45").with_defaults(&defaults);
        assert_eq!(settings.get("HeartBtInt"), Some("45"));
        assert_eq!(settings.get("CheckCompID"), Some("N"));
        assert_eq!(settings.len(), 2);
    }

    #[test]
    fn test_settings_typed_getters() {
        let settings: Settings = [
            ("ResetOnLogon", "y"),
            ("HeartBtInt", "30"),
            ("StartDay", "Monday"),
            ("StartTime", "08:30:00"),
            ("Bad", "maybe"),
        ]
        .into_iter()
        .collect();

        assert!(settings.get_bool_or("ResetOnLogon", false).unwrap());
        assert!(!settings.get_bool_or("ResetOnLogout", false).unwrap());
        assert_eq!(settings.get_int("HeartBtInt").unwrap(), Some(30));
        assert_eq!(settings.get_positive_or("MaxLatency", 120).unwrap(), 120);
        assert_eq!(settings.get_day("StartDay").unwrap(), Some(Weekday::Mon));
        assert_eq!(
            settings.get_time("StartTime").unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0)
        );
        assert!(settings.get_bool_or("Bad", true).is_err());
        assert!(settings.get_int("Bad").is_err());
        assert!(settings.get_day("Bad").is_err());
        assert!(settings.get_time("Bad").is_err());
    }

    #[test]
    fn test_settings_positive_rejects_zero() {
        let settings = Settings::new().with("HeartBtInt", "0");
        let err = settings.get_positive_or("HeartBtInt", 30).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { ref key, .. } if key == "HeartBtInt"));
    }

    #[test]
    fn test_settings_missing_string() {
        let err = Settings::new().get_string("DataDictionary").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting { ref key } if key == "DataDictionary"));
    }

    #[test]
    fn test_settings_session_id() {
        let settings = Settings::new()
            .with("BeginString", "FIX.4.4")
            .with("SenderCompID", "A")
            .with("TargetCompID", "B")
            .with("TargetSubID", "DESK")
            .with("SessionQualifier", "2");
        let id = settings.session_id().unwrap();
        assert_eq!(id.to_string(), "FIX.4.4:A->B/DESK:2");
    }

    #[test]
    fn test_session_settings_parse() {
        let parsed = SessionSettings::parse(SAMPLE).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.defaults().get("ConnectionType"), Some("initiator"));

        let ids: Vec<String> = parsed.session_ids().map(ToString::to_string).collect();
        assert_eq!(ids, vec!["FIX.4.2:CLIENT->BROKER", "FIXT.1.1:CLIENT->BROKER"]);

        let (first_id, first) = parsed.iter().next().unwrap();
        assert_eq!(first.get("HeartBtInt"), Some("30"));
        assert_eq!(first.get("DataDictionary"), Some("spec/FIX42.xml"));
        assert_eq!(parsed.get(first_id), Some(first));

        let (_, second) = parsed.iter().nth(1).unwrap();
        assert_eq!(second.get("HeartBtInt"), Some("60"));
        assert_eq!(second.get("ConnectionType"), Some("initiator"));
    }

    #[test]
    fn test_session_settings_rejects_duplicates() {
        let text = "\
[SESSION]
BeginString=FIX.4.2
SenderCompID=A
TargetCompID=B
[SESSION]
BeginString=FIX.4.2
SenderCompID=A
TargetCompID=B
";
        let err = SessionSettings::parse(text).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSession(ref id) if id.to_string() == "FIX.4.2:A->B"));
    }

    #[test]
    fn test_session_settings_parse_errors_report_line() {
        let err = SessionSettings::parse("[DEFAULT]\nHeartBtInt\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }));

        let err = SessionSettings::parse("HeartBtInt=30\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 1, .. }));

        let err = SessionSettings::parse("[ACCEPTOR]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 1, .. }));

        let err = SessionSettings::parse("\n[SESSION]\nBeginString=FIX.4.2\n").unwrap_err();
        match err {
            ConfigError::Parse { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("SenderCompID"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_session_settings_add() {
        let mut all = SessionSettings::with_defaults(Settings::new().with("HeartBtInt", "30"));
        let id = SessionId::new("FIX.4.4", "A", "B").unwrap();
        all.add(id.clone(), Settings::new()).unwrap();
        assert_eq!(all.get(&id).unwrap().get("HeartBtInt"), Some("30"));
        assert!(all.add(id, Settings::new()).is_err());
    }

    #[test]
    fn test_session_settings_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let parsed = SessionSettings::from_file(file.path()).unwrap();
        assert_eq!(parsed.len(), 2);

        let missing = SessionSettings::from_file(Path::new("/nonexistent/session.cfg"));
        assert!(matches!(missing, Err(ConfigError::Parse { line: 0, .. })));
    }
}
