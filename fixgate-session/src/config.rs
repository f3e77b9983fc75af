/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session configuration.
//!
//! [`SessionConfig`] is the typed, validated view of a session's settings.
//! It is derived once when the session is created.

use crate::schedule::SessionSchedule;
use crate::settings::{Settings, keys};
use fixgate_core::error::ConfigError;
use fixgate_dictionary::{ApplVerId, ValidationOptions};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which side opens the connection.
///
/// Sessions without a `ConnectionType` setting are acceptors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    /// Connects out and sends the first Logon.
    Initiator,
    /// Listens for incoming connections.
    #[default]
    Acceptor,
}

impl ConnectionType {
    /// Returns the settings spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initiator => "initiator",
            Self::Acceptor => "acceptor",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            v if v.eq_ignore_ascii_case("initiator") => Ok(Self::Initiator),
            v if v.eq_ignore_ascii_case("acceptor") => Ok(Self::Acceptor),
            _ => Err(ConfigError::invalid(
                keys::CONNECTION_TYPE,
                s,
                "expected initiator or acceptor",
            )),
        }
    }
}

/// Configuration for a FIX session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Initiator or acceptor.
    pub connection_type: ConnectionType,
    /// Heartbeat interval. Acceptors take it from the counterparty's Logon.
    pub heartbeat_interval: Option<Duration>,
    /// When the session may be logged on.
    pub schedule: SessionSchedule,
    /// Whether to verify CompIDs of incoming messages.
    pub check_comp_id: bool,
    /// Whether to verify SendingTime against the local clock.
    pub check_latency: bool,
    /// Tolerated SendingTime skew.
    pub max_latency: Duration,
    /// Logon timeout duration.
    pub logon_timeout: Duration,
    /// Logout timeout duration.
    pub logout_timeout: Duration,
    /// Whether to reset sequence numbers on logon.
    pub reset_on_logon: bool,
    /// Whether to reset sequence numbers on logout.
    pub reset_on_logout: bool,
    /// Whether to reset sequence numbers on disconnect.
    pub reset_on_disconnect: bool,
    /// Whether to reload the message store on logon.
    pub refresh_on_logon: bool,
    /// Whether timestamps carry milliseconds.
    pub milliseconds_in_timestamp: bool,
    /// Whether outgoing messages are kept for resend.
    pub persist_messages: bool,
    /// Whether to validate incoming BodyLength and CheckSum.
    pub validate_length_and_checksum: bool,
    /// Message validation switches.
    pub validation: ValidationOptions,
    /// Default application version of a FIXT.1.1 session.
    pub default_appl_ver_id: Option<ApplVerId>,
}

impl SessionConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new(connection_type: ConnectionType) -> Self {
        Self {
            connection_type,
            heartbeat_interval: None,
            schedule: SessionSchedule::non_stop(),
            check_comp_id: true,
            check_latency: true,
            max_latency: Duration::from_secs(120),
            logon_timeout: Duration::from_secs(10),
            logout_timeout: Duration::from_secs(2),
            reset_on_logon: false,
            reset_on_logout: false,
            reset_on_disconnect: false,
            refresh_on_logon: false,
            milliseconds_in_timestamp: true,
            persist_messages: true,
            validate_length_and_checksum: true,
            validation: ValidationOptions::default(),
            default_appl_ver_id: None,
        }
    }

    /// Derives and validates the configuration from `settings`.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingSetting`] when an initiator has no
    /// HeartBtInt, [`ConfigError::InvalidSetting`] for unusable values and
    /// [`ConfigError::UnsupportedVersion`] for an unknown DefaultApplVerID.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let explicit = settings
            .get(keys::CONNECTION_TYPE)
            .map(str::parse::<ConnectionType>)
            .transpose()?;
        let connection_type = explicit.unwrap_or_default();

        if explicit == Some(ConnectionType::Acceptor) {
            if let Some(qualifier) = settings.get(keys::SESSION_QUALIFIER) {
                return Err(ConfigError::invalid(
                    keys::SESSION_QUALIFIER,
                    qualifier,
                    "not supported for acceptor sessions",
                ));
            }
        }

        let heartbeat_interval = match (connection_type, settings.contains(keys::HEARTBT_INT)) {
            (ConnectionType::Initiator, false) => {
                return Err(ConfigError::missing(keys::HEARTBT_INT));
            }
            (_, true) => Some(Duration::from_secs(
                settings.get_positive_or(keys::HEARTBT_INT, 30)?,
            )),
            (ConnectionType::Acceptor, false) => None,
        };

        let defaults = Self::new(connection_type);
        let secs = |key: &str, default: Duration| -> Result<Duration, ConfigError> {
            settings
                .get_positive_or(key, default.as_secs())
                .map(Duration::from_secs)
        };
        let flag = |key: &str, default: bool| settings.get_bool_or(key, default);

        Ok(Self {
            connection_type,
            heartbeat_interval,
            schedule: SessionSchedule::from_settings(settings)?,
            check_comp_id: flag(keys::CHECK_COMP_ID, defaults.check_comp_id)?,
            check_latency: flag(keys::CHECK_LATENCY, defaults.check_latency)?,
            max_latency: secs(keys::MAX_LATENCY, defaults.max_latency)?,
            logon_timeout: secs(keys::LOGON_TIMEOUT, defaults.logon_timeout)?,
            logout_timeout: secs(keys::LOGOUT_TIMEOUT, defaults.logout_timeout)?,
            reset_on_logon: flag(keys::RESET_ON_LOGON, defaults.reset_on_logon)?,
            reset_on_logout: flag(keys::RESET_ON_LOGOUT, defaults.reset_on_logout)?,
            reset_on_disconnect: flag(keys::RESET_ON_DISCONNECT, defaults.reset_on_disconnect)?,
            refresh_on_logon: flag(keys::REFRESH_ON_LOGON, defaults.refresh_on_logon)?,
            milliseconds_in_timestamp: flag(
                keys::MILLISECONDS_IN_TIMESTAMP,
                defaults.milliseconds_in_timestamp,
            )?,
            persist_messages: flag(keys::PERSIST_MESSAGES, defaults.persist_messages)?,
            validate_length_and_checksum: flag(
                keys::VALIDATE_LENGTH_AND_CHECKSUM,
                defaults.validate_length_and_checksum,
            )?,
            validation: ValidationOptions {
                check_fields_out_of_order: flag(keys::VALIDATE_FIELDS_OUT_OF_ORDER, true)?,
                check_fields_have_values: flag(keys::VALIDATE_FIELDS_HAVE_VALUES, true)?,
                check_user_defined_fields: flag(keys::VALIDATE_USER_DEFINED_FIELDS, true)?,
            },
            default_appl_ver_id: settings
                .get(keys::DEFAULT_APPL_VER_ID)
                .map(ApplVerId::resolve)
                .transpose()?,
        })
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Sets the session schedule.
    #[must_use]
    pub const fn with_schedule(mut self, schedule: SessionSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Sets whether to reset sequence numbers on logon.
    #[must_use]
    pub const fn with_reset_on_logon(mut self, reset: bool) -> Self {
        self.reset_on_logon = reset;
        self
    }

    /// Sets the logon timeout.
    #[must_use]
    pub fn with_logon_timeout(mut self, timeout: Duration) -> Self {
        self.logon_timeout = timeout;
        self
    }

    /// Sets the message validation switches.
    #[must_use]
    pub const fn with_validation(mut self, validation: ValidationOptions) -> Self {
        self.validation = validation;
        self
    }

    /// Sets the default application version.
    #[must_use]
    pub const fn with_default_appl_ver_id(mut self, appl_ver_id: ApplVerId) -> Self {
        self.default_appl_ver_id = Some(appl_ver_id);
        self
    }

    /// Returns the heartbeat interval in seconds, if configured.
    #[must_use]
    pub fn heartbeat_interval_secs(&self) -> Option<u64> {
        self.heartbeat_interval.map(|d| d.as_secs())
    }

    /// Returns true for initiator sessions.
    #[must_use]
    pub fn is_initiator(&self) -> bool {
        self.connection_type == ConnectionType::Initiator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleWindow;

    fn initiator() -> Settings {
        Settings::new()
            .with("ConnectionType", "initiator")
            .with("HeartBtInt", "30")
    }

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::from_settings(&initiator()).unwrap();

        assert!(config.is_initiator());
        assert_eq!(config.heartbeat_interval, Some(Duration::from_secs(30)));
        assert_eq!(config.schedule.window(), ScheduleWindow::NonStop);
        assert!(config.check_comp_id);
        assert!(config.check_latency);
        assert_eq!(config.max_latency, Duration::from_secs(120));
        assert_eq!(config.logon_timeout, Duration::from_secs(10));
        assert_eq!(config.logout_timeout, Duration::from_secs(2));
        assert!(!config.reset_on_logon);
        assert!(config.persist_messages);
        assert!(config.validate_length_and_checksum);
        assert_eq!(config.validation, ValidationOptions::default());
        assert_eq!(config.default_appl_ver_id, None);
        assert_eq!(
            config,
            SessionConfig::new(ConnectionType::Initiator)
                .with_heartbeat_interval(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_session_config_overrides() {
        let settings = initiator()
            .with("ResetOnLogon", "Y")
            .with("CheckLatency", "N")
            .with("MaxLatency", "5")
            .with("LogonTimeout", "30")
            .with("ValidateUserDefinedFields", "N")
            .with("DefaultApplVerID", "9")
            .with("StartTime", "06:00:00")
            .with("EndTime", "18:00:00");
        let config = SessionConfig::from_settings(&settings).unwrap();

        assert!(config.reset_on_logon);
        assert!(!config.check_latency);
        assert_eq!(config.max_latency, Duration::from_secs(5));
        assert_eq!(config.logon_timeout, Duration::from_secs(30));
        assert!(!config.validation.check_user_defined_fields);
        assert!(config.validation.check_fields_have_values);
        assert_eq!(config.default_appl_ver_id, Some(ApplVerId::Fix50Sp2));
        assert!(matches!(config.schedule.window(), ScheduleWindow::Daily { .. }));
    }

    #[test]
    fn test_session_config_without_connection_type_is_acceptor() {
        let config = SessionConfig::from_settings(&Settings::new()).unwrap();
        assert_eq!(config.connection_type, ConnectionType::Acceptor);
        assert_eq!(config.heartbeat_interval, None);
        assert_eq!(config, SessionConfig::new(ConnectionType::default()));

        let qualified = Settings::new().with("SessionQualifier", "2");
        assert!(SessionConfig::from_settings(&qualified).is_ok());
    }

    #[test]
    fn test_session_config_rejects_unknown_connection_type() {
        let settings = Settings::new().with("ConnectionType", "listener");
        let err = SessionConfig::from_settings(&settings).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { ref key, .. } if key == "ConnectionType"));
    }

    #[test]
    fn test_initiator_requires_heartbeat() {
        let settings = Settings::new().with("ConnectionType", "initiator");
        let err = SessionConfig::from_settings(&settings).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting { ref key } if key == "HeartBtInt"));
    }

    #[test]
    fn test_acceptor_without_heartbeat() {
        let settings = Settings::new().with("ConnectionType", "ACCEPTOR");
        let config = SessionConfig::from_settings(&settings).unwrap();
        assert_eq!(config.connection_type, ConnectionType::Acceptor);
        assert_eq!(config.heartbeat_interval_secs(), None);
    }

    #[test]
    fn test_acceptor_rejects_session_qualifier() {
        let settings = Settings::new()
            .with("ConnectionType", "acceptor")
            .with("SessionQualifier", "2");
        let err = SessionConfig::from_settings(&settings).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { ref key, .. } if key == "SessionQualifier"));
    }

    #[test]
    fn test_session_config_rejects_bad_values() {
        let err = SessionConfig::from_settings(&initiator().with("HeartBtInt", "-1"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { ref key, .. } if key == "HeartBtInt"));

        let err = SessionConfig::from_settings(&initiator().with("PersistMessages", "yes"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { ref key, .. } if key == "PersistMessages"));

        let err = SessionConfig::from_settings(&initiator().with("DefaultApplVerID", "FIX.9.9"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion { ref token } if token == "FIX.9.9"));
    }

    #[test]
    fn test_connection_type_display() {
        assert_eq!(ConnectionType::Initiator.to_string(), "initiator");
        assert_eq!("Acceptor".parse::<ConnectionType>().unwrap(), ConnectionType::Acceptor);
    }
}
