/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Protocol versions and version resolution.
//!
//! This module maps the version tokens found in session identities and
//! settings onto typed values:
//! - [`Version`]: the protocol version a schema document describes
//! - [`ApplVerId`]: the application-version identifier (tag 1128)
//! - [`ProtocolFamily`]: legacy single-schema versus layered FIXT sessions

use fixgate_core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// BeginString of the layered transport protocol.
pub const FIXT_BEGIN_STRING: &str = "FIXT.1.1";

/// FIX protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Version {
    /// FIX 4.0
    Fix40,
    /// FIX 4.1
    Fix41,
    /// FIX 4.2
    Fix42,
    /// FIX 4.3
    Fix43,
    /// FIX 4.4
    Fix44,
    /// FIX 5.0
    Fix50,
    /// FIX 5.0 SP1
    Fix50Sp1,
    /// FIX 5.0 SP2
    Fix50Sp2,
    /// FIXT 1.1 (transport layer for FIX 5.0+)
    Fixt11,
}

impl Version {
    /// Returns the BeginString value sent on the wire for this version.
    #[must_use]
    pub const fn begin_string(&self) -> &'static str {
        match self {
            Self::Fix40 => "FIX.4.0",
            Self::Fix41 => "FIX.4.1",
            Self::Fix42 => "FIX.4.2",
            Self::Fix43 => "FIX.4.3",
            Self::Fix44 => "FIX.4.4",
            Self::Fix50 | Self::Fix50Sp1 | Self::Fix50Sp2 | Self::Fixt11 => FIXT_BEGIN_STRING,
        }
    }

    /// Returns the full version name, e.g. `FIX.5.0SP2`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fix50 => "FIX.5.0",
            Self::Fix50Sp1 => "FIX.5.0SP1",
            Self::Fix50Sp2 => "FIX.5.0SP2",
            other => other.begin_string(),
        }
    }

    /// Returns true if this is the transport-only FIXT version.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Fixt11)
    }

    /// Resolves the version a schema file declares on its root element.
    ///
    /// # Arguments
    /// * `kind` - The `type` attribute (`FIX` or `FIXT`)
    /// * `major` - The `major` attribute
    /// * `minor` - The `minor` attribute
    /// * `service_pack` - The `servicepack` attribute, `0` when absent
    #[must_use]
    pub fn from_parts(kind: &str, major: u32, minor: u32, service_pack: u32) -> Option<Self> {
        match (kind, major, minor, service_pack) {
            ("FIXT", 1, 1, 0) => Some(Self::Fixt11),
            ("FIX", 4, 0, 0) => Some(Self::Fix40),
            ("FIX", 4, 1, 0) => Some(Self::Fix41),
            ("FIX", 4, 2, 0) => Some(Self::Fix42),
            ("FIX", 4, 3, 0) => Some(Self::Fix43),
            ("FIX", 4, 4, 0) => Some(Self::Fix44),
            ("FIX", 5, 0, 0) => Some(Self::Fix50),
            ("FIX", 5, 0, 1) => Some(Self::Fix50Sp1),
            ("FIX", 5, 0, 2) => Some(Self::Fix50Sp2),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Application version identifier (tag 1128).
///
/// Identifies which application-layer schema a FIXT session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ApplVerId {
    /// FIX 2.7
    Fix27,
    /// FIX 3.0
    Fix30,
    /// FIX 4.0
    Fix40,
    /// FIX 4.1
    Fix41,
    /// FIX 4.2
    Fix42,
    /// FIX 4.3
    Fix43,
    /// FIX 4.4
    Fix44,
    /// FIX 5.0
    Fix50,
    /// FIX 5.0 SP1
    Fix50Sp1,
    /// FIX 5.0 SP2
    Fix50Sp2,
}

impl ApplVerId {
    /// All identifiers in enumeration order.
    pub const ALL: [Self; 10] = [
        Self::Fix27,
        Self::Fix30,
        Self::Fix40,
        Self::Fix41,
        Self::Fix42,
        Self::Fix43,
        Self::Fix44,
        Self::Fix50,
        Self::Fix50Sp1,
        Self::Fix50Sp2,
    ];

    /// Returns the tag 1128 enumeration value.
    #[must_use]
    pub const fn value(&self) -> &'static str {
        match self {
            Self::Fix27 => "0",
            Self::Fix30 => "1",
            Self::Fix40 => "2",
            Self::Fix41 => "3",
            Self::Fix42 => "4",
            Self::Fix43 => "5",
            Self::Fix44 => "6",
            Self::Fix50 => "7",
            Self::Fix50Sp1 => "8",
            Self::Fix50Sp2 => "9",
        }
    }

    /// Returns the version name, e.g. `FIX.5.0SP1`.
    #[must_use]
    pub const fn begin_string(&self) -> &'static str {
        match self {
            Self::Fix27 => "FIX.2.7",
            Self::Fix30 => "FIX.3.0",
            Self::Fix40 => "FIX.4.0",
            Self::Fix41 => "FIX.4.1",
            Self::Fix42 => "FIX.4.2",
            Self::Fix43 => "FIX.4.3",
            Self::Fix44 => "FIX.4.4",
            Self::Fix50 => "FIX.5.0",
            Self::Fix50Sp1 => "FIX.5.0SP1",
            Self::Fix50Sp2 => "FIX.5.0SP2",
        }
    }

    /// Resolves a version token to an ApplVerID.
    ///
    /// Accepts full version names (`FIX.4.2`, `FIX.5.0SP2`), short forms
    /// (`4.2`, `5.0SP2`) and raw tag 1128 values (`0` through `9`). Matching
    /// ignores case and surrounding whitespace.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnsupportedVersion`] for any other token.
    pub fn resolve(token: &str) -> Result<Self, ConfigError> {
        let normalized = token.trim().to_ascii_uppercase();
        let short = normalized.strip_prefix("FIX.").unwrap_or(&normalized);

        Self::ALL
            .into_iter()
            .find(|id| {
                let name = id.begin_string();
                short == &name[4..] || normalized == id.value()
            })
            .ok_or_else(|| ConfigError::UnsupportedVersion {
                token: token.to_string(),
            })
    }
}

impl fmt::Display for ApplVerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.begin_string())
    }
}

impl FromStr for ApplVerId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}

/// Schema model used by a session, selected by its BeginString.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolFamily {
    /// One schema describes both session and application messages.
    Legacy(Version),
    /// A FIXT transport schema plus per-ApplVerID application schemas.
    Layered,
}

impl ProtocolFamily {
    /// Determines the protocol family of a session BeginString.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnsupportedVersion`] naming the token when it is
    /// not one of `FIX.4.0` through `FIX.4.4` or `FIXT.1.1`.
    pub fn from_begin_string(begin_string: &str) -> Result<Self, ConfigError> {
        match begin_string {
            FIXT_BEGIN_STRING => Ok(Self::Layered),
            "FIX.4.0" => Ok(Self::Legacy(Version::Fix40)),
            "FIX.4.1" => Ok(Self::Legacy(Version::Fix41)),
            "FIX.4.2" => Ok(Self::Legacy(Version::Fix42)),
            "FIX.4.3" => Ok(Self::Legacy(Version::Fix43)),
            "FIX.4.4" => Ok(Self::Legacy(Version::Fix44)),
            other => Err(ConfigError::UnsupportedVersion {
                token: other.to_string(),
            }),
        }
    }

    /// Returns true for the layered FIXT family.
    #[must_use]
    pub const fn is_layered(&self) -> bool {
        matches!(self, Self::Layered)
    }

    /// Returns a short name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Legacy(_) => "legacy",
            Self::Layered => "layered",
        }
    }
}
