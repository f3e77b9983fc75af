/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Per-session schema provider.
//!
//! A [`SchemaProvider`] holds the schema documents one session validates
//! against. Legacy sessions (FIX.4.0 through FIX.4.4) use a single document;
//! FIXT.1.1 sessions use a transport document plus one application document
//! per ApplVerID.

use crate::schema::Dictionary;
use crate::version::{ApplVerId, ProtocolFamily, Version};
use fixgate_core::error::LookupError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-session validation switches.
///
/// These live on the provider rather than on the shared documents, so two
/// sessions sharing a document can still validate differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Reject messages whose header, body and trailer fields are interleaved.
    pub check_fields_out_of_order: bool,
    /// Reject fields with empty values.
    pub check_fields_have_values: bool,
    /// Validate user-defined fields (tags 5000 and above).
    pub check_user_defined_fields: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            check_fields_out_of_order: true,
            check_fields_have_values: true,
            check_user_defined_fields: true,
        }
    }
}

/// Schema set of a legacy session.
#[derive(Debug, Clone)]
pub struct LegacySchema {
    version: Version,
    schema: Arc<Dictionary>,
}

impl LegacySchema {
    /// Creates a legacy schema set.
    #[must_use]
    pub fn new(version: Version, schema: Arc<Dictionary>) -> Self {
        Self { version, schema }
    }

    /// Returns the protocol version of the session.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns the single schema document.
    #[must_use]
    pub fn schema(&self) -> &Arc<Dictionary> {
        &self.schema
    }
}

/// Schema set of a FIXT.1.1 session.
#[derive(Debug, Clone)]
pub struct LayeredSchemas {
    transport: Arc<Dictionary>,
    applications: BTreeMap<ApplVerId, Arc<Dictionary>>,
    default_appl_ver_id: Option<ApplVerId>,
}

impl LayeredSchemas {
    /// Creates a layered schema set with no application documents.
    #[must_use]
    pub fn new(transport: Arc<Dictionary>) -> Self {
        Self {
            transport,
            applications: BTreeMap::new(),
            default_appl_ver_id: None,
        }
    }

    /// Registers the application document for `appl_ver_id`.
    #[must_use]
    pub fn with_application(mut self, appl_ver_id: ApplVerId, schema: Arc<Dictionary>) -> Self {
        self.applications.insert(appl_ver_id, schema);
        self
    }

    /// Sets the default ApplVerID.
    #[must_use]
    pub fn with_default_appl_ver_id(mut self, appl_ver_id: ApplVerId) -> Self {
        self.default_appl_ver_id = Some(appl_ver_id);
        self
    }

    /// Returns the transport document.
    #[must_use]
    pub fn transport_schema(&self) -> &Arc<Dictionary> {
        &self.transport
    }

    /// Returns the application document registered for `appl_ver_id`.
    #[must_use]
    pub fn application_schema(&self, appl_ver_id: ApplVerId) -> Option<&Arc<Dictionary>> {
        self.applications.get(&appl_ver_id)
    }

    /// Returns the registered ApplVerIDs in ascending order.
    pub fn appl_ver_ids(&self) -> impl Iterator<Item = ApplVerId> + '_ {
        self.applications.keys().copied()
    }

    /// Returns the default ApplVerID.
    #[must_use]
    pub const fn default_appl_ver_id(&self) -> Option<ApplVerId> {
        self.default_appl_ver_id
    }
}

/// Schema documents used by one session.
#[derive(Debug, Clone)]
pub enum SchemaProvider {
    /// One document for both session and application messages.
    Legacy {
        /// The document set.
        schemas: LegacySchema,
        /// Validation switches.
        validation: ValidationOptions,
    },
    /// Transport document plus per-ApplVerID application documents.
    Layered {
        /// The document set.
        schemas: LayeredSchemas,
        /// Validation switches.
        validation: ValidationOptions,
    },
}

impl SchemaProvider {
    /// Creates a legacy provider.
    #[must_use]
    pub fn legacy(schemas: LegacySchema, validation: ValidationOptions) -> Self {
        Self::Legacy {
            schemas,
            validation,
        }
    }

    /// Creates a layered provider.
    #[must_use]
    pub fn layered(schemas: LayeredSchemas, validation: ValidationOptions) -> Self {
        Self::Layered {
            schemas,
            validation,
        }
    }

    /// Returns the protocol family.
    #[must_use]
    pub fn family(&self) -> ProtocolFamily {
        match self {
            Self::Legacy { schemas, .. } => ProtocolFamily::Legacy(schemas.version()),
            Self::Layered { .. } => ProtocolFamily::Layered,
        }
    }

    /// Returns the single document of a legacy provider.
    ///
    /// # Errors
    /// Returns [`LookupError::WrongMode`] for a layered provider.
    pub fn schema(&self) -> Result<&Arc<Dictionary>, LookupError> {
        match self {
            Self::Legacy { schemas, .. } => Ok(schemas.schema()),
            Self::Layered { .. } => Err(self.wrong_mode("schema")),
        }
    }

    /// Returns the transport document of a layered provider.
    ///
    /// # Errors
    /// Returns [`LookupError::WrongMode`] for a legacy provider.
    pub fn transport_schema(&self) -> Result<&Arc<Dictionary>, LookupError> {
        match self {
            Self::Layered { schemas, .. } => Ok(schemas.transport_schema()),
            Self::Legacy { .. } => Err(self.wrong_mode("transport_schema")),
        }
    }

    /// Returns the application document of a layered provider for
    /// `appl_ver_id`.
    ///
    /// # Errors
    /// Returns [`LookupError::WrongMode`] for a legacy provider and
    /// [`LookupError::UnregisteredVersion`] if no document is registered for
    /// `appl_ver_id`.
    pub fn application_schema(
        &self,
        appl_ver_id: ApplVerId,
    ) -> Result<&Arc<Dictionary>, LookupError> {
        match self {
            Self::Layered { schemas, .. } => schemas.application_schema(appl_ver_id).ok_or_else(
                || LookupError::UnregisteredVersion {
                    appl_ver_id: appl_ver_id.to_string(),
                },
            ),
            Self::Legacy { .. } => Err(self.wrong_mode("application_schema")),
        }
    }

    /// Returns the ApplVerIDs with a registered application document.
    ///
    /// Empty for a legacy provider.
    #[must_use]
    pub fn appl_ver_ids(&self) -> Vec<ApplVerId> {
        match self {
            Self::Legacy { .. } => Vec::new(),
            Self::Layered { schemas, .. } => schemas.appl_ver_ids().collect(),
        }
    }

    /// Returns the default ApplVerID of a layered provider.
    #[must_use]
    pub fn default_appl_ver_id(&self) -> Option<ApplVerId> {
        match self {
            Self::Legacy { .. } => None,
            Self::Layered { schemas, .. } => schemas.default_appl_ver_id(),
        }
    }

    /// Returns the validation switches.
    #[must_use]
    pub const fn validation(&self) -> &ValidationOptions {
        match self {
            Self::Legacy { validation, .. } | Self::Layered { validation, .. } => validation,
        }
    }

    fn wrong_mode(&self, accessor: &'static str) -> LookupError {
        LookupError::WrongMode {
            accessor,
            family: self.family().name(),
        }
    }
}
