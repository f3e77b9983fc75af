/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session factory.
//!
//! The factory turns a session identity plus its settings into a ready
//! [`Session`]. It resolves the schema files the settings name, shares every
//! schema document through one path-keyed cache, and wires the session to the
//! application, persistence and log collaborators it was built with.
//!
//! Legacy sessions (FIX.4.0 through FIX.4.4) read one schema from
//! `DataDictionary`. FIXT.1.1 sessions read the transport schema from
//! `TransportDataDictionary` and application schemas from
//! `AppDataDictionary`, `AppDataDictionary.<version>` and `DefaultApplVerID`.

use crate::builder::SessionFactoryBuilder;
use fixgate_core::SessionId;
use fixgate_core::error::ConfigError;
use fixgate_dictionary::{
    ApplVerId, Dictionary, LayeredSchemas, LegacySchema, ProtocolFamily, SchemaCache,
    SchemaProvider, Version,
};
use fixgate_session::settings::keys;
use fixgate_session::{Application, LogFactory, Session, SessionConfig, SessionSettings, Settings};
use fixgate_store::MessageStoreFactory;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Schema files used when no explicit application schema is configured.
///
/// Each ApplVerID maps to a file name inside one schema directory. The
/// default names are `FIX40.xml` through `FIX44.xml`, `FIX50.xml`,
/// `FIX50SP1.xml` and `FIX50SP2.xml`; the default directory is the current
/// working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSchemas {
    directory: PathBuf,
    files: BTreeMap<ApplVerId, String>,
}

impl CanonicalSchemas {
    /// Creates the default mapping.
    #[must_use]
    pub fn new() -> Self {
        let files = [
            (ApplVerId::Fix40, "FIX40.xml"),
            (ApplVerId::Fix41, "FIX41.xml"),
            (ApplVerId::Fix42, "FIX42.xml"),
            (ApplVerId::Fix43, "FIX43.xml"),
            (ApplVerId::Fix44, "FIX44.xml"),
            (ApplVerId::Fix50, "FIX50.xml"),
            (ApplVerId::Fix50Sp1, "FIX50SP1.xml"),
            (ApplVerId::Fix50Sp2, "FIX50SP2.xml"),
        ]
        .into_iter()
        .map(|(id, file)| (id, file.to_string()))
        .collect();
        Self {
            directory: PathBuf::new(),
            files,
        }
    }

    /// Sets the directory the file names are resolved against.
    #[must_use]
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Sets the file name used for `appl_ver_id`.
    #[must_use]
    pub fn with_file(mut self, appl_ver_id: ApplVerId, file: impl Into<String>) -> Self {
        self.files.insert(appl_ver_id, file.into());
        self
    }

    /// Returns the schema directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the file name mapped to `appl_ver_id`.
    #[must_use]
    pub fn file_name(&self, appl_ver_id: ApplVerId) -> Option<&str> {
        self.files.get(&appl_ver_id).map(String::as_str)
    }

    /// Returns the full path of the schema for `appl_ver_id`.
    #[must_use]
    pub fn path(&self, appl_ver_id: ApplVerId) -> Option<PathBuf> {
        self.file_name(appl_ver_id)
            .map(|file| self.directory.join(file))
    }
}

impl Default for CanonicalSchemas {
    fn default() -> Self {
        Self::new()
    }
}

/// Where an application schema path came from.
#[derive(Debug, Clone)]
struct AppSchemaSource {
    key: String,
    path: PathBuf,
}

/// Creates configured sessions.
///
/// `create` takes `&self`; the schema cache is the only mutable state and is
/// internally locked, so one factory can be shared across threads.
pub struct SessionFactory {
    application: Arc<dyn Application>,
    store_factory: Arc<dyn MessageStoreFactory>,
    log_factory: Option<Arc<dyn LogFactory>>,
    cache: SchemaCache,
    canonical: CanonicalSchemas,
}

impl SessionFactory {
    /// Creates a factory with the default schema cache and canonical files.
    #[must_use]
    pub fn new(
        application: Arc<dyn Application>,
        store_factory: Arc<dyn MessageStoreFactory>,
    ) -> Self {
        Self::builder(application, store_factory).build()
    }

    /// Starts building a factory.
    #[must_use]
    pub fn builder(
        application: Arc<dyn Application>,
        store_factory: Arc<dyn MessageStoreFactory>,
    ) -> SessionFactoryBuilder {
        SessionFactoryBuilder::new(application, store_factory)
    }

    pub(crate) fn from_parts(
        application: Arc<dyn Application>,
        store_factory: Arc<dyn MessageStoreFactory>,
        log_factory: Option<Arc<dyn LogFactory>>,
        cache: SchemaCache,
        canonical: CanonicalSchemas,
    ) -> Self {
        Self {
            application,
            store_factory,
            log_factory,
            cache,
            canonical,
        }
    }

    /// Creates the session for `session_id` from `settings`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Session`] naming `session_id`, wrapping the
    /// cause: an unsupported BeginString, a missing or invalid setting, or a
    /// schema file that cannot be loaded.
    pub fn create(
        &self,
        session_id: &SessionId,
        settings: &Settings,
    ) -> Result<Session, ConfigError> {
        self.assemble(session_id, settings)
            .map_err(|e| e.for_session(session_id))
    }

    /// Creates every session of a settings file, in file order.
    ///
    /// # Errors
    /// Returns the first error of [`SessionFactory::create`].
    pub fn create_all(&self, sessions: &SessionSettings) -> Result<Vec<Session>, ConfigError> {
        sessions
            .iter()
            .map(|(id, settings)| self.create(id, settings))
            .collect()
    }

    /// Returns the schema cache.
    #[must_use]
    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Returns the canonical schema mapping.
    #[must_use]
    pub fn canonical_schemas(&self) -> &CanonicalSchemas {
        &self.canonical
    }

    fn assemble(
        &self,
        session_id: &SessionId,
        settings: &Settings,
    ) -> Result<Session, ConfigError> {
        let family = ProtocolFamily::from_begin_string(session_id.begin_string())?;

        // Schema keys are checked before the remaining session settings.
        let (schemas, config) = match family {
            ProtocolFamily::Legacy(version) => {
                let schemas = self.legacy_schemas(version, settings)?;
                let config = SessionConfig::from_settings(settings)?;
                (SchemaProvider::legacy(schemas, config.validation), config)
            }
            ProtocolFamily::Layered => {
                let default_appl_ver_id = settings
                    .get(keys::DEFAULT_APPL_VER_ID)
                    .map(ApplVerId::resolve)
                    .transpose()?;
                let schemas = self.layered_schemas(settings, default_appl_ver_id)?;
                let config = SessionConfig::from_settings(settings)?;
                (SchemaProvider::layered(schemas, config.validation), config)
            }
        };

        let mut session = Session::new(
            session_id.clone(),
            schemas,
            config,
            Arc::clone(&self.application),
            Arc::clone(&self.store_factory),
        );
        if let Some(log_factory) = &self.log_factory {
            session = session.with_log(log_factory.create(session_id)?);
        }

        debug!(
            session = %session_id,
            family = family.name(),
            appl_ver_ids = ?session.schemas().appl_ver_ids(),
            "session created"
        );
        Ok(session)
    }

    fn legacy_schemas(
        &self,
        version: Version,
        settings: &Settings,
    ) -> Result<LegacySchema, ConfigError> {
        let path = settings.get_string(keys::DATA_DICTIONARY)?;
        let schema = self.load(keys::DATA_DICTIONARY, Path::new(path), false)?;
        Ok(LegacySchema::new(version, schema))
    }

    fn layered_schemas(
        &self,
        settings: &Settings,
        default_appl_ver_id: Option<ApplVerId>,
    ) -> Result<LayeredSchemas, ConfigError> {
        let transport_path = settings.get_string(keys::TRANSPORT_DATA_DICTIONARY)?;
        let transport = self.load(
            keys::TRANSPORT_DATA_DICTIONARY,
            Path::new(transport_path),
            true,
        )?;

        let sources = self.application_sources(settings, default_appl_ver_id)?;
        let mut schemas = LayeredSchemas::new(transport);
        if let Some(default) = default_appl_ver_id {
            schemas = schemas.with_default_appl_ver_id(default);
        }
        for (appl_ver_id, source) in sources {
            let schema = self.load(&source.key, &source.path, false)?;
            schemas = schemas.with_application(appl_ver_id, schema);
        }
        Ok(schemas)
    }

    /// Collects the application schema path of every configured ApplVerID.
    fn application_sources(
        &self,
        settings: &Settings,
        default_appl_ver_id: Option<ApplVerId>,
    ) -> Result<BTreeMap<ApplVerId, AppSchemaSource>, ConfigError> {
        let prefix = keys::APP_DATA_DICTIONARY;
        let mut sources: BTreeMap<ApplVerId, AppSchemaSource> = BTreeMap::new();
        let mut unqualified: Option<AppSchemaSource> = None;

        for (key, value) in settings.iter() {
            let Some(rest) = strip_prefix_ignore_case(key, prefix) else {
                continue;
            };
            let source = AppSchemaSource {
                key: key.to_string(),
                path: PathBuf::from(value),
            };
            if rest.is_empty() {
                unqualified = Some(source);
                continue;
            }
            let Some(token) = rest.strip_prefix('.') else {
                return Err(ConfigError::invalid(
                    key,
                    value,
                    format!("expected {prefix} or {prefix}.<version>"),
                ));
            };
            let appl_ver_id = ApplVerId::resolve(token)?;
            insert_source(&mut sources, appl_ver_id, source)?;
        }

        if let Some(source) = unqualified {
            let default = default_appl_ver_id
                .ok_or_else(|| ConfigError::missing(keys::DEFAULT_APPL_VER_ID))?;
            insert_source(&mut sources, default, source)?;
        }

        match default_appl_ver_id {
            Some(default) if !sources.contains_key(&default) => {
                let path = self.canonical.path(default).ok_or_else(|| {
                    ConfigError::invalid(
                        keys::DEFAULT_APPL_VER_ID,
                        default.to_string(),
                        "no canonical schema file for this version",
                    )
                })?;
                sources.insert(
                    default,
                    AppSchemaSource {
                        key: keys::DEFAULT_APPL_VER_ID.to_string(),
                        path,
                    },
                );
            }
            Some(_) => {}
            None if sources.is_empty() => {
                return Err(ConfigError::missing(keys::DEFAULT_APPL_VER_ID));
            }
            None => {}
        }
        Ok(sources)
    }

    /// Loads a schema through the cache and checks its protocol family.
    fn load(
        &self,
        key: &str,
        path: &Path,
        transport: bool,
    ) -> Result<Arc<Dictionary>, ConfigError> {
        let schema = self.cache.get_or_build(path)?;
        if schema.is_transport() != transport {
            let expected = if transport {
                "expected a FIXT transport schema"
            } else {
                "expected a FIX application schema, found a FIXT transport schema"
            };
            return Err(ConfigError::invalid(key, path.display().to_string(), expected));
        }
        Ok(schema)
    }
}

fn strip_prefix_ignore_case<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    let head = key.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &key[prefix.len()..])
}

fn insert_source(
    sources: &mut BTreeMap<ApplVerId, AppSchemaSource>,
    appl_ver_id: ApplVerId,
    source: AppSchemaSource,
) -> Result<(), ConfigError> {
    if let Some(existing) = sources.get(&appl_ver_id) {
        if existing.path != source.path {
            return Err(ConfigError::invalid(
                source.key,
                source.path.display().to_string(),
                format!(
                    "conflicts with {}={} for {appl_ver_id}",
                    existing.key,
                    existing.path.display()
                ),
            ));
        }
        return Ok(());
    }
    sources.insert(appl_ver_id, source);
    Ok(())
}

impl fmt::Debug for SessionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionFactory")
            .field("cache", &self.cache)
            .field("canonical", &self.canonical)
            .field("has_log_factory", &self.log_factory.is_some())
            .finish_non_exhaustive()
    }
}
