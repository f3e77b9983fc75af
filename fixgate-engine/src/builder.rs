/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session factory builder for fluent configuration.

use crate::factory::{CanonicalSchemas, SessionFactory};
use fixgate_dictionary::{ApplVerId, SchemaCache, SchemaLoader};
use fixgate_session::{Application, LogFactory};
use fixgate_store::MessageStoreFactory;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for configuring a [`SessionFactory`].
pub struct SessionFactoryBuilder {
    application: Arc<dyn Application>,
    store_factory: Arc<dyn MessageStoreFactory>,
    log_factory: Option<Arc<dyn LogFactory>>,
    cache: SchemaCache,
    canonical: CanonicalSchemas,
}

impl SessionFactoryBuilder {
    /// Creates a builder with the mandatory collaborators.
    #[must_use]
    pub fn new(
        application: Arc<dyn Application>,
        store_factory: Arc<dyn MessageStoreFactory>,
    ) -> Self {
        Self {
            application,
            store_factory,
            log_factory: None,
            cache: SchemaCache::new(),
            canonical: CanonicalSchemas::new(),
        }
    }

    /// Creates one diagnostic log per session from `log_factory`.
    #[must_use]
    pub fn with_log_factory(mut self, log_factory: Arc<dyn LogFactory>) -> Self {
        self.log_factory = Some(log_factory);
        self
    }

    /// Replaces the schema loader used by the cache.
    #[must_use]
    pub fn with_schema_loader(mut self, loader: impl SchemaLoader + 'static) -> Self {
        self.cache = SchemaCache::with_loader(loader);
        self
    }

    /// Sets the directory holding the canonical schema files.
    #[must_use]
    pub fn with_schema_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.canonical = self.canonical.with_directory(directory);
        self
    }

    /// Maps `appl_ver_id` to a different canonical file name.
    #[must_use]
    pub fn with_canonical_schema(
        mut self,
        appl_ver_id: ApplVerId,
        file: impl Into<String>,
    ) -> Self {
        self.canonical = self.canonical.with_file(appl_ver_id, file);
        self
    }

    /// Replaces the whole canonical schema mapping.
    #[must_use]
    pub fn with_canonical_schemas(mut self, canonical: CanonicalSchemas) -> Self {
        self.canonical = canonical;
        self
    }

    /// Returns the canonical schema mapping.
    #[must_use]
    pub fn canonical_schemas(&self) -> &CanonicalSchemas {
        &self.canonical
    }

    /// Returns whether a log factory is configured.
    #[must_use]
    pub fn has_log_factory(&self) -> bool {
        self.log_factory.is_some()
    }

    /// Builds the factory.
    #[must_use]
    pub fn build(self) -> SessionFactory {
        SessionFactory::from_parts(
            self.application,
            self.store_factory,
            self.log_factory,
            self.cache,
            self.canonical,
        )
    }
}

impl fmt::Debug for SessionFactoryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionFactoryBuilder")
            .field("canonical", &self.canonical)
            .field("has_log_factory", &self.has_log_factory())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixgate_core::SessionId;
    use fixgate_core::error::SchemaError;
    use fixgate_dictionary::{Dictionary, Version};
    use fixgate_session::{NoOpApplication, Settings, TracingLogFactory};
    use fixgate_store::MemoryStoreFactory;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticLoader {
        calls: Arc<AtomicUsize>,
    }

    impl SchemaLoader for StaticLoader {
        fn load(&self, path: &Path) -> Result<Dictionary, SchemaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match path.file_name().and_then(|n| n.to_str()) {
                Some("FIXT11.xml") => Ok(Dictionary::new(Version::Fixt11)),
                Some("FIX50SP2.xml") => Ok(Dictionary::new(Version::Fix50Sp2)),
                Some("custom44.xml") => Ok(Dictionary::new(Version::Fix44)),
                _ => Err(SchemaError::Io("not found".to_string())),
            }
        }
    }

    fn builder() -> SessionFactoryBuilder {
        SessionFactoryBuilder::new(Arc::new(NoOpApplication), Arc::new(MemoryStoreFactory::new()))
    }

    #[test]
    fn test_builder_default() {
        let builder = builder();
        assert!(!builder.has_log_factory());
        assert_eq!(builder.canonical_schemas(), &CanonicalSchemas::new());
        assert!(builder.build().cache().is_empty());
    }

    #[test]
    fn test_builder_options() {
        let builder = builder()
            .with_log_factory(Arc::new(TracingLogFactory))
            .with_schema_directory("/opt/fix/spec")
            .with_canonical_schema(ApplVerId::Fix44, "custom44.xml");

        assert!(builder.has_log_factory());
        let factory = builder.build();
        assert_eq!(
            factory.canonical_schemas().path(ApplVerId::Fix44),
            Some(PathBuf::from("/opt/fix/spec/custom44.xml"))
        );
        assert_eq!(
            factory.canonical_schemas().path(ApplVerId::Fix50Sp2),
            Some(PathBuf::from("/opt/fix/spec/FIX50SP2.xml"))
        );
    }

    #[test]
    fn test_builder_custom_loader_and_canonical_file() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factory = builder()
            .with_schema_loader(StaticLoader {
                calls: Arc::clone(&calls),
            })
            .with_canonical_schemas(CanonicalSchemas::new().with_directory("spec"))
            .with_canonical_schema(ApplVerId::Fix44, "custom44.xml")
            .build();

        let settings = Settings::new()
            .with("ConnectionType", "acceptor")
            .with("TransportDataDictionary", "spec/FIXT11.xml")
            .with("DefaultApplVerID", "FIX.4.4");
        let first = SessionId::new("FIXT.1.1", "A", "B").unwrap();
        let second = SessionId::new("FIXT.1.1", "C", "D").unwrap();

        let session = factory.create(&first, &settings).unwrap();
        factory.create(&second, &settings).unwrap();

        assert_eq!(
            session
                .schemas()
                .application_schema(ApplVerId::Fix44)
                .unwrap()
                .version,
            Version::Fix44
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(factory.cache().contains(Path::new("spec/custom44.xml")));
    }
}
