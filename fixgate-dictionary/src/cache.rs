/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Schema document cache.
//!
//! The cache maps a resolved schema file path to the document built from it,
//! so every session configured with the same path shares one instance. Keys
//! are paths, not file contents: two paths holding identical bytes produce
//! two independent entries. Entries are never evicted.

use crate::parser;
use crate::schema::Dictionary;
use fixgate_core::error::{ConfigError, SchemaError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Source of schema documents.
///
/// Implementations turn a path into a built [`Dictionary`]. The cache calls
/// the loader at most once per distinct path.
pub trait SchemaLoader: Send + Sync {
    /// Builds the document stored at `path`.
    ///
    /// # Errors
    /// Returns a [`SchemaError`] if the document cannot be read or is invalid.
    fn load(&self, path: &Path) -> Result<Dictionary, SchemaError>;
}

/// Loads QuickFIX-format XML schema files from the file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlSchemaLoader;

impl SchemaLoader for XmlSchemaLoader {
    fn load(&self, path: &Path) -> Result<Dictionary, SchemaError> {
        parser::parse_file(path)
    }
}

/// Path-keyed cache of built schema documents.
///
/// `get_or_build` holds the cache lock across the check-then-build sequence,
/// so concurrent requests for one path never produce two instances.
pub struct SchemaCache {
    loader: Box<dyn SchemaLoader>,
    documents: Mutex<HashMap<PathBuf, Arc<Dictionary>>>,
}

impl SchemaCache {
    /// Creates an empty cache that reads XML files.
    #[must_use]
    pub fn new() -> Self {
        Self::with_loader(XmlSchemaLoader)
    }

    /// Creates an empty cache using a custom loader.
    #[must_use]
    pub fn with_loader(loader: impl SchemaLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            documents: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the document for `path`, building it on first use.
    ///
    /// # Errors
    /// Returns [`ConfigError::SchemaLoad`] carrying the path and the loader's
    /// error. A failed build leaves no entry behind.
    pub fn get_or_build(&self, path: &Path) -> Result<Arc<Dictionary>, ConfigError> {
        let mut documents = self.documents.lock();
        if let Some(document) = documents.get(path) {
            return Ok(Arc::clone(document));
        }

        let document = self
            .loader
            .load(path)
            .map(Arc::new)
            .map_err(|source| ConfigError::SchemaLoad {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(
            path = %path.display(),
            version = %document.version,
            fields = document.fields.len(),
            messages = document.messages.len(),
            "schema loaded"
        );
        documents.insert(path.to_path_buf(), Arc::clone(&document));
        Ok(document)
    }

    /// Returns the cached document for `path` without building it.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<Arc<Dictionary>> {
        self.documents.lock().get(path).cloned()
    }

    /// Returns true if `path` has been built.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.documents.lock().contains_key(path)
    }

    /// Returns the number of cached documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    /// Returns true if nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.lock().is_empty()
    }

    /// Returns the cached paths in sorted order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.documents.lock().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCache")
            .field("paths", &self.paths())
            .finish()
    }
}
