//! Schema Registry
//!
//! Maps each format version to its [`Schema`] and, when one exists, the
//! [`VersionCodec`] that knows how to read and write it. Registries are
//! append-only while being built and read-only afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::codec::{SegmentCodec, VersionCodec};
use crate::error::{Result, UpiError};
use crate::schema::Schema;
use crate::version::FormatVersion;

/// A registered version: its schema plus an optional codec strategy
#[derive(Clone)]
pub struct RegistryEntry {
    schema: Schema,
    codec: Option<Arc<dyn VersionCodec>>,
}

impl RegistryEntry {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The codec for this version, if one was registered
    pub fn codec(&self) -> Option<&dyn VersionCodec> {
        self.codec.as_deref()
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("schema", &self.schema)
            .field("codec", &self.codec.as_ref().map(|c| c.name()))
            .finish()
    }
}

/// Immutable, versioned schema registry
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl SchemaRegistry {
    /// Start an empty registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// A registry holding the built-in versions
    pub fn builtin() -> Result<Self> {
        Ok(RegistryBuilder::with_builtin()?.build())
    }

    /// Process-wide registry with the built-in versions
    pub fn global() -> &'static SchemaRegistry {
        static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            // The built-in schema is a compile-time constant; failing here is a bug.
            SchemaRegistry::builtin().expect("built-in UPI schemas are valid")
        })
    }

    /// Look up a registered version
    pub fn entry(&self, version: &str) -> Result<&RegistryEntry> {
        self.entries
            .get(version)
            .ok_or_else(|| UpiError::UnknownVersion(version.to_string()))
    }

    /// Schema for a version, failing with `UnknownVersion` if none is registered
    pub fn schema_for(&self, version: &str) -> Result<&Schema> {
        self.entry(version).map(RegistryEntry::schema)
    }

    pub fn contains(&self, version: &str) -> bool {
        self.entries.contains_key(version)
    }

    /// All registered versions, sorted
    pub fn versions(&self) -> Vec<&FormatVersion> {
        let mut versions: Vec<_> = self.entries.values().map(|e| e.schema.version()).collect();
        versions.sort();
        versions
    }

    /// Get the latest version
    pub fn latest_version(&self) -> Option<&FormatVersion> {
        self.versions().last().copied()
    }
}

/// Collects versions before freezing them into a [`SchemaRegistry`]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: BTreeMap<String, RegistryEntry>,
}

impl RegistryBuilder {
    /// A builder pre-loaded with the built-in versions
    pub fn with_builtin() -> Result<Self> {
        let mut builder = Self::default();
        builder.register(Schema::v2()?, Some(Arc::new(SegmentCodec)))?;
        Ok(builder)
    }

    /// Register a schema and its codec
    ///
    /// A schema registered without a codec can be looked up and encoded with
    /// the segment layout, but decoding it fails with `UnsupportedVersion`.
    pub fn register(
        &mut self,
        schema: Schema,
        codec: Option<Arc<dyn VersionCodec>>,
    ) -> Result<&mut Self> {
        let key = schema.version().as_str().to_string();
        if self.entries.contains_key(&key) {
            return Err(UpiError::VersionAlreadyRegistered(key));
        }

        tracing::debug!(
            version = %key,
            fields = schema.len(),
            codec = codec.as_ref().map(|c| c.name()).unwrap_or("none"),
            "registering UPI schema"
        );
        self.entries.insert(key, RegistryEntry { schema, codec });
        Ok(self)
    }

    /// Shorthand for registering a schema read and written with [`SegmentCodec`]
    pub fn segmented(&mut self, schema: Schema) -> Result<&mut Self> {
        self.register(schema, Some(Arc::new(SegmentCodec)))
    }

    pub fn build(self) -> SchemaRegistry {
        SchemaRegistry {
            entries: self.entries,
        }
    }
}
