//! UPI encode / decode / hash / validate
//!
//! Version dispatch is lookup-and-delegate: the registry maps each version to
//! a [`VersionCodec`], and [`UpiCodec`] forwards to it. Adding a version means
//! registering a schema (and a codec if its layout differs), never touching
//! the existing ones.

pub mod segment;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UpiError};
use crate::hash::{HashAlgorithm, UpiHash};
use crate::record::UpiRecord;
use crate::registry::SchemaRegistry;
use crate::schema::Schema;
use crate::{SEPARATOR, URN_STEM};

pub use segment::{Segment, SegmentCodec};

/// Per-version encode/decode strategy
pub trait VersionCodec: Send + Sync {
    /// Short name used in logs and config (e.g., "segmented")
    fn name(&self) -> &'static str;

    fn encode(&self, schema: &Schema, record: &UpiRecord, options: &CodecOptions) -> Result<String>;

    fn decode(&self, schema: &Schema, upi: &str) -> Result<UpiRecord>;
}

/// Knobs that apply to every version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecOptions {
    /// Refuse to encode values that would decode ambiguously
    #[serde(default)]
    pub strict: bool,
    /// Digest used by [`UpiCodec::hash`]
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
}

/// Codec bound to a registry
#[derive(Debug, Clone, Copy)]
pub struct UpiCodec<'r> {
    registry: &'r SchemaRegistry,
    options: CodecOptions,
}

impl Default for UpiCodec<'static> {
    fn default() -> Self {
        Self::new(SchemaRegistry::global())
    }
}

impl<'r> UpiCodec<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            options: CodecOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Encode a record as a UPI string
    pub fn encode(&self, version: &str, record: &UpiRecord) -> Result<String> {
        let entry = self.registry.entry(version)?;
        let codec = entry.codec().unwrap_or(&SegmentCodec);
        let upi = codec.encode(entry.schema(), record, &self.options)?;
        tracing::trace!(version, codec = codec.name(), %upi, "encoded UPI");
        Ok(upi)
    }

    /// Decode a UPI string back into a record
    ///
    /// Version errors are reported before anything about the input text, so
    /// an unknown version never surfaces as `MalformedInput`.
    pub fn decode(&self, version: &str, upi: &str) -> Result<UpiRecord> {
        let entry = self.registry.entry(version)?;
        let codec = entry
            .codec()
            .ok_or_else(|| UpiError::UnsupportedVersion(version.to_string()))?;

        match codec.decode(entry.schema(), upi) {
            Ok(record) => {
                tracing::trace!(version, codec = codec.name(), fields = record.len(), "decoded UPI");
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(version, error = %e, "rejected UPI");
                Err(e)
            }
        }
    }

    /// Digest-URN for a UPI using the configured algorithm
    pub fn hash(&self, upi: &str, version: &str) -> Result<String> {
        UpiHash::compute(upi, version, self.options.hash_algorithm).map(|h| h.to_string())
    }

    /// True iff `upi` decodes under the version embedded in it
    pub fn validate(&self, upi: &str) -> bool {
        let Some(version) = embedded_version(upi) else {
            tracing::debug!(%upi, "no version after the UPI stem");
            return false;
        };
        match self.decode(version, upi) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(%upi, error = %e, "UPI failed validation");
                false
            }
        }
    }
}

/// The version token right after `urn:reso:upi:`
pub fn embedded_version(upi: &str) -> Option<&str> {
    let rest = upi.strip_prefix(URN_STEM)?.strip_prefix(SEPARATOR)?;
    rest.split(SEPARATOR).next().filter(|v| !v.is_empty())
}

/// Encode with the built-in registry (see [`crate::DEFAULT_VERSION`])
pub fn encode(version: &str, record: &UpiRecord) -> Result<String> {
    UpiCodec::default().encode(version, record)
}

/// Decode with the built-in registry
pub fn decode(version: &str, upi: &str) -> Result<UpiRecord> {
    UpiCodec::default().decode(version, upi)
}

/// SHA3-256 digest-URN of `upi`
pub fn hash(upi: &str, version: &str) -> Result<String> {
    UpiCodec::default().hash(upi, version)
}

/// Check a UPI against the built-in registry
pub fn validate(upi: &str) -> bool {
    UpiCodec::default().validate(upi)
}
