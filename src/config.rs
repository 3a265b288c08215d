//! Configuration for the UPI codec
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (upi.toml)
//! - Environment variables (UPI__*)
//!
//! ## Example config file (upi.toml):
//! ```toml
//! [codec]
//! default_version = "2.0"
//! hash_algorithm = "sha3-256"
//! strict = false
//!
//! [[schemas]]
//! version = "3.0"
//! codec = "segmented"
//! fields = [
//!     { field = "Country", segment = "country" },
//!     { field = "ParcelNumber", segment = "parcelnumber" },
//! ]
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::codec::{CodecOptions, SegmentCodec, VersionCodec};
use crate::error::Result;
use crate::hash::HashAlgorithm;
use crate::registry::{RegistryBuilder, SchemaRegistry};
use crate::schema::{FieldMapping, Schema};
use crate::version::FormatVersion;
use crate::DEFAULT_VERSION;

/// Main configuration for the codec
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpiConfig {
    /// Codec settings
    #[serde(default)]
    pub codec: CodecConfig,

    /// Extra versions registered on top of the built-in ones
    #[serde(default)]
    pub schemas: Vec<SchemaConfig>,
}

/// Codec configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Version used by callers that do not pick one
    #[serde(default = "default_version")]
    pub default_version: String,

    /// Digest for hashes
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,

    /// Reject ambiguous values on encode
    #[serde(default)]
    pub strict: bool,
}

/// One extra schema version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub version: String,

    /// Codec name; anything other than "segmented" registers the schema
    /// without a decoder
    #[serde(default = "default_codec")]
    pub codec: String,

    /// Field mappings in URN order
    pub fields: Vec<FieldMapping>,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_codec() -> String {
    SegmentCodec.name().to_string()
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            default_version: default_version(),
            hash_algorithm: HashAlgorithm::default(),
            strict: false,
        }
    }
}

impl SchemaConfig {
    fn codec(&self) -> Option<Arc<dyn VersionCodec>> {
        if self.codec == SegmentCodec.name() {
            Some(Arc::new(SegmentCodec))
        } else {
            tracing::warn!(
                version = %self.version,
                codec = %self.codec,
                "unknown codec; schema will not be decodable"
            );
            None
        }
    }
}

impl UpiConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = ["upi.toml", ".upi.toml", "config/upi.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("org", "reso", "upi") {
            let xdg_config = config_dir.config_dir().join("upi.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (UPI__*)
        builder = builder.add_source(
            Environment::with_prefix("UPI")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Codec options from the `[codec]` section
    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions {
            strict: self.codec.strict,
            hash_algorithm: self.codec.hash_algorithm,
        }
    }

    /// The built-in registry extended with the configured schemas
    pub fn build_registry(&self) -> Result<SchemaRegistry> {
        let mut builder = RegistryBuilder::with_builtin()?;
        for entry in &self.schemas {
            let schema = Schema::new(FormatVersion::parse(&entry.version)?, entry.fields.clone())?;
            builder.register(schema, entry.codec())?;
        }
        let registry = builder.build();

        if !registry.contains(&self.codec.default_version) {
            tracing::warn!(
                version = %self.codec.default_version,
                "default version is not registered"
            );
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::UpiCodec;
    use crate::record::UpiRecord;
    use crate::UpiError;
    use std::io::Write;

    const EXTRA: &str = r#"
[codec]
hash_algorithm = "sha256"
strict = true

[[schemas]]
version = "3.0"
fields = [
    { field = "Country", segment = "country" },
    { field = "ParcelNumber", segment = "parcelnumber" },
]

[[schemas]]
version = "4.0"
codec = "binary"
fields = [{ field = "Country", segment = "country" }]
"#;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = UpiConfig::default();
        assert_eq!(config.codec.default_version, "2.0");
        assert_eq!(config.codec.hash_algorithm, HashAlgorithm::Sha3_256);
        assert!(!config.codec.strict);
        assert!(config.schemas.is_empty());
    }

    #[test]
    fn test_serialize_config() {
        let config = UpiConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[codec]"));
        assert!(toml_str.contains("sha3-256"));
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(EXTRA);
        let config = UpiConfig::load_from(file.path().to_str()).unwrap();

        assert_eq!(config.codec_options().hash_algorithm, HashAlgorithm::Sha256);
        assert!(config.codec_options().strict);
        assert_eq!(config.schemas.len(), 2);
        assert_eq!(config.schemas[0].codec, "segmented");
    }

    #[test]
    fn test_build_registry_from_file() {
        let file = write_config(EXTRA);
        let config = UpiConfig::load_from(file.path().to_str()).unwrap();
        let registry = config.build_registry().unwrap();
        let codec = UpiCodec::new(&registry).with_options(config.codec_options());

        let record = UpiRecord::new()
            .with("Country", Some("NZ"))
            .with("ParcelNumber", Some("77"));
        let upi = codec.encode("3.0", &record).unwrap();
        assert_eq!(upi, "urn:reso:upi:3.0:country:NZ:parcelnumber:77");
        assert_eq!(codec.decode("3.0", &upi).unwrap().get("ParcelNumber"), Some("77"));

        let err = codec.decode("4.0", "urn:reso:upi:4.0:country:NZ").unwrap_err();
        assert!(matches!(err, UpiError::UnsupportedVersion(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upi.toml");
        let path = path.to_str().unwrap();

        let mut config = UpiConfig::default();
        config.codec.strict = true;
        config.schemas.push(SchemaConfig {
            version: "3.0".to_string(),
            codec: default_codec(),
            fields: vec![FieldMapping::new("Country", "country")],
        });
        config.save(path).unwrap();

        let reloaded = UpiConfig::load_from(Some(path)).unwrap();
        assert!(reloaded.codec.strict);
        assert_eq!(reloaded.schemas[0].fields, config.schemas[0].fields);
    }

    #[test]
    fn test_invalid_schema_in_config() {
        let config = UpiConfig {
            schemas: vec![SchemaConfig {
                version: "3.0".to_string(),
                codec: default_codec(),
                fields: vec![FieldMapping::new("A", "a"), FieldMapping::new("B", "a")],
            }],
            ..UpiConfig::default()
        };
        assert!(matches!(config.build_registry(), Err(UpiError::InvalidSchema { .. })));
    }
}
