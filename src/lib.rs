//! RESO Uniform Parcel Identifier codec
//!
//! Encodes a flat parcel record as a colon-delimited URN, decodes it back,
//! and derives a versioned digest-URN from the encoded string.
//!
//! ## Wire format (version 2.0)
//!
//! ```text
//! urn:reso:upi:2.0:country:<v>:stateorprovince:<v>:county:<v>:subcounty:<v>:
//!     propertytype:<v>:subpropertytype:<v>:parcelnumber:<v>:subparcelnumber:<v>
//! ```
//!
//! Values are written raw. A value may contain `:`; decoding splits only on
//! whole `:<segment>:` tokens, so a value that spells out one of those tokens
//! is ambiguous. Enable [`CodecOptions::strict`] to reject such values at
//! encode time.
//!
//! ## Example
//!
//! ```rust
//! use reso_upi::{decode, encode, hash, validate, UpiRecord, DEFAULT_VERSION};
//!
//! let record = UpiRecord::new()
//!     .with("Country", Some("US"))
//!     .with("StateOrProvince", Some("CA"))
//!     .with("County", Some("06037"))
//!     .with("SubCounty", None)
//!     .with("PropertyType", Some("Residential"))
//!     .with("SubPropertyType", None)
//!     .with("ParcelNumber", Some("123-456"))
//!     .with("SubParcelNumber", None);
//!
//! let upi = encode(DEFAULT_VERSION, &record).unwrap();
//! assert!(validate(&upi));
//!
//! let decoded = decode(DEFAULT_VERSION, &upi).unwrap();
//! assert_eq!(decoded.get("ParcelNumber"), Some("123-456"));
//!
//! let digest = hash(&upi, DEFAULT_VERSION).unwrap();
//! assert!(digest.starts_with("urn:reso:upi:2.0:sha3-256-hash:"));
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod hash;
pub mod record;
pub mod registry;
pub mod schema;
pub mod version;

pub use codec::{decode, encode, hash, validate, CodecOptions, SegmentCodec, UpiCodec, VersionCodec};
pub use config::UpiConfig;
pub use error::{Result, UpiError};
pub use hash::{HashAlgorithm, UpiHash};
pub use record::UpiRecord;
pub use registry::{RegistryBuilder, SchemaRegistry};
pub use schema::{FieldMapping, Schema};
pub use version::FormatVersion;

/// Leading URN components shared by every UPI
pub const URN_STEM: &str = "urn:reso:upi";

/// Token separator
pub const SEPARATOR: char = ':';

/// Version used when callers have no reason to pick another
pub const DEFAULT_VERSION: &str = "2.0";

/// Algorithm component of the default digest-URN
pub const HASH_COMPONENT: &str = "sha3-256-hash";

/// Record key holding the context metadata of a decoded UPI
pub const CONTEXT_KEY: &str = "@reso.context";
