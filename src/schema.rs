//! Schema types and structures
//!
//! A [`Schema`] is the ordered list of [`FieldMapping`]s for one format
//! version. Order is the only thing that lines decoded segments back up with
//! record fields, so a schema is frozen once built.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UpiError};
use crate::version::FormatVersion;
use crate::SEPARATOR;

/// One (record field → URN segment) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Capitalized record field name (e.g., "StateOrProvince")
    pub field: String,
    /// Lowercase token written literally into the URN (e.g., "stateorprovince")
    pub segment: String,
}

impl FieldMapping {
    pub fn new(field: impl Into<String>, segment: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            segment: segment.into(),
        }
    }
}

/// Field mappings for version 2.0, in URN order
pub const V2_FIELDS: [(&str, &str); 8] = [
    ("Country", "country"),
    ("StateOrProvince", "stateorprovince"),
    ("County", "county"),
    ("SubCounty", "subcounty"),
    ("PropertyType", "propertytype"),
    ("SubPropertyType", "subpropertytype"),
    ("ParcelNumber", "parcelnumber"),
    ("SubParcelNumber", "subparcelnumber"),
];

/// The ordered field layout for one format version
#[derive(Debug, Clone)]
pub struct Schema {
    version: FormatVersion,
    mappings: Vec<FieldMapping>,
    /// Matches any `:<segment>:` token, capturing the segment name
    splitter: Regex,
}

impl Schema {
    /// Build a schema, checking that segment names are usable as split points
    pub fn new(version: FormatVersion, mappings: Vec<FieldMapping>) -> Result<Self> {
        let invalid = |reason: String| UpiError::InvalidSchema {
            version: version.to_string(),
            reason,
        };

        if mappings.is_empty() {
            return Err(invalid("schema has no fields".to_string()));
        }

        let mut fields = HashSet::new();
        let mut segments = HashSet::new();
        for m in &mappings {
            if m.field.is_empty() || m.segment.is_empty() {
                return Err(invalid(format!("empty name in mapping {:?}", m)));
            }
            if m.segment.contains(SEPARATOR) {
                return Err(invalid(format!(
                    "segment '{}' contains the separator '{}'",
                    m.segment, SEPARATOR
                )));
            }
            if !fields.insert(m.field.as_str()) {
                return Err(invalid(format!("duplicate field '{}'", m.field)));
            }
            if !segments.insert(m.segment.as_str()) {
                return Err(invalid(format!("duplicate segment '{}'", m.segment)));
            }
        }

        let alternatives = mappings
            .iter()
            .map(|m| regex::escape(&m.segment))
            .collect::<Vec<_>>()
            .join("|");
        let sep = regex::escape(&SEPARATOR.to_string());
        let splitter = Regex::new(&format!("{sep}({alternatives}){sep}"))
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            version,
            mappings,
            splitter,
        })
    }

    /// Build a schema from `(field, segment)` pairs
    pub fn from_pairs(version: &str, pairs: &[(&str, &str)]) -> Result<Self> {
        let mappings = pairs
            .iter()
            .map(|(field, segment)| FieldMapping::new(*field, *segment))
            .collect();
        Self::new(FormatVersion::parse(version)?, mappings)
    }

    /// The built-in 2.0 schema
    pub fn v2() -> Result<Self> {
        Self::from_pairs("2.0", &V2_FIELDS)
    }

    pub fn version(&self) -> &FormatVersion {
        &self.version
    }

    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Look up the segment name for a record field
    pub fn segment_for(&self, field: &str) -> Option<&str> {
        self.mappings
            .iter()
            .find(|m| m.field == field)
            .map(|m| m.segment.as_str())
    }

    /// Pattern matching `:<segment>:` for every segment in this schema
    pub fn splitter(&self) -> &Regex {
        &self.splitter
    }
}
