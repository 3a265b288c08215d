//! Format version tags

use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, UpiError};
use crate::SEPARATOR;

/// A UPI format version tag (e.g., "2.0")
///
/// The literal tag is what appears inside the URN. The parsed semver value is
/// only used for ordering, so "2.0" and "2.0.0" are distinct tags that sort
/// equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormatVersion {
    tag: String,
    version: Version,
}

impl FormatVersion {
    /// Parse a version tag. Two-part tags are read as `MAJOR.MINOR.0`.
    pub fn parse(tag: &str) -> Result<Self> {
        if tag.is_empty() || tag.contains(SEPARATOR) || tag.chars().any(char::is_whitespace) {
            return Err(UpiError::InvalidVersion(tag.to_string()));
        }

        let version = match tag.matches('.').count() {
            0 => Version::parse(&format!("{}.0.0", tag))?,
            1 => Version::parse(&format!("{}.0", tag))?,
            _ => Version::parse(tag)?,
        };

        Ok(Self {
            tag: tag.to_string(),
            version,
        })
    }

    /// The literal tag as written in the URN
    pub fn as_str(&self) -> &str {
        &self.tag
    }

    /// The semver reading of the tag
    pub fn semver(&self) -> &Version {
        &self.version
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

impl TryFrom<String> for FormatVersion {
    type Error = UpiError;

    fn try_from(tag: String) -> Result<Self> {
        Self::parse(&tag)
    }
}

impl From<FormatVersion> for String {
    fn from(v: FormatVersion) -> Self {
        v.tag
    }
}

impl PartialEq for FormatVersion {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

impl Eq for FormatVersion {}

impl PartialOrd for FormatVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FormatVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.tag.cmp(&other.tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_part_tag() {
        let v = FormatVersion::parse("2.0").unwrap();
        assert_eq!(v.as_str(), "2.0");
        assert_eq!(v.semver(), &Version::new(2, 0, 0));
        assert_eq!(v.to_string(), "2.0");
    }

    #[test]
    fn test_rejects_separator_and_empty() {
        assert!(FormatVersion::parse("").is_err());
        assert!(FormatVersion::parse("2:0").is_err());
        assert!(FormatVersion::parse("two").is_err());
    }

    #[test]
    fn test_ordering() {
        let v2 = FormatVersion::parse("2.0").unwrap();
        let v21 = FormatVersion::parse("2.1").unwrap();
        let v3 = FormatVersion::parse("3.0").unwrap();

        assert!(v2 < v21);
        assert!(v21 < v3);
    }
}
