//! Digest-URNs for UPI strings

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sha3::{Digest, Sha3_256};

use crate::error::{Result, UpiError};
use crate::{SEPARATOR, URN_STEM};

/// Suffix joining the algorithm label in a digest-URN (e.g., "sha3-256-hash")
const HASH_SUFFIX: &str = "-hash";

/// Digest algorithm used for UPI hashes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "sha3-256")]
    Sha3_256,
    #[serde(rename = "sha256")]
    Sha256,
}

impl HashAlgorithm {
    /// Label used inside the digest-URN
    pub fn label(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha3_256 => "sha3-256",
            HashAlgorithm::Sha256 => "sha256",
        }
    }

    /// `<label>-hash`
    pub fn component(&self) -> String {
        format!("{}{}", self.label(), HASH_SUFFIX)
    }

    /// Lowercase hex digest of raw bytes
    pub fn hex_digest(&self, data: &[u8]) -> String {
        match self {
            HashAlgorithm::Sha3_256 => format!("{:x}", Sha3_256::digest(data)),
            HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(data)),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HashAlgorithm {
    type Err = UpiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sha3-256" => Ok(HashAlgorithm::Sha3_256),
            "sha256" => Ok(HashAlgorithm::Sha256),
            other => Err(UpiError::InvalidInput(format!("unknown hash algorithm '{}'", other))),
        }
    }
}

/// `urn:reso:upi:<version>:<algorithm>-hash:<hex digest>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpiHash {
    version: String,
    algorithm: HashAlgorithm,
    digest: String,
}

impl UpiHash {
    /// Hash the raw bytes of `upi`
    ///
    /// Fails with `InvalidInput` when `upi` is empty or does not start with
    /// the UPI stem.
    pub fn compute(upi: &str, version: &str, algorithm: HashAlgorithm) -> Result<Self> {
        if upi.is_empty() || !upi.starts_with(URN_STEM) {
            return Err(UpiError::InvalidInput(upi.to_string()));
        }

        let digest = algorithm.hex_digest(upi.as_bytes());
        tracing::debug!(version, %algorithm, %digest, "hashed UPI");

        Ok(Self {
            version: version.to_string(),
            algorithm,
            digest,
        })
    }

    /// Read a digest-URN back into its parts
    pub fn parse(s: &str) -> Result<Self> {
        let malformed = |reason: &str| UpiError::malformed(s, reason);

        let rest = s
            .strip_prefix(URN_STEM)
            .and_then(|r| r.strip_prefix(SEPARATOR))
            .ok_or_else(|| malformed("missing UPI stem"))?;

        let mut parts = rest.splitn(3, SEPARATOR);
        let (Some(version), Some(component), Some(digest)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed("expected <version>:<algorithm>-hash:<digest>"));
        };

        let algorithm: HashAlgorithm = component
            .strip_suffix(HASH_SUFFIX)
            .ok_or_else(|| malformed("missing '-hash' component"))?
            .parse()?;

        let expected_len = algorithm.hex_digest(b"").len();
        let is_hex = digest.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if version.is_empty() || digest.len() != expected_len || !is_hex {
            return Err(malformed("bad version or digest"));
        }

        Ok(Self {
            version: version.to_string(),
            algorithm,
            digest: digest.to_string(),
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hex digest
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Verify that `upi` hashes to this value
    pub fn verify(&self, upi: &str) -> bool {
        match Self::compute(upi, &self.version, self.algorithm) {
            Ok(computed) => computed.digest == self.digest,
            Err(_) => false,
        }
    }
}

impl fmt::Display for UpiHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{stem}{sep}{version}{sep}{component}{sep}{digest}",
            stem = URN_STEM,
            sep = SEPARATOR,
            version = self.version,
            component = self.algorithm.component(),
            digest = self.digest,
        )
    }
}

impl FromStr for UpiHash {
    type Err = UpiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPI: &str = "urn:reso:upi:2.0:country:US:stateorprovince:CA:county:06037:subcounty::propertytype:Residential:subpropertytype::parcelnumber: [abc] 1-2 ::   3:456 :subparcelnumber:";

    #[test]
    fn test_hash_consistency() {
        let h1 = UpiHash::compute(UPI, "2.0", HashAlgorithm::Sha3_256).unwrap();
        let h2 = UpiHash::compute(UPI, "2.0", HashAlgorithm::Sha3_256).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.digest().len(), 64);
    }

    #[test]
    fn test_hash_different_content() {
        let h1 = UpiHash::compute(UPI, "2.0", HashAlgorithm::Sha3_256).unwrap();
        let changed = UPI.replace("06037", "06038");
        let h2 = UpiHash::compute(&changed, "2.0", HashAlgorithm::Sha3_256).unwrap();
        assert_ne!(h1.digest(), h2.digest());
    }

    #[test]
    fn test_sha256_known_answer() {
        let h = UpiHash::compute(UPI, "2.0", HashAlgorithm::Sha256).unwrap();
        assert_eq!(
            h.digest(),
            "6d678518d22c2eaaa91094f659c027359ff7a2fad13e73c43be8fd24eede297e"
        );
        assert!(h.to_string().starts_with("urn:reso:upi:2.0:sha256-hash:"));
    }

    #[test]
    fn test_rejects_empty_or_foreign_input() {
        for bad in ["", "not-a-upi", "urn:other:2.0"] {
            let err = UpiHash::compute(bad, "2.0", HashAlgorithm::Sha3_256).unwrap_err();
            assert!(matches!(err, UpiError::InvalidInput(_)), "{:?}", bad);
        }
    }

    #[test]
    fn test_parse_display() {
        let h = UpiHash::compute(UPI, "2.0", HashAlgorithm::Sha3_256).unwrap();
        let parsed: UpiHash = h.to_string().parse().unwrap();
        assert_eq!(parsed, h);
        assert_eq!(parsed.algorithm(), HashAlgorithm::Sha3_256);
        assert_eq!(parsed.version(), "2.0");
    }

    #[test]
    fn test_parse_rejects_bad_digest() {
        assert!(UpiHash::parse("urn:reso:upi:2.0:sha3-256-hash:xyz").is_err());
        assert!(UpiHash::parse("urn:reso:upi:2.0:md5-hash:00").is_err());
        assert!(UpiHash::parse("urn:reso:upi:2.0:sha3-256").is_err());
    }

    #[test]
    fn test_verification() {
        let h = UpiHash::compute(UPI, "2.0", HashAlgorithm::Sha3_256).unwrap();
        assert!(h.verify(UPI));
        assert!(!h.verify("urn:reso:upi:2.0:different"));
        assert!(!h.verify(""));
    }
}
