use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static VERSION_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\.(\d+)(?:\.(\d+))?$").expect("version pattern is valid")
});

/// A dotted QTI release number, e.g. `2.2.3`. A missing patch component reads as 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SchemaVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// The schema generation this release belongs to.
    pub fn family(&self) -> Result<SchemaFamily, SchemaVersionError> {
        SchemaFamily::resolve(&format!("{}.{}", self.major, self.minor))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = SchemaVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let caps = VERSION_FORMAT
            .captures(trimmed)
            .ok_or_else(|| SchemaVersionError::InvalidFormat(s.to_string()))?;

        let component = |idx: usize| -> Result<u32, SchemaVersionError> {
            match caps.get(idx) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| SchemaVersionError::InvalidFormat(s.to_string())),
                None => Ok(0),
            }
        };

        Ok(SchemaVersion::new(component(1)?, component(2)?, component(3)?))
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.major.cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
    }
}

/// A schema generation. Adjacent minor releases (2.1 and 2.2) share one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SchemaFamily {
    #[serde(rename = "1.2")]
    Qti12,
    #[serde(rename = "2.1")]
    Qti21,
    #[serde(rename = "3.0")]
    Qti30,
}

impl SchemaFamily {
    pub const ALL: [SchemaFamily; 3] = [SchemaFamily::Qti12, SchemaFamily::Qti21, SchemaFamily::Qti30];

    /// Resolve a free-form version string by prefix.
    ///
    /// Whitespace is trimmed and patch suffixes are tolerated, so `" 2.2.3 "`
    /// resolves to [`SchemaFamily::Qti21`].
    pub fn resolve(version: &str) -> Result<Self, SchemaVersionError> {
        let trimmed = version.trim();
        if trimmed.starts_with("1.2") {
            Ok(SchemaFamily::Qti12)
        } else if trimmed.starts_with("2.1") || trimmed.starts_with("2.2") {
            Ok(SchemaFamily::Qti21)
        } else if trimmed.starts_with("3.0") {
            Ok(SchemaFamily::Qti30)
        } else {
            Err(SchemaVersionError::Unsupported(version.to_string()))
        }
    }

    /// Version string written into documents of this family.
    pub fn canonical_version(&self) -> &'static str {
        match self {
            SchemaFamily::Qti12 => "1.2",
            SchemaFamily::Qti21 => "2.1",
            SchemaFamily::Qti30 => "3.0",
        }
    }

    /// Published releases of this family.
    pub fn releases(&self) -> &'static [&'static str] {
        match self {
            SchemaFamily::Qti12 => &["1.2", "1.2.0", "1.2.1"],
            SchemaFamily::Qti21 => &[
                "2.1", "2.1.0", "2.1.1", "2.2", "2.2.0", "2.2.1", "2.2.2", "2.2.3", "2.2.4",
            ],
            SchemaFamily::Qti30 => &["3.0", "3.0.0"],
        }
    }

    pub fn is_known_release(&self, version: &str) -> bool {
        self.releases().contains(&version.trim())
    }

    /// The next generation, if any.
    pub fn successor(&self) -> Option<SchemaFamily> {
        match self {
            SchemaFamily::Qti12 => Some(SchemaFamily::Qti21),
            SchemaFamily::Qti21 => Some(SchemaFamily::Qti30),
            SchemaFamily::Qti30 => None,
        }
    }
}

impl fmt::Display for SchemaFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_version())
    }
}

impl FromStr for SchemaFamily {
    type Err = SchemaVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchemaFamily::resolve(s)
    }
}

#[derive(Debug, Error)]
pub enum SchemaVersionError {
    #[error("Invalid version format: {0}")]
    InvalidFormat(String),

    #[error("unsupported QTI version: {0}")]
    Unsupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version_creation() {
        let version = SchemaVersion::new(2, 2, 4);
        assert_eq!(version.major, 2);
        assert_eq!(version.minor, 2);
        assert_eq!(version.patch, 4);
    }

    #[test]
    fn test_schema_version_display() {
        let version = SchemaVersion::new(1, 2, 0);
        assert_eq!(version.to_string(), "1.2.0");
    }

    #[test]
    fn test_schema_version_from_str() {
        let version: SchemaVersion = "2.2.3".parse().unwrap();
        assert_eq!(version, SchemaVersion::new(2, 2, 3));

        let short: SchemaVersion = " 3.0 ".parse().unwrap();
        assert_eq!(short, SchemaVersion::new(3, 0, 0));
    }

    #[test]
    fn test_schema_version_ordering() {
        let v1 = SchemaVersion::new(1, 2, 1);
        let v2 = SchemaVersion::new(2, 1, 0);
        let v3 = SchemaVersion::new(2, 2, 4);

        assert!(v1 < v2);
        assert!(v2 < v3);
        assert!(v1 < v3);
    }

    #[test]
    fn test_invalid_version_format() {
        assert!("invalid".parse::<SchemaVersion>().is_err());
        assert!("1".parse::<SchemaVersion>().is_err());
        assert!("1.2.3.4".parse::<SchemaVersion>().is_err());
    }

    #[test]
    fn test_version_family() {
        let version: SchemaVersion = "2.2.1".parse().unwrap();
        assert_eq!(version.family().unwrap(), SchemaFamily::Qti21);
    }

    #[test]
    fn test_resolve_by_prefix() {
        assert_eq!(SchemaFamily::resolve("1.2").unwrap(), SchemaFamily::Qti12);
        assert_eq!(SchemaFamily::resolve("1.2.1").unwrap(), SchemaFamily::Qti12);
        assert_eq!(SchemaFamily::resolve("2.1").unwrap(), SchemaFamily::Qti21);
        assert_eq!(SchemaFamily::resolve("2.2.3").unwrap(), SchemaFamily::Qti21);
        assert_eq!(SchemaFamily::resolve("  3.0  ").unwrap(), SchemaFamily::Qti30);
    }

    #[test]
    fn test_resolve_rejects_unknown() {
        for bad in ["", "   ", "4.0", "2.0", "v2.1"] {
            match SchemaFamily::resolve(bad) {
                Err(SchemaVersionError::Unsupported(v)) => assert_eq!(v, bad),
                other => panic!("expected unsupported for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_family_canonical_and_successor() {
        assert_eq!(SchemaFamily::Qti12.canonical_version(), "1.2");
        assert_eq!(SchemaFamily::Qti12.successor(), Some(SchemaFamily::Qti21));
        assert_eq!(SchemaFamily::Qti21.successor(), Some(SchemaFamily::Qti30));
        assert_eq!(SchemaFamily::Qti30.successor(), None);
    }

    #[test]
    fn test_known_releases() {
        assert!(SchemaFamily::Qti21.is_known_release("2.2.4"));
        assert!(!SchemaFamily::Qti21.is_known_release("2.2.9"));
        assert!(SchemaFamily::Qti30.is_known_release("3.0.0"));
    }
}
