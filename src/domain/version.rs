use crate::error::{ReleaseError, Result};
use std::fmt;
use std::str::FromStr;

/// Semantic version representation
///
/// Bumping yields a new value; a `Version` is never decremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dotted-decimal version (e.g., "1.2.3")
    pub fn parse(version: &str) -> Result<Self> {
        let parts: Vec<&str> = version.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(ReleaseError::parse(format!(
                "Invalid version format: '{}' - expected X.Y.Z",
                version
            )));
        }

        let component = |name: &str, raw: &str| {
            raw.parse::<u64>()
                .map_err(|_| ReleaseError::parse(format!("Invalid {} version: '{}'", name, raw)))
        };

        Ok(Version {
            major: component("major", parts[0])?,
            minor: component("minor", parts[1])?,
            patch: component("patch", parts[2])?,
        })
    }

    /// Bump version according to release kind
    ///
    /// Only the targeted component increments. Lower-order components are
    /// carried over unchanged: `1.2.3` bumped by minor is `1.3.3`. A component
    /// already at `u64::MAX` cannot be bumped.
    pub fn bump(&self, kind: ReleaseKind) -> Result<Self> {
        let next = |value: u64| {
            value.checked_add(1).ok_or_else(|| {
                ReleaseError::parse(format!("Cannot bump {} of {}: out of range", kind, self))
            })
        };

        Ok(match kind {
            ReleaseKind::Major => Version {
                major: next(self.major)?,
                ..*self
            },
            ReleaseKind::Minor => Version {
                minor: next(self.minor)?,
                ..*self
            },
            ReleaseKind::Patch => Version {
                patch: next(self.patch)?,
                ..*self
            },
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl From<Version> for semver::Version {
    fn from(v: Version) -> Self {
        semver::Version::new(v.major, v.minor, v.patch)
    }
}

/// Which component of a version a release increments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseKind {
    #[default]
    Patch,
    Minor,
    Major,
}

impl ReleaseKind {
    pub fn name(&self) -> &'static str {
        match self {
            ReleaseKind::Patch => "patch",
            ReleaseKind::Minor => "minor",
            ReleaseKind::Major => "major",
        }
    }
}

impl FromStr for ReleaseKind {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "patch" => Ok(ReleaseKind::Patch),
            "minor" => Ok(ReleaseKind::Minor),
            "major" => Ok(ReleaseKind::Major),
            other => Err(ReleaseError::UnsupportedReleaseKind(other.to_string())),
        }
    }
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bump a version string by a release kind string.
///
/// String-level entry point used where both values arrive as external input.
pub fn bump(version: &str, kind: &str) -> Result<Version> {
    let version = Version::parse(version)?;
    let kind: ReleaseKind = kind.parse()?;
    version.bump(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(matches!(Version::parse("1.2"), Err(ReleaseError::Parse(_))));
        assert!(matches!(Version::parse("1.2.3.4"), Err(ReleaseError::Parse(_))));
        assert!(matches!(Version::parse("1.x.3"), Err(ReleaseError::Parse(_))));
        assert!(matches!(Version::parse("-1.2.3"), Err(ReleaseError::Parse(_))));
        assert!(matches!(Version::parse(""), Err(ReleaseError::Parse(_))));
    }

    #[test]
    fn test_version_bump_patch() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(ReleaseKind::Patch).unwrap(), Version::new(1, 2, 4));
    }

    #[test]
    fn test_version_bump_minor_keeps_patch() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(ReleaseKind::Minor).unwrap(), Version::new(1, 3, 3));
    }

    #[test]
    fn test_version_bump_major_keeps_lower_components() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(ReleaseKind::Major).unwrap(), Version::new(2, 2, 3));
    }

    #[test]
    fn test_bump_is_pure() {
        let v = Version::new(0, 0, 9);
        let _ = v.bump(ReleaseKind::Patch);
        assert_eq!(v, Version::new(0, 0, 9));
    }

    #[test]
    fn test_bump_overflow_is_an_error() {
        let v = Version::parse("1.2.18446744073709551615").unwrap();
        let err = v.bump(ReleaseKind::Patch).unwrap_err();
        assert!(matches!(err, ReleaseError::Parse(_)));
        assert!(err.to_string().contains("out of range"));

        // other components still bump
        assert_eq!(
            v.bump(ReleaseKind::Minor).unwrap(),
            Version::new(1, 3, u64::MAX)
        );
        assert!(bump(&format!("{}.0.0", u64::MAX), "major").is_err());
    }

    #[test]
    fn test_bump_strings() {
        assert_eq!(bump("4.0.9", "patch").unwrap().to_string(), "4.0.10");
        assert_eq!(bump("4.0.9", "minor").unwrap().to_string(), "4.1.9");
    }

    #[test]
    fn test_bump_unknown_kind() {
        let err = bump("1.2.3", "banana").unwrap_err();
        assert!(matches!(err, ReleaseError::UnsupportedReleaseKind(k) if k == "banana"));
    }

    #[test]
    fn test_bump_parse_error_wins_over_kind() {
        assert!(matches!(bump("1.2", "banana"), Err(ReleaseError::Parse(_))));
    }

    #[test]
    fn test_release_kind_default_is_patch() {
        assert_eq!(ReleaseKind::default(), ReleaseKind::Patch);
        assert_eq!(ReleaseKind::Minor.to_string(), "minor");
    }

    #[test]
    fn test_version_ordering_matches_semver() {
        let a: semver::Version = Version::new(1, 10, 0).into();
        let b: semver::Version = Version::new(1, 9, 7).into();
        assert!(a > b);
    }
}
