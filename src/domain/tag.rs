use crate::domain::{ResourceId, Version};
use crate::error::{ReleaseError, Result};
use rand::Rng;

const SALT_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Tag naming pattern (e.g., "alis.in.{version}")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    pub pattern: String,
}

impl TagPattern {
    /// Create a new tag pattern
    pub fn new(pattern: impl Into<String>) -> Self {
        TagPattern {
            pattern: pattern.into(),
        }
    }

    /// Pattern for a resource: its dotted identifier followed by the version
    pub fn for_resource(id: &ResourceId) -> Self {
        TagPattern::new(format!("{}.{{version}}", id))
    }

    /// Format a version according to pattern
    /// Example: pattern="alis.in.{version}", version=1.2.3 -> "alis.in.1.2.3"
    pub fn format(&self, version: &Version) -> String {
        self.pattern.replace("{version}", &version.to_string())
    }

    /// Format a version and append a salt suffix, if one is given
    pub fn format_salted(&self, version: &Version, salt: Option<&str>) -> String {
        match salt {
            Some(salt) if !salt.is_empty() => format!("{}.{}", self.format(version), salt),
            _ => self.format(version),
        }
    }

    /// Validate if a tag matches this pattern, with or without a salt suffix
    pub fn matches(&self, tag: &str) -> Result<bool> {
        if !self.pattern.contains("{version}") {
            return Err(ReleaseError::invalid_argument(
                "Pattern must contain {version} placeholder",
            ));
        }

        let escaped = regex::escape(&self.pattern);
        let regex_pattern = escaped.replace(r"\{version\}", r"(\d+\.\d+\.\d+)");

        regex::Regex::new(&format!(r"^{}(\.[a-z0-9]+)?$", regex_pattern))
            .map(|re| re.is_match(tag))
            .map_err(|_| ReleaseError::invalid_argument("Invalid pattern"))
    }
}

/// Random `[a-z0-9]` suffix used to salt speculative tags
pub fn random_salt<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    (0..len)
        .map(|_| SALT_ALPHABET[rng.gen_range(0..SALT_ALPHABET.len())] as char)
        .collect()
}
