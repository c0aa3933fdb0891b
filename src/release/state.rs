use crate::domain::{ReleaseKind, TagPattern, Version};
use crate::error::Result;
use std::fmt;

/// Phases of one release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseState {
    Computing,
    Tagging,
    TaggingRetry,
    PublishingSecondary,
    Submitting,
    Awaiting,
    Done,
    Failed,
    Aborted,
}

impl ReleaseState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReleaseState::Done | ReleaseState::Failed | ReleaseState::Aborted
        )
    }
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseState::Computing => "computing",
            ReleaseState::Tagging => "tagging",
            ReleaseState::TaggingRetry => "tagging-retry",
            ReleaseState::PublishingSecondary => "publishing-secondary",
            ReleaseState::Submitting => "submitting",
            ReleaseState::Awaiting => "awaiting",
            ReleaseState::Done => "done",
            ReleaseState::Failed => "failed",
            ReleaseState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Working state of the tagging loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAttempt {
    pub candidate: Version,
    pub tag: String,
    /// Number of collisions resolved so far
    pub retries: u32,
}

impl ReleaseAttempt {
    pub fn new(candidate: Version) -> Self {
        ReleaseAttempt {
            candidate,
            tag: String::new(),
            retries: 0,
        }
    }

    /// Regenerate the tag for the current candidate
    pub fn retag(&mut self, pattern: &TagPattern, salt: Option<&str>) -> &str {
        self.tag = pattern.format_salted(&self.candidate, salt);
        &self.tag
    }

    /// Move past a collision. Always a patch bump, whatever kind was requested.
    pub fn escalate(&mut self) -> Result<Version> {
        self.candidate = self.candidate.bump(ReleaseKind::Patch)?;
        self.retries += 1;
        Ok(self.candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalate_is_patch_bump() {
        let mut attempt = ReleaseAttempt::new(Version::new(1, 3, 3));
        assert_eq!(attempt.escalate().unwrap(), Version::new(1, 3, 4));
        assert_eq!(attempt.escalate().unwrap(), Version::new(1, 3, 5));
        assert_eq!(attempt.retries, 2);
    }

    #[test]
    fn test_escalate_at_patch_limit_fails() {
        let mut attempt = ReleaseAttempt::new(Version::new(1, 3, u64::MAX));
        assert!(attempt.escalate().is_err());
        assert_eq!(attempt.candidate, Version::new(1, 3, u64::MAX));
        assert_eq!(attempt.retries, 0);
    }

    #[test]
    fn test_retag() {
        let mut attempt = ReleaseAttempt::new(Version::new(2, 0, 0));
        let pattern = TagPattern::new("alis.in.{version}");
        assert_eq!(attempt.retag(&pattern, None), "alis.in.2.0.0");
        assert_eq!(attempt.retag(&pattern, Some("x1y2")), "alis.in.2.0.0.x1y2");
    }

    #[test]
    fn test_terminal_states() {
        assert!(ReleaseState::Done.is_terminal());
        assert!(ReleaseState::Aborted.is_terminal());
        assert!(!ReleaseState::TaggingRetry.is_terminal());
        assert_eq!(ReleaseState::PublishingSecondary.to_string(), "publishing-secondary");
    }
}
