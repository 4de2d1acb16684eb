//! API version numbers.
//!
//! Versions follow the strict `MAJOR.MINOR[.PATCH][a|bN]` form: two or three
//! numeric components and an optional alpha/beta pre-release tag. A missing
//! patch component is 0, and a pre-release sorts before its release.
//! Each number must fit in a `u64`; longer digit runs are rejected as
//! invalid versions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IrError;

/// Pre-release stage. Alpha sorts before beta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreReleaseStage {
    Alpha,
    Beta,
}

impl PreReleaseStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreReleaseStage::Alpha => "a",
            PreReleaseStage::Beta => "b",
        }
    }
}

/// A pre-release tag such as `a1` or `b3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreRelease {
    pub stage: PreReleaseStage,
    pub number: u64,
}

/// The declared version of an API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Option<PreRelease>,
}

impl ApiVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: None,
        }
    }

    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_some()
    }
}

impl FromStr for ApiVersion {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IrError::InvalidVersion(s.to_string());

        // Split off the pre-release tag at the first alpha/beta marker.
        let (numbers, pre_release) = match s.find(['a', 'b']) {
            Some(pos) => {
                let stage = if s[pos..].starts_with('a') {
                    PreReleaseStage::Alpha
                } else {
                    PreReleaseStage::Beta
                };
                let number = parse_component(&s[pos + 1..]).ok_or_else(invalid)?;
                (&s[..pos], Some(PreRelease { stage, number }))
            }
            None => (s, None),
        };

        let components = numbers
            .split('.')
            .map(parse_component)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;

        let (major, minor, patch) = match components.as_slice() {
            [major, minor] => (*major, *minor, 0),
            [major, minor, patch] => (*major, *minor, *patch),
            _ => return Err(invalid()),
        };

        Ok(Self {
            major,
            minor,
            patch,
            pre_release,
        })
    }
}

fn parse_component(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl TryFrom<String> for ApiVersion {
    type Error = IrError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ApiVersion> for String {
    fn from(version: ApiVersion) -> Self {
        version.to_string()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)?;
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        }
        if let Some(pre) = &self.pre_release {
            write!(f, "{}{}", pre.stage.as_str(), pre.number)?;
        }
        Ok(())
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
