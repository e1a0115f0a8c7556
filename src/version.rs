//! Loose version codes as used by oi release tags and the installed marker file.
//!
//! Accepted shape: an optional `v`, one to four dotted numeric groups, an
//! optional stage block (`rc1`, `-beta.2`, `a3`, `.dev`, ...) and optional
//! `+build` metadata. Build metadata is kept but never takes part in ordering.

use regex::{Captures, Regex};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

const VERSION_PATTERN: &str = concat!(
    r"v?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:\.(\d+))?",
    r"([._-]?(?:(stable|beta|b|rc|RC|alpha|a|patch|pl|p)((?:[.-]?\d+)*)?)?([.-]?dev)?)?",
    r"(?:\+(\S+))?",
);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not parse a version from '{input}'")]
pub struct VersionParseError {
    pub input: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Stable,
    Beta,
    B,
    Rc,
    Alpha,
    A,
    Patch,
    Pl,
    P,
}

impl Stage {
    fn from_keyword(keyword: &str) -> Option<Self> {
        let stage = match keyword {
            "stable" => Stage::Stable,
            "beta" => Stage::Beta,
            "b" => Stage::B,
            "rc" | "RC" => Stage::Rc,
            "alpha" => Stage::Alpha,
            "a" => Stage::A,
            "patch" => Stage::Patch,
            "pl" => Stage::Pl,
            "p" => Stage::P,
            _ => return None,
        };
        Some(stage)
    }
}

/// A parsed version. Immutable once built.
///
/// Ordering looks at `major.minor.patch` first. A version without a stage
/// block sorts above any version that has one; two stage blocks are compared
/// as raw text, so `rc10` sorts before `rc9`.
#[derive(Debug, Clone)]
pub struct VersionCode {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub tiny: u64,
    pub stage: Option<Stage>,
    /// Raw digits (and separators) following the stage keyword, e.g. `1` or `.2.1`.
    pub stage_number: String,
    pub dev: bool,
    /// Literal stage block as written, separator included (`-rc1`, `.dev`).
    /// Empty for final releases.
    pub pre_release: String,
    pub build: Option<String>,
}

fn anchored_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!("^{}", VERSION_PATTERN)).expect("version pattern is a valid regex")
    })
}

fn search_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VERSION_PATTERN).expect("version pattern is a valid regex"))
}

impl VersionCode {
    /// Parse a version from the start of `raw`. Trailing text after the
    /// version-shaped prefix is ignored.
    pub fn parse(raw: &str) -> Result<Self, VersionParseError> {
        let input = raw.trim();
        anchored_regex()
            .captures(input)
            .and_then(|caps| Self::from_captures(&caps))
            .ok_or_else(|| VersionParseError {
                input: raw.to_string(),
            })
    }

    /// Find the first version-shaped substring anywhere in `text`.
    pub fn find(text: &str) -> Option<Self> {
        search_regex()
            .captures_iter(text)
            .find_map(|caps| Self::from_captures(&caps))
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        let number = |idx: usize| -> Option<u64> {
            match caps.get(idx) {
                Some(m) => m.as_str().parse().ok(),
                None => Some(0),
            }
        };

        let major = caps.get(1)?.as_str().parse().ok()?;
        let stage = caps.get(6).and_then(|m| Stage::from_keyword(m.as_str()));
        let stage_number = caps
            .get(7)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let dev = caps.get(8).is_some();

        // A dangling separator ("1.2.3-") is not a stage block
        let pre_release = if stage.is_some() || dev {
            caps.get(5).map(|m| m.as_str().to_string()).unwrap_or_default()
        } else {
            String::new()
        };

        Some(Self {
            major,
            minor: number(2)?,
            patch: number(3)?,
            tiny: number(4)?,
            stage,
            stage_number,
            dev,
            pre_release,
            build: caps.get(9).map(|m| m.as_str().to_string()),
        })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre_release.is_empty()
    }

    /// `major.minor.patch` followed by the literal stage block. This is the
    /// form compared against a release tag to decide "already installed".
    pub fn release_string(&self) -> String {
        format!(
            "{}.{}.{}{}",
            self.major, self.minor, self.patch, self.pre_release
        )
    }

    /// String equality against a tag with its leading `v` removed.
    pub fn matches_tag(&self, tag: &str) -> bool {
        self.release_string() == tag.trim_start_matches('v')
    }

    fn pre_release_key(&self) -> &str {
        self.pre_release.trim_start_matches(['.', '_', '-'])
    }
}

impl Ord for VersionCode {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.is_prerelease(), other.is_prerelease()) {
                (false, false) => Ordering::Equal,
                (false, true) => Ordering::Greater,
                (true, false) => Ordering::Less,
                (true, true) => self.pre_release_key().cmp(other.pre_release_key()),
            })
    }
}

impl PartialOrd for VersionCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionCode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionCode {}

impl fmt::Display for VersionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.tiny != 0 {
            write!(f, ".{}", self.tiny)?;
        }
        write!(f, "{}", self.pre_release)?;
        if let Some(build) = &self.build {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}
