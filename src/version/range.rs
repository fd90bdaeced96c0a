//! Version predicates and OR-of-AND version ranges.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Version;
use crate::error::LipError;

/// Comparison operator of a single predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOp {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl MatchOp {
    fn symbol(&self) -> &'static str {
        match self {
            MatchOp::Equal => "",
            MatchOp::NotEqual => "!=",
            MatchOp::Greater => ">",
            MatchOp::GreaterOrEqual => ">=",
            MatchOp::Less => "<",
            MatchOp::LessOrEqual => "<=",
        }
    }
}

/// One predicate of a range, e.g. `>=1.0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionMatch {
    pub op: MatchOp,
    pub version: Version,
}

impl VersionMatch {
    pub fn new(op: MatchOp, version: Version) -> Self {
        Self { op, version }
    }

    pub fn matches(&self, version: &Version) -> bool {
        match self.op {
            MatchOp::Equal => version == &self.version,
            MatchOp::NotEqual => version != &self.version,
            MatchOp::Greater => version > &self.version,
            MatchOp::GreaterOrEqual => version >= &self.version,
            MatchOp::Less => version < &self.version,
            MatchOp::LessOrEqual => version <= &self.version,
        }
    }
}

impl FromStr for VersionMatch {
    type Err = LipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        // Two-character operators must be tried before their one-character prefixes.
        let (op, rest) = [
            (">=", MatchOp::GreaterOrEqual),
            ("<=", MatchOp::LessOrEqual),
            ("!=", MatchOp::NotEqual),
            (">", MatchOp::Greater),
            ("<", MatchOp::Less),
            ("=", MatchOp::Equal),
        ]
        .into_iter()
        .find_map(|(symbol, op)| text.strip_prefix(symbol).map(|rest| (op, rest)))
        .unwrap_or((MatchOp::Equal, text));

        Ok(Self::new(op, Version::parse(rest)?))
    }
}

impl fmt::Display for VersionMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.symbol(), self.version)
    }
}

/// A version range: satisfied when every predicate of at least one group holds.
///
/// In `tooth.json` a range is written as a list of groups, e.g.
/// `[[">=1.0.0", "<2.0.0"], ["3.0.0"]]`. In specifier text the same range is
/// `>=1.0.0,<2.0.0||3.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct VersionRange {
    groups: Vec<Vec<VersionMatch>>,
}

impl VersionRange {
    pub fn new(groups: Vec<Vec<VersionMatch>>) -> Self {
        Self { groups }
    }

    /// The range every version satisfies.
    pub fn any() -> Self {
        Self {
            groups: vec![vec![]],
        }
    }

    /// The range holding exactly one version.
    pub fn exact(version: Version) -> Self {
        Self {
            groups: vec![vec![VersionMatch::new(MatchOp::Equal, version)]],
        }
    }

    pub fn groups(&self) -> &[Vec<VersionMatch>] {
        &self.groups
    }

    pub fn is_any(&self) -> bool {
        self.groups.iter().any(|group| group.is_empty())
    }

    /// OR over groups, AND within a group.
    pub fn matches(&self, version: &Version) -> bool {
        self.groups
            .iter()
            .any(|group| group.iter().all(|m| m.matches(version)))
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::any()
    }
}

impl FromStr for VersionRange {
    type Err = LipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::any());
        }

        let mut groups = Vec::new();
        for group_text in s.split("||") {
            if group_text.trim().is_empty() {
                return Err(LipError::InvalidVersionSyntax {
                    text: s.to_string(),
                    reason: "empty alternative".to_string(),
                });
            }
            let group = group_text
                .split(',')
                .map(VersionMatch::from_str)
                .collect::<Result<Vec<_>, _>>()?;
            groups.push(group);
        }

        Ok(Self { groups })
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(VersionMatch::to_string)
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect::<Vec<_>>()
            .join("||");
        f.write_str(&text)
    }
}

impl TryFrom<Vec<Vec<String>>> for VersionRange {
    type Error = LipError;

    fn try_from(value: Vec<Vec<String>>) -> Result<Self, Self::Error> {
        let groups = value
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|m| m.parse::<VersionMatch>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { groups })
    }
}

impl From<VersionRange> for Vec<Vec<String>> {
    fn from(range: VersionRange) -> Self {
        range
            .groups
            .iter()
            .map(|group| group.iter().map(VersionMatch::to_string).collect())
            .collect()
    }
}

/// Return the first candidate satisfying `range`, in the order given.
///
/// This is first-fit, not best-fit: the repository's ordering decides which
/// version wins when several satisfy the range.
pub fn select_first<'a>(candidates: &'a [Version], range: &VersionRange) -> Option<&'a Version> {
    candidates.iter().find(|v| range.matches(v))
}
