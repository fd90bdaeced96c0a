//! Tooth specifiers: either a tooth path with a version range, or the
//! location of a single tooth archive.

use std::fmt;
use std::str::FromStr;

use crate::error::LipError;
use crate::version::{Version, VersionRange};

/// File suffix of standalone tooth archives.
pub const TOOTH_FILE_SUFFIX: &str = ".tth";

/// `tooth[@range]`, resolved through the tooth repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequirementSpecifier {
    pub tooth: String,
    pub range: VersionRange,
}

impl RequirementSpecifier {
    pub fn new(tooth: impl Into<String>, range: VersionRange) -> Self {
        Self {
            tooth: tooth.into(),
            range,
        }
    }

    /// Requirement pinned to one version, as synthesized for dependencies.
    pub fn exact(tooth: impl Into<String>, version: Version) -> Self {
        Self::new(tooth, VersionRange::exact(version))
    }
}

/// Local path or URL of one tooth archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirectSpecifier {
    Url(String),
    Path(String),
}

impl DirectSpecifier {
    pub fn location(&self) -> &str {
        match self {
            DirectSpecifier::Url(url) => url,
            DirectSpecifier::Path(path) => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Specifier {
    Requirement(RequirementSpecifier),
    Direct(DirectSpecifier),
}

impl Specifier {
    pub fn parse(text: &str) -> Result<Self, LipError> {
        let invalid = |reason: &str| LipError::InvalidSpecifierSyntax {
            text: text.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty specifier"));
        }

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Ok(Specifier::Direct(DirectSpecifier::Url(trimmed.to_string())));
        }

        if trimmed.to_lowercase().ends_with(TOOTH_FILE_SUFFIX) {
            return Ok(Specifier::Direct(DirectSpecifier::Path(
                trimmed.to_string(),
            )));
        }

        let (tooth, range) = match trimmed.split_once('@') {
            Some((tooth, range_text)) => {
                if range_text.trim().is_empty() {
                    return Err(invalid("missing version range after '@'"));
                }
                let range = range_text
                    .parse::<VersionRange>()
                    .map_err(|e| invalid(&e.to_string()))?;
                (tooth, range)
            }
            None => (trimmed, VersionRange::any()),
        };

        if !is_valid_tooth_path(tooth) {
            return Err(invalid("tooth path may only contain letters, digits, '.', '_', '-' and '/'"));
        }

        Ok(Specifier::Requirement(RequirementSpecifier::new(
            tooth, range,
        )))
    }

    pub fn as_requirement(&self) -> Option<&RequirementSpecifier> {
        match self {
            Specifier::Requirement(req) => Some(req),
            Specifier::Direct(_) => None,
        }
    }
}

fn is_valid_tooth_path(tooth: &str) -> bool {
    !tooth.is_empty()
        && !tooth.starts_with('/')
        && !tooth.ends_with('/')
        && tooth
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/'))
}

impl FromStr for Specifier {
    type Err = LipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Specifier::parse(s)
    }
}

/// Canonical form, used as the resolver's deduplication key.
impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Specifier::Requirement(req) if req.range.is_any() => write!(f, "{}", req.tooth),
            Specifier::Requirement(req) => write!(f, "{}@{}", req.tooth, req.range),
            Specifier::Direct(direct) => f.write_str(direct.location()),
        }
    }
}

impl From<RequirementSpecifier> for Specifier {
    fn from(req: RequirementSpecifier) -> Self {
        Specifier::Requirement(req)
    }
}
