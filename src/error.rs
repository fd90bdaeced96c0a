//! Error kinds surfaced by resolution, planning and installation.
//!
//! Operations return `anyhow::Result`; callers that need to branch on the
//! failure kind use `err.downcast_ref::<LipError>()`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LipError {
    #[error("invalid specifier '{text}': {reason}")]
    InvalidSpecifierSyntax { text: String, reason: String },

    #[error("invalid version '{text}': {reason}")]
    InvalidVersionSyntax { text: String, reason: String },

    #[error("cannot reach tooth repository for {tooth}: {reason}")]
    RepositoryUnreachable { tooth: String, reason: String },

    #[error("tooth {tooth} not found in repository")]
    PackageNotFound { tooth: String },

    #[error("failed to download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("invalid tooth archive {path:?}: {reason}")]
    ArchiveInvalid { path: PathBuf, reason: String },

    #[error("{specifier} fetched an archive for tooth {actual}")]
    PackagePathMismatch { specifier: String, actual: String },

    #[error("no version of {tooth} satisfies {range} (required by {required_by})")]
    UnsatisfiableDependency {
        tooth: String,
        range: String,
        required_by: String,
    },

    #[error("dependency cycle between {}", .tooths.join(", "))]
    DependencyCycle { tooths: Vec<String> },

    #[error("tooth {tooth} is already installed")]
    AlreadyInstalled { tooth: String },

    #[error("tooth {tooth} is not installed")]
    NotInstalled { tooth: String },

    #[error("{path} of {tooth} is already possessed by {owner}")]
    PossessionConflict {
        tooth: String,
        owner: String,
        path: String,
    },

    #[error("filesystem error at {path:?}: {reason}")]
    Filesystem { path: PathBuf, reason: String },
}

/// Returns the [`LipError`] kind carried by an `anyhow` error, if any.
pub fn kind_of(err: &anyhow::Error) -> Option<&LipError> {
    err.downcast_ref::<LipError>()
}
