//! Repository abstraction for tooth registries.
//!
//! The resolver only needs two things from a registry: the published
//! versions of a tooth, in the order the registry lists them, and where to
//! download one of them.

mod goproxy;

use anyhow::Result;
use async_trait::async_trait;

use crate::version::Version;

pub use goproxy::{GoProxyRepository, escape_module_path};

/// Source of published tooths.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToothRepository: Send + Sync {
    /// Published versions of `tooth`, in repository order.
    ///
    /// Fails with `PackageNotFound` when the registry does not know the
    /// tooth and `RepositoryUnreachable` for any other failure.
    async fn list_versions(&self, tooth: &str) -> Result<Vec<Version>>;

    /// Download location of `tooth` at `version`.
    fn download_url(&self, tooth: &str, version: &Version) -> String;
}
