//! Per-invocation configuration passed explicitly to every operation.

use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

pub const DEFAULT_GOPROXY: &str = "https://goproxy.io";

/// Workspace directory holding lip's own records and staging area.
pub const STATE_DIR_NAME: &str = ".lip";

/// Where lip keeps its state and which proxy it talks to.
#[derive(Debug, Clone, PartialEq)]
pub struct LipContext {
    workspace_dir: PathBuf,
    cache_dir: PathBuf,
    goproxy: String,
}

impl LipContext {
    pub fn new(workspace_dir: PathBuf, cache_dir: PathBuf, goproxy: impl Into<String>) -> Self {
        Self {
            workspace_dir,
            cache_dir,
            goproxy: goproxy.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the context from CLI overrides and the environment.
    ///
    /// - workspace: `workspace` argument, else the current directory
    /// - cache: `LIP_CACHE_DIR`, else `<cache dir>/lip`, else `<workspace>/.lip/cache`
    /// - proxy: first usable `GOPROXY` entry, else [`DEFAULT_GOPROXY`]
    #[tracing::instrument(skip(runtime))]
    pub fn from_runtime<R: Runtime>(runtime: &R, workspace: Option<PathBuf>) -> Result<Self> {
        let workspace_dir = match workspace {
            Some(dir) => dir,
            None => runtime.current_dir()?,
        };

        let cache_dir = match runtime.env_var("LIP_CACHE_DIR") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => match runtime.cache_dir() {
                Some(dir) => dir.join("lip"),
                None => workspace_dir.join(STATE_DIR_NAME).join("cache"),
            },
        };

        let goproxy = runtime
            .env_var("GOPROXY")
            .ok()
            .and_then(|value| first_usable_proxy(&value))
            .unwrap_or_else(|| DEFAULT_GOPROXY.to_string());

        debug!(
            "workspace={:?} cache={:?} goproxy={}",
            workspace_dir, cache_dir, goproxy
        );
        Ok(Self::new(workspace_dir, cache_dir, goproxy))
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }

    pub fn lip_dir(&self) -> PathBuf {
        self.workspace_dir.join(STATE_DIR_NAME)
    }

    pub fn records_dir(&self) -> PathBuf {
        self.lip_dir().join("records")
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.lip_dir().join("staging")
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn goproxy(&self) -> &str {
        &self.goproxy
    }
}

/// `GOPROXY` is a `,` or `|` separated list that may contain the keywords
/// `direct` and `off`; lip only speaks the proxy protocol.
fn first_usable_proxy(value: &str) -> Option<String> {
    value
        .split([',', '|'])
        .map(str::trim)
        .find(|entry| !entry.is_empty() && *entry != "direct" && *entry != "off")
        .map(|entry| entry.trim_end_matches('/').to_string())
}
