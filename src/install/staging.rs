use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::package::escape_file_name;
use crate::runtime::Runtime;

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// Scoped directory for one install; removed on drop, whatever the outcome.
pub struct StagingDir<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
}

impl<'a, R: Runtime> StagingDir<'a, R> {
    pub fn create(runtime: &'a R, staging_root: &Path, tooth: &str) -> Result<Self> {
        let name = format!(
            "{}-{}-{}",
            escape_file_name(tooth),
            std::process::id(),
            NEXT_ID.fetch_add(1, Ordering::Relaxed)
        );
        let path = staging_root.join(name);
        if runtime.exists(&path) {
            runtime.remove_dir_all(&path)?;
        }
        runtime.create_dir_all(&path)?;
        debug!("Staging into {:?}", path);
        Ok(Self { runtime, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<R: Runtime> Drop for StagingDir<'_, R> {
    fn drop(&mut self) {
        if self.runtime.exists(&self.path)
            && let Err(e) = self.runtime.remove_dir_all(&self.path)
        {
            debug!("Failed to clean up {:?}: {}", self.path, e);
        }
    }
}
