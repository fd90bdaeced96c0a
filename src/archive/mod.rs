//! Tooth archive reader.
//!
//! A tooth is a zip container carrying `tooth.json` either at its root or
//! under a directory prefix (module proxies wrap their zips as
//! `{path}@v{version}/...`). The shortest `tooth.json` entry wins and its
//! prefix applies to every placement source.

mod zip;

use anyhow::Result;
use std::path::{Component, Path, PathBuf};

use crate::error::LipError;
use crate::package::{METADATA_FILE_NAME, Metadata};
use crate::runtime::Runtime;

pub use self::zip::ZipContainer;

/// An opened tooth archive with its parsed metadata.
pub struct ToothArchive {
    path: PathBuf,
    prefix: String,
    metadata: Metadata,
    container: ZipContainer,
}

/// One file to write during installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedFile {
    /// Entry name inside the archive.
    pub entry: String,
    /// Workspace-relative destination.
    pub destination: PathBuf,
}

impl ToothArchive {
    /// Open `path` and parse its embedded metadata.
    ///
    /// Any failure to read the container or its `tooth.json` is reported as
    /// `ArchiveInvalid`.
    #[tracing::instrument(skip(runtime))]
    pub fn open<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let invalid = |reason: String| LipError::ArchiveInvalid {
            path: path.to_path_buf(),
            reason,
        };

        let mut container =
            ZipContainer::open(runtime, path).map_err(|e| invalid(format!("{:#}", e)))?;
        let prefix = find_metadata_prefix(&container.entry_names())
            .ok_or_else(|| invalid(format!("{} not found", METADATA_FILE_NAME)))?;

        let content = container
            .read_entry(&format!("{}{}", prefix, METADATA_FILE_NAME))
            .map_err(|e| invalid(format!("{:#}", e)))?;
        let metadata = Metadata::from_json(&content).map_err(|e| invalid(format!("{:#}", e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            prefix,
            metadata,
            container,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn into_metadata(self) -> Metadata {
        self.metadata
    }

    /// Expand every placement into concrete files.
    ///
    /// A source ending in `/` places every file below that directory. A
    /// source that matches nothing, or an entry below a directory source
    /// that would leave the destination, is an `ArchiveInvalid` error.
    pub fn placed_files(&self) -> Result<Vec<PlacedFile>> {
        let names = self.container.entry_names();
        let mut files = Vec::new();

        for placement in &self.metadata.placement {
            let source = format!("{}{}", self.prefix, placement.source);

            if source.ends_with('/') {
                let before = files.len();
                for name in names.iter().filter(|n| !n.ends_with('/')) {
                    if let Some(rest) = name.strip_prefix(&source) {
                        if !is_enclosed(rest) {
                            return Err(self.invalid(format!("entry {:?} escapes its placement", name)));
                        }
                        files.push(PlacedFile {
                            entry: name.clone(),
                            destination: Path::new(&placement.destination).join(rest),
                        });
                    }
                }
                if files.len() == before {
                    return Err(self.missing_source(&placement.source));
                }
            } else if names.iter().any(|n| *n == source) {
                files.push(PlacedFile {
                    entry: source,
                    destination: PathBuf::from(&placement.destination),
                });
            } else {
                return Err(self.missing_source(&placement.source));
            }
        }

        Ok(files)
    }

    pub fn extract_entry<R: Runtime>(&mut self, runtime: &R, entry: &str, dest: &Path) -> Result<()> {
        self.container.extract_entry(runtime, entry, dest)
    }

    fn missing_source(&self, source: &str) -> anyhow::Error {
        self.invalid(format!("placement source {:?} not found in archive", source))
    }

    fn invalid(&self, reason: String) -> anyhow::Error {
        LipError::ArchiveInvalid {
            path: self.path.clone(),
            reason,
        }
        .into()
    }
}

/// Only plain names below the placement root.
fn is_enclosed(rest: &str) -> bool {
    !rest.is_empty()
        && Path::new(rest)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

/// Directory prefix (`""` for the root) of the shortest `tooth.json` entry.
fn find_metadata_prefix(names: &[String]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| {
            let prefix = name.strip_suffix(METADATA_FILE_NAME)?;
            (prefix.is_empty() || prefix.ends_with('/')).then(|| prefix.to_string())
        })
        .min_by_key(|prefix| prefix.len())
}
