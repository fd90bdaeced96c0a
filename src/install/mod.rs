//! Applying archives to the workspace and reversing them.
//!
//! Install stages every placed file under the staging directory, moves the
//! staged files into the workspace and only then writes the record, so an
//! interrupted install never leaves a record behind.

mod possession;
mod staging;

use anyhow::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::archive::ToothArchive;
use crate::context::LipContext;
use crate::error::LipError;
use crate::package::{InstalledRecord, Metadata, RecordStore};
use crate::resolver::ResolvedArchive;
use crate::runtime::Runtime;

pub use possession::Possession;
pub use staging::StagingDir;

pub struct Installer<'a, R: Runtime> {
    runtime: &'a R,
    workspace_dir: PathBuf,
    staging_dir: PathBuf,
    store: RecordStore<'a, R>,
}

impl<'a, R: Runtime> Installer<'a, R> {
    pub fn new(runtime: &'a R, ctx: &LipContext) -> Self {
        Self {
            runtime,
            workspace_dir: ctx.workspace_dir().to_path_buf(),
            staging_dir: ctx.staging_dir(),
            store: RecordStore::new(runtime, ctx.records_dir()),
        }
    }

    pub fn store(&self) -> &RecordStore<'a, R> {
        &self.store
    }

    /// Place the archive's files and record the installation.
    #[tracing::instrument(skip(self, archive), fields(tooth = %archive.tooth()))]
    pub fn install(&self, archive: &ResolvedArchive, is_manually_installed: bool) -> Result<()> {
        let tooth = archive.tooth();
        if self.store.is_installed(tooth) {
            return Err(LipError::AlreadyInstalled {
                tooth: tooth.to_string(),
            }
            .into());
        }
        self.check_possession(&archive.metadata)?;

        info!("Installing {}...", archive.metadata.display_name());

        let mut opened = ToothArchive::open(self.runtime, &archive.path)?;
        let files = opened.placed_files()?;

        let staging = StagingDir::create(self.runtime, &self.staging_dir, tooth)?;
        for (i, file) in files.iter().enumerate() {
            let staged = staging.path().join(i.to_string());
            opened
                .extract_entry(self.runtime, &file.entry, &staged)
                .map_err(|e| filesystem_error(&staged, e))?;
        }

        for (i, file) in files.iter().enumerate() {
            let staged = staging.path().join(i.to_string());
            let destination = self.workspace_dir.join(&file.destination);
            self.move_into_place(&staged, &destination)
                .map_err(|e| filesystem_error(&destination, e))?;
            debug!("Placed {:?}", destination);
        }
        drop(staging);

        self.store.save(&InstalledRecord::new(
            archive.metadata.clone(),
            is_manually_installed,
        ))
    }

    /// Remove every path the tooth possesses, then its record.
    ///
    /// Returns the record that was removed.
    #[tracing::instrument(skip(self))]
    pub fn uninstall(&self, tooth: &str) -> Result<InstalledRecord> {
        let record = self.store.load(tooth)?;
        info!("Uninstalling {}...", record.metadata.display_name());

        for entry in &record.metadata.possession {
            let possession = Possession::parse(entry)?;
            possession
                .remove(self.runtime, &self.workspace_dir)
                .map_err(|e| filesystem_error(&self.workspace_dir.join(entry), e))?;
        }

        self.store.delete(tooth)?;
        Ok(record)
    }

    /// Reject metadata whose possession overlaps another installed tooth.
    fn check_possession(&self, metadata: &Metadata) -> Result<()> {
        let claims = metadata
            .possession
            .iter()
            .map(|entry| -> Result<(&String, Possession)> { Ok((entry, Possession::parse(entry)?)) })
            .collect::<Result<Vec<_>>>()?;
        if claims.is_empty() {
            return Ok(());
        }

        for record in self.store.list_all()? {
            if record.tooth() == metadata.tooth {
                continue;
            }
            for owned in &record.metadata.possession {
                let owned = Possession::parse(owned)?;
                if let Some((entry, _)) = claims.iter().find(|(_, c)| c.conflicts_with(&owned)) {
                    return Err(LipError::PossessionConflict {
                        tooth: metadata.tooth.clone(),
                        owner: record.tooth().to_string(),
                        path: entry.to_string(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    fn move_into_place(&self, staged: &Path, destination: &Path) -> Result<()> {
        if let Some(parent) = destination.parent() {
            self.runtime.create_dir_all(parent)?;
        }
        if self.runtime.exists(destination) && !self.runtime.is_dir(destination) {
            self.runtime.remove_file(destination)?;
        }
        self.runtime.rename(staged, destination)
    }
}

fn filesystem_error(path: &Path, err: anyhow::Error) -> anyhow::Error {
    LipError::Filesystem {
        path: path.to_path_buf(),
        reason: format!("{:#}", err),
    }
    .into()
}
