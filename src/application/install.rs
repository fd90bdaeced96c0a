//! Install use case - orchestrates the tooth installation flow.
//!
//! This use case coordinates:
//! - Dependency resolution
//! - Reinstall decisions for requested tooths
//! - Install ordering
//! - Installation and manual-install bookkeeping

use std::collections::HashSet;

use anyhow::Result;
use log::{info, warn};

use super::upgrade::{ReinstallDecision, ReinstallMode, decide};
use crate::context::LipContext;
use crate::download::Downloader;
use crate::install::Installer;
use crate::provider::ToothRepository;
use crate::resolver::{ResolvedArchive, Resolver, plan};
use crate::runtime::Runtime;
use crate::specifier::Specifier;

/// Options for the install use case
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    pub mode: ReinstallMode,
}

/// What an install run did, as `tooth@version` names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub installed: Vec<String>,
    /// Uninstalled to make room for a newer or forced version.
    pub replaced: Vec<String>,
    /// Requested tooths that were already installed and left alone.
    pub skipped: Vec<String>,
    /// Already-installed dependencies now flagged as manually installed.
    pub marked_manual: Vec<String>,
}

pub struct InstallUseCase<'a, R: Runtime> {
    resolver: Resolver<'a, R>,
    installer: Installer<'a, R>,
}

impl<'a, R: Runtime> InstallUseCase<'a, R> {
    pub fn new(
        runtime: &'a R,
        ctx: &LipContext,
        repository: &'a dyn ToothRepository,
        downloader: &'a dyn Downloader,
    ) -> Self {
        Self {
            resolver: Resolver::new(runtime, repository, downloader, ctx.cache_dir().to_path_buf()),
            installer: Installer::new(runtime, ctx),
        }
    }

    pub fn installer(&self) -> &Installer<'a, R> {
        &self.installer
    }

    pub async fn resolve(&self, roots: &[Specifier]) -> Result<Vec<ResolvedArchive>> {
        self.resolver.resolve(roots).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn run(&self, roots: &[Specifier], options: InstallOptions) -> Result<InstallReport> {
        let resolved = self.resolve(roots).await?;
        self.apply(roots, &resolved, options)
    }

    /// Install an already resolved set.
    ///
    /// Archives produced by `roots` are installed as manually installed,
    /// everything else as dependencies.
    pub fn apply(
        &self,
        roots: &[Specifier],
        resolved: &[ResolvedArchive],
        options: InstallOptions,
    ) -> Result<InstallReport> {
        let store = self.installer.store();
        let mut report = InstallReport::default();
        let mut requested: HashSet<String> = HashSet::new();
        let mut dropped: HashSet<String> = HashSet::new();
        let mut replace: Vec<String> = Vec::new();

        for root in roots {
            let key = root.to_string();
            let Some(archive) = resolved.iter().find(|a| a.specifier == key) else {
                continue;
            };
            let tooth = archive.tooth().to_string();
            if !requested.insert(tooth.clone()) {
                continue;
            }

            let mode = match root {
                Specifier::Direct(_) if options.mode != ReinstallMode::Keep => {
                    warn!(
                        "{} is not a requirement specifier and cannot be upgraded or force-reinstalled",
                        key
                    );
                    ReinstallMode::Keep
                }
                _ => options.mode,
            };

            let installed = store.find(&tooth)?;
            match decide(mode, installed.as_ref().map(|r| r.version()), archive.version()) {
                ReinstallDecision::Install => {}
                ReinstallDecision::Replace => replace.push(tooth),
                ReinstallDecision::Skip => {
                    info!("{} is already installed", tooth);
                    if let Some(record) = installed {
                        report.skipped.push(record.metadata.display_name());
                    }
                    if store.mark_manual(&tooth)? {
                        report.marked_manual.push(tooth.clone());
                    }
                    dropped.insert(tooth);
                }
            }
        }

        let candidates: Vec<ResolvedArchive> = resolved
            .iter()
            .filter(|a| !dropped.contains(a.tooth()))
            .cloned()
            .collect();
        let ordered = plan(&candidates)?;

        for tooth in &replace {
            let record = self.installer.uninstall(tooth)?;
            report.replaced.push(record.metadata.display_name());
        }

        for archive in &ordered {
            let tooth = archive.tooth();
            let manual = requested.contains(tooth);

            if store.is_installed(tooth) {
                info!("{} is already installed", tooth);
                if manual && store.mark_manual(tooth)? {
                    report.marked_manual.push(tooth.to_string());
                }
                continue;
            }

            self.installer.install(archive, manual)?;
            report.installed.push(archive.metadata.display_name());
        }

        Ok(report)
    }
}
