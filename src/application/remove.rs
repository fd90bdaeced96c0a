//! Remove action - handles explicit uninstalls.

use anyhow::Result;
use log::warn;

use crate::context::LipContext;
use crate::error::LipError;
use crate::install::Installer;
use crate::package::InstalledRecord;
use crate::runtime::Runtime;

pub struct RemoveAction<'a, R: Runtime> {
    installer: Installer<'a, R>,
}

impl<'a, R: Runtime> RemoveAction<'a, R> {
    pub fn new(runtime: &'a R, ctx: &LipContext) -> Self {
        Self {
            installer: Installer::new(runtime, ctx),
        }
    }

    pub fn installer(&self) -> &Installer<'a, R> {
        &self.installer
    }

    /// Installed tooths, other than those in `excluding`, that depend on `tooth`.
    pub fn dependents(&self, tooth: &str, excluding: &[String]) -> Result<Vec<String>> {
        Ok(self
            .installer
            .store()
            .list_all()?
            .into_iter()
            .filter(|r| r.depends_on(tooth) && !excluding.iter().any(|t| t == r.tooth()))
            .map(|r| r.tooth().to_string())
            .collect())
    }

    /// Uninstall every tooth in `tooths`.
    ///
    /// Nothing is removed unless all of them are installed. Tooths still
    /// required by another installed tooth are removed anyway, with a warning.
    #[tracing::instrument(skip(self))]
    pub fn remove(&self, tooths: &[String]) -> Result<Vec<InstalledRecord>> {
        let store = self.installer.store();
        for tooth in tooths {
            if !store.is_installed(tooth) {
                return Err(LipError::NotInstalled {
                    tooth: tooth.clone(),
                }
                .into());
            }
        }

        let mut removed = Vec::with_capacity(tooths.len());
        for tooth in tooths {
            if removed.iter().any(|r: &InstalledRecord| r.tooth() == tooth) {
                continue;
            }
            let dependents = self.dependents(tooth, tooths)?;
            if !dependents.is_empty() {
                warn!("{} is still required by {}", tooth, dependents.join(", "));
            }
            removed.push(self.installer.uninstall(tooth)?);
        }
        Ok(removed)
    }
}
