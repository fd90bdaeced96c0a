//! Reinstall decision for tooths that are already installed.

use crate::version::Version;

/// How `install` treats a requested tooth that is already installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReinstallMode {
    /// Keep the installed version.
    #[default]
    Keep,
    /// Replace only with a strictly newer version.
    Upgrade,
    /// Always replace.
    Force,
}

impl ReinstallMode {
    /// `--force-reinstall` takes precedence over `--upgrade`.
    pub fn from_flags(upgrade: bool, force_reinstall: bool) -> Self {
        match (upgrade, force_reinstall) {
            (_, true) => ReinstallMode::Force,
            (true, false) => ReinstallMode::Upgrade,
            (false, false) => ReinstallMode::Keep,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReinstallDecision {
    /// Not installed yet.
    Install,
    /// Uninstall the installed version, then install the resolved one.
    Replace,
    /// Leave the installed version alone and drop it from the plan.
    Skip,
}

pub fn decide(mode: ReinstallMode, installed: Option<&Version>, resolved: &Version) -> ReinstallDecision {
    let Some(installed) = installed else {
        return ReinstallDecision::Install;
    };
    match mode {
        ReinstallMode::Force => ReinstallDecision::Replace,
        ReinstallMode::Upgrade if resolved.greater_than(installed) => ReinstallDecision::Replace,
        ReinstallMode::Upgrade | ReinstallMode::Keep => ReinstallDecision::Skip,
    }
}
