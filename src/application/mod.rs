//! Application layer - Use cases that coordinate the core components.
//!
//! This layer sits between the CLI commands and the resolver, installer and
//! record store.

mod autoremove;
mod install;
mod remove;
mod upgrade;

pub use autoremove::{autoremove, find_orphans, plan_autoremove};
pub use install::{InstallOptions, InstallReport, InstallUseCase};
pub use remove::RemoveAction;
pub use upgrade::{ReinstallDecision, ReinstallMode, decide};
