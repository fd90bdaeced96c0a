//! CLI command handlers. Each one builds what it needs from the
//! [`LipContext`](crate::context::LipContext) and prints its outcome.

mod autoremove;
mod cache;
mod install;
mod list;
pub mod services;
mod show;
mod uninstall;

pub use autoremove::autoremove;
pub use cache::{cache_info, cache_purge};
pub use install::{install, run as run_install};
pub use list::list;
pub use show::show;
pub use uninstall::uninstall;
