use anyhow::Result;
use log::debug;

use crate::application::{autoremove as remove_orphans, plan_autoremove};
use crate::context::LipContext;
use crate::install::Installer;
use crate::runtime::Runtime;

/// Uninstall dependencies that no installed tooth requires any more
#[tracing::instrument(skip(runtime, ctx))]
pub fn autoremove<R: Runtime>(runtime: R, yes: bool, ctx: LipContext) -> Result<()> {
    let installer = Installer::new(&runtime, &ctx);
    let planned = plan_autoremove(&installer.store().list_all()?);
    debug!("Autoremove plan: {:?}", planned);

    if planned.is_empty() {
        println!("Nothing to remove.");
        return Ok(());
    }

    if !yes {
        println!();
        println!("=== Autoremove Plan ===");
        println!();
        for tooth in &planned {
            println!("  [DEL] {}", tooth);
        }
        println!();
        if !runtime.confirm("Proceed with removal?")? {
            println!("Removal cancelled.");
            return Ok(());
        }
    }

    for tooth in remove_orphans(&installer)? {
        println!("Removed {}", tooth);
    }
    Ok(())
}
