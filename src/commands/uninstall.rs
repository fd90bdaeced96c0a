use anyhow::Result;
use log::debug;

use crate::application::RemoveAction;
use crate::context::LipContext;
use crate::error::LipError;
use crate::runtime::Runtime;

/// Uninstall tooths from the workspace
#[tracing::instrument(skip(runtime, ctx))]
pub fn uninstall<R: Runtime>(runtime: R, tooths: &[String], yes: bool, ctx: LipContext) -> Result<()> {
    debug!("Uninstalling {:?} from {:?}", tooths, ctx.workspace_dir());
    let action = RemoveAction::new(&runtime, &ctx);

    if !yes {
        show_removal_plan(&action, tooths)?;
        if !runtime.confirm("Proceed with removal?")? {
            println!("Removal cancelled.");
            return Ok(());
        }
    }

    for record in action.remove(tooths)? {
        println!("Uninstalled {}", record.metadata.display_name());
    }
    Ok(())
}

fn show_removal_plan<R: Runtime>(action: &RemoveAction<'_, R>, tooths: &[String]) -> Result<()> {
    let store = action.installer().store();

    println!();
    println!("=== Removal Plan ===");
    println!();
    for tooth in tooths {
        let record = store.find(tooth)?.ok_or_else(|| LipError::NotInstalled {
            tooth: tooth.clone(),
        })?;
        println!("Tooth: {}", record.metadata.display_name());
        for entry in &record.metadata.possession {
            println!("  [DEL] {}", entry);
        }
        let dependents = action.dependents(tooth, tooths)?;
        if !dependents.is_empty() {
            println!("  Still required by: {}", dependents.join(", "));
        }
    }
    println!();
    Ok(())
}
