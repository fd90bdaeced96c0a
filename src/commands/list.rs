use anyhow::Result;
use log::debug;

use crate::{context::LipContext, package::RecordStore, runtime::Runtime};

/// List all installed tooths
#[tracing::instrument(skip(runtime, ctx))]
pub fn list<R: Runtime>(runtime: R, ctx: LipContext) -> Result<()> {
    let store = RecordStore::new(&runtime, ctx.records_dir());
    debug!("Listing records from {:?}", store.records_dir());

    let records = store.list_all()?;
    if records.is_empty() {
        println!("No tooths installed.");
        return Ok(());
    }

    debug!("Found {} record(s)", records.len());
    for record in records {
        if record.is_manually_installed {
            println!("{} {}", record.tooth(), record.version());
        } else {
            println!("{} {} (dependency)", record.tooth(), record.version());
        }
    }

    Ok(())
}
