use anyhow::Result;
use log::debug;

use crate::{context::LipContext, package::RecordStore, runtime::Runtime};

/// Show detailed information about an installed tooth
#[tracing::instrument(skip(runtime, ctx))]
pub fn show<R: Runtime>(runtime: R, tooth: &str, ctx: LipContext) -> Result<()> {
    debug!("Showing info for {}", tooth);
    let store = RecordStore::new(&runtime, ctx.records_dir());
    let record = store.load(tooth)?;
    let metadata = &record.metadata;
    let info = &metadata.information;

    println!("Tooth: {}", metadata.tooth);
    println!("Version: {}", metadata.version);
    println!(
        "Installed: {}",
        if record.is_manually_installed {
            "manually"
        } else {
            "as a dependency"
        }
    );

    let fields = [
        ("Name", &info.name),
        ("Description", &info.description),
        ("Author", &info.author),
        ("License", &info.license),
        ("Homepage", &info.homepage),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{}: {}", label, value);
        }
    }

    if !metadata.dependencies.is_empty() {
        println!("\nDependencies:");
        for (dependency, range) in &metadata.dependencies {
            println!("  {} {}", dependency, range);
        }
    }

    if !metadata.possession.is_empty() {
        println!("\nPossession:");
        for entry in &metadata.possession {
            println!("  {}", entry);
        }
    }

    Ok(())
}
