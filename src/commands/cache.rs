use anyhow::Result;

use crate::{context::LipContext, download::ToothCache, runtime::Runtime};

/// Print the cache location and usage
pub fn cache_info<R: Runtime>(runtime: R, ctx: LipContext) -> Result<()> {
    let cache = ToothCache::new(&runtime, ctx.cache_dir().to_path_buf());
    let info = cache.info()?;

    println!("Cache directory: {}", info.dir.display());
    println!("Archives: {}", info.entries);
    println!("Size: {}", format_bytes(info.bytes));
    Ok(())
}

/// Delete every cached archive
#[tracing::instrument(skip(runtime, ctx))]
pub fn cache_purge<R: Runtime>(runtime: R, yes: bool, ctx: LipContext) -> Result<()> {
    let cache = ToothCache::new(&runtime, ctx.cache_dir().to_path_buf());

    if !yes && !runtime.confirm(&format!("Remove {}?", cache.dir().display()))? {
        println!("Purge cancelled.");
        return Ok(());
    }

    cache.purge()?;
    println!("Cache purged.");
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
