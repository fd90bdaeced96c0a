use anyhow::Result;
use log::debug;

use crate::{
    application::{InstallOptions, InstallReport, InstallUseCase},
    context::LipContext,
    download::Downloader,
    provider::ToothRepository,
    resolver::ResolvedArchive,
    runtime::Runtime,
    specifier::Specifier,
};

use super::services::Services;

/// Install tooths and their dependencies into the workspace
#[tracing::instrument(skip(runtime, ctx))]
pub async fn install<R: Runtime>(
    runtime: R,
    specs: &[String],
    options: InstallOptions,
    yes: bool,
    ctx: LipContext,
) -> Result<()> {
    let services = Services::from_context(&runtime, &ctx)?;
    run(
        &runtime,
        &ctx,
        &services.repository,
        &services.downloader,
        specs,
        options,
        yes,
    )
    .await
}

pub async fn run<R: Runtime>(
    runtime: &R,
    ctx: &LipContext,
    repository: &dyn ToothRepository,
    downloader: &dyn Downloader,
    specs: &[String],
    options: InstallOptions,
    yes: bool,
) -> Result<()> {
    let roots = specs
        .iter()
        .map(|s| Specifier::parse(s))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("Installing {:?} with {:?}", roots, options);

    let use_case = InstallUseCase::new(runtime, ctx, repository, downloader);
    let resolved = use_case.resolve(&roots).await?;

    if !yes {
        show_install_plan(&resolved);
        if !runtime.confirm("Proceed with installation?")? {
            println!("Installation cancelled.");
            return Ok(());
        }
    }

    let report = use_case.apply(&roots, &resolved, options)?;
    print_report(&report);
    Ok(())
}

fn show_install_plan(resolved: &[ResolvedArchive]) {
    println!();
    println!("=== Installation Plan ===");
    println!();
    for archive in resolved {
        println!("  {}", archive.metadata.display_name());
    }
    println!();
}

fn print_report(report: &InstallReport) {
    for name in &report.skipped {
        println!("{} is already installed", name);
    }
    for name in &report.replaced {
        println!("Removed {}", name);
    }
    for name in &report.installed {
        println!("Installed {}", name);
    }
    for tooth in &report.marked_manual {
        println!("Marked {} as manually installed", tooth);
    }
    if report.installed.is_empty() && report.replaced.is_empty() {
        println!("Nothing to install.");
    }
}
