//! Orphan detection: dependencies nothing needs any more.

use anyhow::Result;
use log::{debug, info};
use std::collections::{HashMap, HashSet};

use crate::install::Installer;
use crate::package::InstalledRecord;
use crate::runtime::Runtime;

/// Records nobody depends on that were not installed on request.
pub fn find_orphans(records: &[InstalledRecord]) -> Vec<&InstalledRecord> {
    let mut referenced: HashMap<&str, usize> = HashMap::new();
    for record in records {
        for dependency in record.metadata.dependencies.keys() {
            *referenced.entry(dependency.as_str()).or_default() += 1;
        }
    }

    records
        .iter()
        .filter(|r| !r.is_manually_installed && !referenced.contains_key(r.tooth()))
        .collect()
}

/// Removal order for autoremove.
///
/// Each pass takes the current orphans out of the set; removing them can
/// orphan their own dependencies, so passes repeat until one finds nothing.
pub fn plan_autoremove(records: &[InstalledRecord]) -> Vec<String> {
    let mut remaining: Vec<InstalledRecord> = records.to_vec();
    let mut order = Vec::new();

    for pass in 1.. {
        let orphans: HashSet<String> = find_orphans(&remaining)
            .into_iter()
            .map(|r| r.tooth().to_string())
            .collect();
        if orphans.is_empty() {
            break;
        }
        debug!("Autoremove pass {}: {} orphan(s)", pass, orphans.len());

        let mut removed: Vec<String> = orphans.into_iter().collect();
        removed.sort();
        remaining.retain(|r| !removed.iter().any(|t| t == r.tooth()));
        order.extend(removed);
    }

    order
}

/// Uninstall every orphan, cascading. Returns the removed tooths in order.
#[tracing::instrument(skip(installer))]
pub fn autoremove<R: Runtime>(installer: &Installer<'_, R>) -> Result<Vec<String>> {
    let records = installer.store().list_all()?;
    let order = plan_autoremove(&records);

    for tooth in &order {
        info!("Removing orphan {}", tooth);
        installer.uninstall(tooth)?;
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Metadata;
    use crate::runtime::RealRuntime;
    use crate::test_utils::{ToothFixture, test_context};
    use crate::version::Version;
    use tempfile::tempdir;

    fn record(tooth: &str, dependencies: &[&str], manual: bool) -> InstalledRecord {
        InstalledRecord::new(
            Metadata {
                tooth: tooth.to_string(),
                version: Version::new(1, 0, 0),
                dependencies: dependencies
                    .iter()
                    .map(|d| (d.to_string(), Default::default()))
                    .collect(),
                information: Default::default(),
                placement: vec![],
                possession: vec![],
            },
            manual,
        )
    }

    fn tooths(records: Vec<&InstalledRecord>) -> Vec<&str> {
        records.into_iter().map(|r| r.tooth()).collect()
    }

    #[test]
    fn test_find_orphans() {
        let records = vec![
            record("a", &["b"], true),
            record("b", &[], false),
            record("c", &[], false),
            record("d", &[], true),
        ];
        assert_eq!(tooths(find_orphans(&records)), vec!["c"]);
    }

    #[test]
    fn test_plan_cascades_through_chain() {
        let records = vec![record("b", &["c"], false), record("c", &[], false)];
        assert_eq!(plan_autoremove(&records), vec!["b", "c"]);
    }

    #[test]
    fn test_plan_keeps_manual_and_cycles() {
        let records = vec![
            record("manual", &[], true),
            record("x", &["y"], false),
            record("y", &["x"], false),
        ];
        assert!(plan_autoremove(&records).is_empty());
    }

    #[test]
    fn test_plan_keeps_shared_dependency() {
        let records = vec![
            record("a", &["shared"], true),
            record("b", &["shared"], false),
            record("shared", &[], false),
        ];
        assert_eq!(plan_autoremove(&records), vec!["b"]);
    }

    #[test]
    fn test_autoremove_after_removing_root() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path());
        let runtime = RealRuntime;
        let installer = Installer::new(&runtime, &ctx);

        let c = ToothFixture::new("example.com/c", "1.0.0")
            .file("c.txt", "c")
            .place("c.txt", "c.txt")
            .possess("c.txt")
            .write(dir.path());
        let b = ToothFixture::new("example.com/b", "1.0.0")
            .depends("example.com/c", "1.0.0")
            .write(dir.path());
        let a = ToothFixture::new("example.com/a", "1.0.0")
            .depends("example.com/b", "1.0.0")
            .write(dir.path());
        installer.install(&c, false).unwrap();
        installer.install(&b, false).unwrap();
        installer.install(&a, true).unwrap();

        assert!(autoremove(&installer).unwrap().is_empty());

        installer.uninstall("example.com/a").unwrap();
        let removed = autoremove(&installer).unwrap();

        assert_eq!(removed, vec!["example.com/b", "example.com/c"]);
        assert!(installer.store().list_all().unwrap().is_empty());
        assert!(!ctx.workspace_dir().join("c.txt").exists());
    }
}
