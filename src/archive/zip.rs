use anyhow::{Context, Result};
use log::debug;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

use crate::runtime::Runtime;

/// In-memory view of a zip container.
///
/// `zip` needs `Read + Seek`, but `Runtime::open` hands out a plain reader,
/// so the archive is buffered once on open.
pub struct ZipContainer {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl ZipContainer {
    pub fn open<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let mut reader = runtime
            .open(path)
            .with_context(|| format!("Failed to open archive at {:?}", path))?;
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .with_context(|| format!("Failed to read archive {:?}", path))?;
        Self::from_bytes(buffer)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes)).context("Failed to parse ZIP archive")?;
        Ok(Self { archive })
    }

    /// Names of all entries, directories included, in archive order.
    pub fn entry_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut entry = self
            .archive
            .by_name(name)
            .with_context(|| format!("Entry {:?} not found", name))?;
        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .with_context(|| format!("Failed to read entry {:?}", name))?;
        Ok(content)
    }

    /// Write a file entry to `dest`, creating parent directories and
    /// re-applying stored unix permission bits.
    ///
    /// Entries whose name is not enclosed in the archive root are refused.
    pub fn extract_entry<R: Runtime>(&mut self, runtime: &R, name: &str, dest: &Path) -> Result<()> {
        let mut entry = self
            .archive
            .by_name(name)
            .with_context(|| format!("Entry {:?} not found", name))?;
        if entry.enclosed_name().is_none() {
            anyhow::bail!("Entry {:?} has an unsafe path", name);
        }

        if let Some(parent) = dest.parent() {
            runtime.create_dir_all(parent)?;
        }
        let mut writer = runtime.create_file(dest)?;
        std::io::copy(&mut entry, &mut writer)
            .with_context(|| format!("Failed to extract {:?} to {:?}", name, dest))?;
        drop(writer);

        if let Some(mode) = entry.unix_mode()
            && let Err(e) = runtime.set_permissions(dest, mode)
        {
            debug!("Failed to set permissions on {:?}: {}", dest, e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RealRuntime;
    use crate::test_utils::zip_bytes;
    use tempfile::tempdir;

    #[test]
    fn test_list_and_read() {
        let mut container =
            ZipContainer::from_bytes(zip_bytes(&[("a.txt", "alpha"), ("dir/b.txt", "beta")]))
                .unwrap();

        assert_eq!(container.entry_names().len(), 2);
        assert_eq!(container.read_entry("dir/b.txt").unwrap(), b"beta");
        assert!(container.read_entry("missing.txt").is_err());
    }

    #[test]
    fn test_rejects_non_zip() {
        assert!(ZipContainer::from_bytes(b"not a zip".to_vec()).is_err());
    }

    #[test]
    fn test_extract_entry_creates_parents() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("a.tth");
        std::fs::write(&archive, zip_bytes(&[("bin/tool", "#!/bin/sh")])).unwrap();

        let runtime = RealRuntime;
        let mut container = ZipContainer::open(&runtime, &archive).unwrap();
        let dest = dir.path().join("out/nested/tool");
        container.extract_entry(&runtime, "bin/tool", &dest).unwrap();

        assert_eq!(std::fs::read_to_string(dest).unwrap(), "#!/bin/sh");
    }

    #[test]
    fn test_extract_entry_refuses_unsafe_names() {
        let dir = tempdir().unwrap();
        let mut container =
            ZipContainer::from_bytes(zip_bytes(&[("../../escaped.txt", "pwned")])).unwrap();

        let runtime = RealRuntime;
        let dest = dir.path().join("out/escaped.txt");
        assert!(container.extract_entry(&runtime, "../../escaped.txt", &dest).is_err());
        assert!(!dest.exists());
    }
}
