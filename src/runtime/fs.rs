//! File system operations (read, write, directory, permissions).

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self, contents))]
    pub(crate) fn write_impl(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_to_string_impl(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn rename_impl(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).with_context(|| format!("Failed to move {:?} to {:?}", from, to))
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn create_dir_all_impl(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("Failed to create directory {:?}", path))
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_file_impl(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("Failed to remove file {:?}", path))
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn exists_impl(&self, path: &Path) -> bool {
        path.exists()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_dir_impl(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(path)
            .with_context(|| format!("Failed to read directory {:?}", path))?
            .map(|entry| Ok(entry?.path()))
            .collect::<Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn create_file_impl(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>> {
        let file =
            fs::File::create(path).with_context(|| format!("Failed to create file {:?}", path))?;
        Ok(Box::new(file))
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn open_impl(&self, path: &Path) -> Result<Box<dyn std::io::Read + Send>> {
        let file = fs::File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        Ok(Box::new(file))
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_dir_all_impl(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path).with_context(|| format!("Failed to remove directory {:?}", path))
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn is_dir_impl(&self, path: &Path) -> bool {
        path.is_dir()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn file_size_impl(&self, path: &Path) -> Result<u64> {
        Ok(fs::metadata(path)
            .with_context(|| format!("Failed to stat {:?}", path))?
            .len())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn set_permissions_impl(&self, path: &Path, mode: u32) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(mode))
                .with_context(|| format!("Failed to set permissions on {:?}", path))?;
        }
        #[cfg(not(unix))]
        {
            let _ = (path, mode);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};
    use std::io::{Read, Write};
    use tempfile::tempdir;

    #[test]
    fn test_write_read_rename_remove() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let record = dir.path().join("record.json");

        runtime.write(&record, b"{}").unwrap();
        assert_eq!(runtime.read_to_string(&record).unwrap(), "{}");
        assert_eq!(runtime.file_size(&record).unwrap(), 2);

        let moved = dir.path().join("moved.json");
        runtime.rename(&record, &moved).unwrap();
        assert!(!runtime.exists(&record));
        assert!(runtime.exists(&moved));

        runtime.remove_file(&moved).unwrap();
        assert!(!runtime.exists(&moved));
    }

    #[test]
    fn test_directories_are_listed_sorted() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let plugins = dir.path().join("plugins");

        runtime.create_dir_all(&plugins.join("b")).unwrap();
        runtime.create_dir_all(&plugins.join("a")).unwrap();
        assert!(runtime.is_dir(&plugins));

        let entries = runtime.read_dir(&plugins).unwrap();
        assert_eq!(entries, vec![plugins.join("a"), plugins.join("b")]);

        runtime.remove_dir_all(&plugins).unwrap();
        assert!(!runtime.exists(&plugins));
    }

    #[test]
    fn test_streamed_file() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive.tth");

        {
            let mut writer = runtime.create_file(&path).unwrap();
            writer.write_all(b"PK").unwrap();
        }

        let mut content = Vec::new();
        runtime.open(&path).unwrap().read_to_end(&mut content).unwrap();
        assert_eq!(content, b"PK");
    }

    #[test]
    fn test_errors_carry_path() {
        let runtime = RealRuntime;
        let err = runtime
            .remove_file(std::path::Path::new("/nonexistent/lip/file"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/lip/file"));
    }
}
