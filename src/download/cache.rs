use anyhow::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};

use super::Downloader;
use crate::package::escape_file_name;
use crate::runtime::Runtime;
use crate::version::Version;

pub const ARCHIVE_EXTENSION: &str = "tth";
const PARTIAL_EXTENSION: &str = "part";

/// Local store of downloaded archives.
///
/// Requirement archives are keyed by `(tooth, version)`, remote direct
/// archives by their URL. A download lands in a `.part` sibling and is only
/// renamed into place once complete.
pub struct ToothCache<'a, R: Runtime> {
    runtime: &'a R,
    cache_dir: PathBuf,
}

/// Summary printed by `lip cache info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInfo {
    pub dir: PathBuf,
    pub entries: usize,
    pub bytes: u64,
}

impl<'a, R: Runtime> ToothCache<'a, R> {
    pub fn new(runtime: &'a R, cache_dir: PathBuf) -> Self {
        Self { runtime, cache_dir }
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns: `<cache_dir>/<escaped tooth>@<version>.tth`
    pub fn requirement_path(&self, tooth: &str, version: &Version) -> PathBuf {
        self.cache_dir.join(format!(
            "{}@{}.{}",
            escape_file_name(tooth),
            version,
            ARCHIVE_EXTENSION
        ))
    }

    /// Returns: `<cache_dir>/<escaped url>`
    pub fn url_path(&self, url: &str) -> PathBuf {
        self.cache_dir.join(escape_file_name(url))
    }

    /// Return `path`, downloading `url` into it first unless it is cached.
    #[tracing::instrument(skip(self, downloader))]
    pub async fn fetch(&self, downloader: &dyn Downloader, url: &str, path: &Path) -> Result<PathBuf> {
        if self.runtime.exists(path) {
            debug!("Cache hit for {} at {:?}", url, path);
            return Ok(path.to_path_buf());
        }

        if !self.runtime.exists(&self.cache_dir) {
            self.runtime.create_dir_all(&self.cache_dir)?;
        }

        let partial = partial_path(path);
        if let Err(e) = downloader.download(url, &partial).await {
            self.discard(&partial);
            return Err(e);
        }
        self.runtime.rename(&partial, path)?;

        Ok(path.to_path_buf())
    }

    /// Best-effort removal of a cached artifact.
    pub fn discard(&self, path: &Path) {
        if self.runtime.exists(path)
            && let Err(e) = self.runtime.remove_file(path)
        {
            debug!("Failed to discard {:?}: {}", path, e);
        }
    }

    pub fn info(&self) -> Result<CacheInfo> {
        let mut info = CacheInfo {
            dir: self.cache_dir.clone(),
            entries: 0,
            bytes: 0,
        };
        if !self.runtime.exists(&self.cache_dir) {
            return Ok(info);
        }

        for path in self.runtime.read_dir(&self.cache_dir)? {
            if self.runtime.is_dir(&path) {
                continue;
            }
            info.entries += 1;
            info.bytes += self.runtime.file_size(&path)?;
        }
        Ok(info)
    }

    pub fn purge(&self) -> Result<()> {
        if self.runtime.exists(&self.cache_dir) {
            info!("Removing cache directory {:?}", self.cache_dir);
            self.runtime.remove_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(PARTIAL_EXTENSION);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::MockDownloader;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::{always, eq};
    use tempfile::tempdir;

    #[test]
    fn test_paths() {
        let runtime = MockRuntime::new();
        let cache = ToothCache::new(&runtime, PathBuf::from("/cache"));

        assert_eq!(
            cache.requirement_path("example.com/a", &Version::new(1, 0, 0)),
            PathBuf::from("/cache/example.com%2Fa@1.0.0.tth")
        );
        assert_eq!(
            cache.url_path("https://x.example/a.tth"),
            PathBuf::from("/cache/https%3A%2F%2Fx.example%2Fa.tth")
        );
        assert_eq!(
            partial_path(Path::new("/cache/a.tth")),
            PathBuf::from("/cache/a.tth.part")
        );
    }

    #[tokio::test]
    async fn test_fetch_hit_skips_download() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .with(eq(PathBuf::from("/cache/a.tth")))
            .returning(|_| true);

        // Strict mock: any download call fails the test.
        let downloader = MockDownloader::new();
        let cache = ToothCache::new(&runtime, PathBuf::from("/cache"));

        let path = cache
            .fetch(&downloader, "https://x/a.zip", Path::new("/cache/a.tth"))
            .await
            .unwrap();
        assert_eq!(path, PathBuf::from("/cache/a.tth"));
    }

    #[tokio::test]
    async fn test_fetch_miss_downloads_then_renames() {
        let dir = tempdir().unwrap();
        let runtime = RealRuntime;
        let cache = ToothCache::new(&runtime, dir.path().join("cache"));
        let target = cache.requirement_path("example.com/a", &Version::new(1, 0, 0));

        let mut downloader = MockDownloader::new();
        let expected_partial = partial_path(&target);
        downloader
            .expect_download()
            .with(eq("https://x/a.zip"), eq(expected_partial))
            .times(1)
            .returning(|_, dest| {
                std::fs::write(dest, b"zip").unwrap();
                Ok(())
            });

        let path = cache
            .fetch(&downloader, "https://x/a.zip", &target)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"zip");
        assert!(!partial_path(&target).exists());
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_no_entry() {
        let dir = tempdir().unwrap();
        let runtime = RealRuntime;
        let cache = ToothCache::new(&runtime, dir.path().join("cache"));
        let target = cache.url_path("https://x/a.tth");

        let mut downloader = MockDownloader::new();
        downloader
            .expect_download()
            .with(always(), always())
            .returning(|_, dest| {
                std::fs::write(dest, b"half").unwrap();
                Err(anyhow::anyhow!("connection reset"))
            });

        assert!(
            cache
                .fetch(&downloader, "https://x/a.tth", &target)
                .await
                .is_err()
        );
        assert!(!target.exists());
        assert!(!partial_path(&target).exists());
    }

    #[test]
    fn test_info_and_purge() {
        let dir = tempdir().unwrap();
        let runtime = RealRuntime;
        let cache = ToothCache::new(&runtime, dir.path().join("cache"));

        assert_eq!(cache.info().unwrap().entries, 0);

        std::fs::create_dir_all(cache.dir()).unwrap();
        std::fs::write(cache.dir().join("a.tth"), b"1234").unwrap();
        std::fs::write(cache.dir().join("b.tth"), b"56").unwrap();

        let info = cache.info().unwrap();
        assert_eq!(info.entries, 2);
        assert_eq!(info.bytes, 6);

        cache.purge().unwrap();
        assert!(!cache.dir().exists());
        cache.purge().unwrap();
    }
}
