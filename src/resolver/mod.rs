//! Dependency resolution.
//!
//! Starting from the root specifiers, the resolver fetches each archive,
//! reads its dependencies and queues one exact requirement per dependency.
//! Selection is greedy: the first version (in repository order) satisfying
//! a range is taken and never revisited.

mod plan;

use anyhow::Result;
use log::{debug, info};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use crate::archive::ToothArchive;
use crate::download::{Downloader, ToothCache};
use crate::error::LipError;
use crate::package::Metadata;
use crate::provider::ToothRepository;
use crate::runtime::Runtime;
use crate::specifier::{DirectSpecifier, RequirementSpecifier, Specifier};
use crate::version::{Version, VersionRange, select_first};

pub use plan::plan;

/// A fetched archive and the metadata read from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArchive {
    /// Canonical form of the specifier that produced this archive.
    pub specifier: String,
    pub metadata: Metadata,
    pub path: PathBuf,
}

impl ResolvedArchive {
    pub fn tooth(&self) -> &str {
        &self.metadata.tooth
    }

    pub fn version(&self) -> &Version {
        &self.metadata.version
    }
}

pub struct Resolver<'a, R: Runtime> {
    runtime: &'a R,
    repository: &'a dyn ToothRepository,
    downloader: &'a dyn Downloader,
    cache: ToothCache<'a, R>,
}

impl<'a, R: Runtime> Resolver<'a, R> {
    pub fn new(
        runtime: &'a R,
        repository: &'a dyn ToothRepository,
        downloader: &'a dyn Downloader,
        cache_dir: PathBuf,
    ) -> Self {
        Self {
            runtime,
            repository,
            downloader,
            cache: ToothCache::new(runtime, cache_dir),
        }
    }

    /// Expand `roots` into the flat set of archives they need.
    ///
    /// Archives are returned in the order they were fetched. Each canonical
    /// specifier is fetched at most once. Any failure aborts the walk;
    /// downloaded archives stay cached.
    #[tracing::instrument(skip_all)]
    pub async fn resolve(&self, roots: &[Specifier]) -> Result<Vec<ResolvedArchive>> {
        let mut queue: VecDeque<Specifier> = roots.iter().cloned().collect();
        let mut seen: HashSet<String> = HashSet::new();
        let mut versions: HashMap<String, Vec<Version>> = HashMap::new();
        let mut resolved = Vec::new();

        while let Some(specifier) = queue.pop_front() {
            let key = specifier.to_string();
            if seen.contains(&key) {
                debug!("{} already fetched", key);
                continue;
            }

            info!("Fetching {}...", key);
            let archive = self.fetch(&specifier, &mut versions).await?;

            for (dependency, range) in &archive.metadata.dependencies {
                let version = self
                    .select_version(dependency, range, &archive.metadata.tooth, &mut versions)
                    .await?;
                debug!("{} requires {}@{}", archive.tooth(), dependency, version);
                queue.push_back(RequirementSpecifier::exact(dependency.as_str(), version).into());
            }

            seen.insert(key);
            resolved.push(archive);
        }

        Ok(resolved)
    }

    async fn fetch(
        &self,
        specifier: &Specifier,
        versions: &mut HashMap<String, Vec<Version>>,
    ) -> Result<ResolvedArchive> {
        let key = specifier.to_string();

        let path = match specifier {
            Specifier::Requirement(requirement) => {
                let version = self
                    .select_version(&requirement.tooth, &requirement.range, &key, versions)
                    .await?;
                let url = self.repository.download_url(&requirement.tooth, &version);
                let path = self.cache.requirement_path(&requirement.tooth, &version);
                self.cache.fetch(self.downloader, &url, &path).await?
            }
            Specifier::Direct(DirectSpecifier::Url(url)) => {
                let path = self.cache.url_path(url);
                self.cache.fetch(self.downloader, url, &path).await?
            }
            Specifier::Direct(DirectSpecifier::Path(path)) => PathBuf::from(path),
        };

        let metadata = ToothArchive::open(self.runtime, &path)?.into_metadata();

        if let Specifier::Requirement(requirement) = specifier
            && metadata.tooth != requirement.tooth
        {
            self.cache.discard(&path);
            return Err(LipError::PackagePathMismatch {
                specifier: key,
                actual: metadata.tooth,
            }
            .into());
        }

        Ok(ResolvedArchive {
            specifier: key,
            metadata,
            path,
        })
    }

    /// First version of `tooth`, in repository order, inside `range`.
    async fn select_version(
        &self,
        tooth: &str,
        range: &VersionRange,
        required_by: &str,
        versions: &mut HashMap<String, Vec<Version>>,
    ) -> Result<Version> {
        if !versions.contains_key(tooth) {
            let listed = self.repository.list_versions(tooth).await?;
            versions.insert(tooth.to_string(), listed);
        }

        let candidates = versions.get(tooth).map(Vec::as_slice).unwrap_or_default();
        select_first(candidates, range).copied().ok_or_else(|| {
            LipError::UnsatisfiableDependency {
                tooth: tooth.to_string(),
                range: range.to_string(),
                required_by: required_by.to_string(),
            }
            .into()
        })
    }
}
