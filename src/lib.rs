pub mod application;
pub mod archive;
pub mod commands;
pub mod context;
pub mod download;
pub mod error;
pub mod http;
pub mod install;
pub mod package;
pub mod provider;
pub mod resolver;
pub mod runtime;
pub mod specifier;
pub mod version;

/// Test utilities shared by the unit tests.
#[cfg(test)]
pub mod test_utils {
    use std::io::{Cursor, Write};
    use std::path::{Path, PathBuf};

    use crate::context::LipContext;
    use crate::package::{METADATA_FILE_NAME, Metadata, Placement, escape_file_name};
    use crate::resolver::ResolvedArchive;
    use crate::version::{Version, VersionRange};

    /// Returns a test home directory path based on the platform.
    /// - Unix: `/home/user`
    /// - Windows: `C:\Users\user`
    pub fn test_home() -> PathBuf {
        #[cfg(not(windows))]
        {
            PathBuf::from("/home/user")
        }
        #[cfg(windows)]
        {
            PathBuf::from(r"C:\Users\user")
        }
    }

    /// Returns a test workspace (server directory) path based on the platform.
    /// - Unix: `/srv/bds`
    /// - Windows: `C:\srv\bds`
    pub fn test_workspace() -> PathBuf {
        #[cfg(not(windows))]
        {
            PathBuf::from("/srv/bds")
        }
        #[cfg(windows)]
        {
            PathBuf::from(r"C:\srv\bds")
        }
    }

    /// Context rooted in a temporary directory: workspace in `ws`, cache in
    /// `cache`, leaving `root` itself free for fixture archives.
    pub fn test_context(root: &Path) -> LipContext {
        LipContext::new(root.join("ws"), root.join("cache"), "https://proxy.test")
    }

    /// Zip archive holding `files` as `(entry name, content)`.
    pub fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
        use ::zip::CompressionMethod;
        use ::zip::ZipWriter;
        use ::zip::write::FileOptions;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    /// `tooth.json` content with the given dependencies and nothing placed.
    pub fn tooth_json(tooth: &str, version: &str, dependencies: &[(&str, &str)]) -> String {
        let mut fixture = ToothFixture::new(tooth, version);
        for (dependency, range) in dependencies {
            fixture = fixture.depends(dependency, range);
        }
        fixture.metadata().to_json().unwrap()
    }

    /// Builder for tooth archives written to disk.
    pub struct ToothFixture {
        metadata: Metadata,
        files: Vec<(String, String)>,
    }

    impl ToothFixture {
        pub fn new(tooth: &str, version: &str) -> Self {
            Self {
                metadata: Metadata {
                    tooth: tooth.to_string(),
                    version: Version::parse(version).unwrap(),
                    dependencies: Default::default(),
                    information: Default::default(),
                    placement: vec![],
                    possession: vec![],
                },
                files: vec![],
            }
        }

        pub fn file(mut self, name: &str, content: &str) -> Self {
            self.files.push((name.to_string(), content.to_string()));
            self
        }

        pub fn place(mut self, source: &str, destination: &str) -> Self {
            self.metadata.placement.push(Placement {
                source: source.to_string(),
                destination: destination.to_string(),
            });
            self
        }

        pub fn possess(mut self, entry: &str) -> Self {
            self.metadata.possession.push(entry.to_string());
            self
        }

        pub fn depends(mut self, tooth: &str, range: &str) -> Self {
            let range: VersionRange = range.parse().unwrap();
            self.metadata.dependencies.insert(tooth.to_string(), range);
            self
        }

        pub fn metadata(&self) -> &Metadata {
            &self.metadata
        }

        pub fn bytes(&self) -> Vec<u8> {
            let metadata = self.metadata.to_json().unwrap();
            let mut entries: Vec<(&str, &str)> = vec![(METADATA_FILE_NAME, metadata.as_str())];
            entries.extend(self.files.iter().map(|(n, c)| (n.as_str(), c.as_str())));
            zip_bytes(&entries)
        }

        /// Write `<escaped tooth>@<version>.tth` into `dir`.
        pub fn write(&self, dir: &Path) -> ResolvedArchive {
            let path = dir.join(format!(
                "{}@{}.tth",
                escape_file_name(&self.metadata.tooth),
                self.metadata.version
            ));
            std::fs::create_dir_all(dir).unwrap();
            std::fs::write(&path, self.bytes()).unwrap();
            ResolvedArchive {
                specifier: self.metadata.tooth.clone(),
                metadata: self.metadata.clone(),
                path,
            }
        }
    }
}
