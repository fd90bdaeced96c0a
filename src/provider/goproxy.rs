//! Go module proxy implementation.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use crate::error::LipError;
use crate::http::{HttpClient, NonRetryableError};
use crate::version::Version;

use super::ToothRepository;

/// Repository speaking the GOPROXY protocol.
pub struct GoProxyRepository {
    http_client: HttpClient,
    base_url: String,
}

impl GoProxyRepository {
    pub fn new(http_client: HttpClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn list_url(&self, tooth: &str) -> String {
        format!("{}/{}/@v/list", self.base_url, escape_module_path(tooth))
    }
}

#[async_trait]
impl ToothRepository for GoProxyRepository {
    #[tracing::instrument(skip(self))]
    async fn list_versions(&self, tooth: &str) -> Result<Vec<Version>> {
        let url = self.list_url(tooth);
        let body = self.http_client.get_text(&url).await.map_err(|e| {
            match e.downcast_ref::<NonRetryableError>() {
                Some(classified) if classified.is_not_found() => LipError::PackageNotFound {
                    tooth: tooth.to_string(),
                },
                _ => LipError::RepositoryUnreachable {
                    tooth: tooth.to_string(),
                    reason: format!("{:#}", e),
                },
            }
        })?;

        Ok(parse_version_list(&body))
    }

    fn download_url(&self, tooth: &str, version: &Version) -> String {
        format!(
            "{}/{}/@v/v{}.zip",
            self.base_url,
            escape_module_path(tooth),
            version
        )
    }
}

/// Go module case-encoding: every uppercase letter becomes `!` + lowercase.
pub fn escape_module_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Versions in listing order; lines that are not plain `vX.Y.Z` are skipped.
fn parse_version_list(body: &str) -> Vec<Version> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match Version::parse(line) {
            Ok(version) => Some(version),
            Err(e) => {
                debug!("Skipping version {:?}: {}", line, e);
                None
            }
        })
        .collect()
}
