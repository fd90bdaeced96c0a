use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path};

use crate::context::STATE_DIR_NAME;
use crate::version::{Version, VersionRange};

/// Name of the metadata entry embedded in every tooth archive.
pub const METADATA_FILE_NAME: &str = "tooth.json";

/// Metadata embedded in a tooth archive as `tooth.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Metadata {
    /// Globally unique tooth path, e.g. `github.com/tooth-hub/example`
    pub tooth: String,
    pub version: Version,
    #[serde(default)]
    pub dependencies: BTreeMap<String, VersionRange>,
    #[serde(default, skip_serializing_if = "Information::is_empty")]
    pub information: Information,
    #[serde(default)]
    pub placement: Vec<Placement>,
    #[serde(default)]
    pub possession: Vec<String>,
}

/// Descriptive fields shown by `lip show`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Information {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

impl Information {
    pub fn is_empty(&self) -> bool {
        self == &Information::default()
    }
}

/// Maps an archive entry (or directory, when ending in `/`) to a
/// workspace-relative destination.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub source: String,
    pub destination: String,
}

impl Metadata {
    /// Decode and validate `tooth.json` content.
    pub fn from_json(content: &[u8]) -> Result<Self> {
        let metadata: Metadata =
            serde_json::from_slice(content).context("Failed to parse tooth.json")?;
        metadata.validate()?;
        Ok(metadata)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to encode tooth metadata")
    }

    /// Reject metadata that would write outside the workspace or into
    /// lip's state directory.
    pub fn validate(&self) -> Result<()> {
        if self.tooth.trim().is_empty() {
            anyhow::bail!("tooth path is empty");
        }
        for placement in &self.placement {
            if placement.source.is_empty() {
                anyhow::bail!("placement source is empty");
            }
            ensure_workspace_relative(&placement.destination)
                .with_context(|| format!("invalid placement destination {:?}", placement.destination))?;
        }
        for entry in &self.possession {
            ensure_workspace_relative(entry)
                .with_context(|| format!("invalid possession entry {:?}", entry))?;
        }
        Ok(())
    }

    /// `tooth@version`, as printed in logs and listings.
    pub fn display_name(&self) -> String {
        format!("{}@{}", self.tooth, self.version)
    }
}

fn ensure_workspace_relative(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        anyhow::bail!("path is empty");
    }
    let path = Path::new(path);
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => anyhow::bail!("path must stay inside the workspace"),
        }
    }
    let first = path.components().find_map(|c| match c {
        Component::Normal(part) => Some(part),
        _ => None,
    });
    if first.is_some_and(|part| part == STATE_DIR_NAME) {
        anyhow::bail!("path must not reach into {}", STATE_DIR_NAME);
    }
    Ok(())
}
