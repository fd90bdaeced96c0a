use serde::{Deserialize, Serialize};

use super::Metadata;
use crate::version::Version;

/// Persisted proof that a tooth is installed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InstalledRecord {
    #[serde(flatten)]
    pub metadata: Metadata,
    /// True only when the user asked for this tooth directly.
    #[serde(default)]
    pub is_manually_installed: bool,
}

impl InstalledRecord {
    pub fn new(metadata: Metadata, is_manually_installed: bool) -> Self {
        Self {
            metadata,
            is_manually_installed,
        }
    }

    pub fn tooth(&self) -> &str {
        &self.metadata.tooth
    }

    pub fn version(&self) -> &Version {
        &self.metadata.version
    }

    pub fn depends_on(&self, tooth: &str) -> bool {
        self.metadata.dependencies.contains_key(tooth)
    }
}
