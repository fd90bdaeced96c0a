//! Tooth metadata and installed-tooth records.
//!
//! This module provides the `tooth.json` model, the persisted record built
//! from it, and the store that keeps one record per installed tooth.

mod meta;
mod record;
mod repository;

pub use meta::{Information, METADATA_FILE_NAME, Metadata, Placement};
pub use record::InstalledRecord;
pub use repository::{RecordStore, escape_file_name};
