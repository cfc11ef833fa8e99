// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the document storage layout.

use std::path::{Path, PathBuf};

/// Default base directory for all persistent documents.
pub const DATA_ROOT: &str = "./data";

/// Name of the per-collection directory holding unique-key markers.
pub const UNIQUE_DIR: &str = "_unique";

/// Storage path utilities for the document store.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all documents.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Collection Paths ==========

    /// Directory containing every document of a collection.
    pub fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    /// Path to a single document file.
    pub fn document(&self, collection: &str, id: &str) -> PathBuf {
        self.collection_dir(collection).join(format!("{id}.json"))
    }

    // ========== Unique-Key Paths ==========

    /// Directory holding the unique-key markers of a collection.
    pub fn unique_dir(&self, collection: &str) -> PathBuf {
        self.collection_dir(collection).join(UNIQUE_DIR)
    }

    /// Path to the marker file for a hashed unique key.
    pub fn unique_key(&self, collection: &str, digest: &str) -> PathBuf {
        self.unique_dir(collection).join(digest)
    }

    /// Probe file used by the readiness check.
    pub fn health_probe(&self) -> PathBuf {
        self.root.join(".health_check")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_paths_live_under_collection() {
        let paths = StoragePaths::new("/srv/portfolio");
        assert_eq!(
            paths.document("skills", "abc"),
            PathBuf::from("/srv/portfolio/skills/abc.json")
        );
        assert_eq!(
            paths.unique_key("skills", "ff00"),
            PathBuf::from("/srv/portfolio/skills/_unique/ff00")
        );
    }

    #[test]
    fn default_root_is_local_data_dir() {
        assert_eq!(StoragePaths::default().root(), Path::new(DATA_ROOT));
    }
}
