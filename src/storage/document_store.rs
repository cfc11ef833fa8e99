// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File-backed JSON document store.
//!
//! Every collection is a directory under the data root and every document is
//! a single `{id}.json` file. Single-document writes are atomic (temp file +
//! rename); there are no multi-document transactions.
//!
//! ## Unique-key index
//!
//! Uniqueness constraints are enforced by the filesystem rather than by a
//! read-then-write check: a key is reserved by creating its marker file with
//! `create_new`, which succeeds for exactly one writer. The marker stores the
//! id of the holding document so the index doubles as a lookup table.
//!
//! ```text
//! {root}/
//!   skills/
//!     {id}.json
//!     _unique/
//!       {sha256(key)}   # {"holder": "{id}", "reserved_at": "..."}
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::StoragePaths;

/// A marker whose holder document is missing is only reclaimed after this
/// long, so an in-flight create is never mistaken for a crashed one.
const STALE_RESERVATION_SECS: i64 = 30;

/// Error type for document storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Document not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// Document already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// Storage not initialized
    #[error("Storage not initialized")]
    NotInitialized,
    /// Data read back does not match what was written
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(e.to_string()),
            io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(e.to_string()),
            _ => StorageError::Io(e),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Contents of a unique-key marker file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct KeyMarker {
    holder: String,
    reserved_at: DateTime<Utc>,
}

/// Hash a unique key into a filesystem-safe marker name.
pub fn key_digest(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Process-wide document store.
///
/// Shared by reference across all concurrent requests; it holds no
/// in-process locks and relies on per-file atomicity only.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    paths: StoragePaths,
    initialized: bool,
}

impl DocumentStore {
    /// Create a new DocumentStore instance.
    ///
    /// Does NOT create the data root. Call `initialize()` first.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            initialized: false,
        }
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Check if storage is initialized.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Create the data root and the given collection directories.
    ///
    /// Safe to call multiple times (idempotent).
    pub fn initialize(&mut self, collections: &[&str]) -> StorageResult<()> {
        fs::create_dir_all(self.paths.root())?;
        for collection in collections {
            fs::create_dir_all(self.paths.unique_dir(collection))?;
        }

        self.initialized = true;
        Ok(())
    }

    /// Verify the data root is writable with a write-read-delete probe.
    pub fn health_check(&self) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let probe = self.paths.health_probe();
        let probe_data = b"health_check_data";

        fs::write(&probe, probe_data)?;
        let read_back = fs::read(&probe)?;
        fs::remove_file(&probe)?;

        if read_back != probe_data {
            return Err(StorageError::IntegrityViolation(
                "Health check data mismatch".to_string(),
            ));
        }

        Ok(())
    }

    // ========== Documents ==========

    /// Check if a document exists.
    pub fn contains(&self, collection: &str, id: &str) -> bool {
        self.exists(self.paths.document(collection, id))
    }

    /// Read one document.
    pub fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> StorageResult<T> {
        let path = self.paths.document(collection, id);
        if !self.exists(&path) {
            return Err(StorageError::NotFound(format!("{collection}/{id}")));
        }
        self.read_json(path)
    }

    /// Write a new document. Fails if the id is already taken.
    pub fn insert<T: Serialize>(&self, collection: &str, id: &str, value: &T) -> StorageResult<()> {
        if self.contains(collection, id) {
            return Err(StorageError::AlreadyExists(format!("{collection}/{id}")));
        }
        self.write_json(self.paths.document(collection, id), value)
    }

    /// Overwrite an existing document.
    pub fn replace<T: Serialize>(&self, collection: &str, id: &str, value: &T) -> StorageResult<()> {
        if !self.contains(collection, id) {
            return Err(StorageError::NotFound(format!("{collection}/{id}")));
        }
        self.write_json(self.paths.document(collection, id), value)
    }

    /// Delete one document.
    pub fn remove(&self, collection: &str, id: &str) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }
        fs::remove_file(self.paths.document(collection, id))?;
        Ok(())
    }

    /// Read every document of a collection.
    ///
    /// Documents that fail to parse are skipped with a warning rather than
    /// failing the whole listing.
    pub fn list<T: DeserializeOwned>(&self, collection: &str) -> StorageResult<Vec<T>> {
        let ids = self.list_files(self.paths.collection_dir(collection), "json")?;

        let mut documents = Vec::with_capacity(ids.len());
        for id in ids {
            match self.read_json(self.paths.document(collection, &id)) {
                Ok(document) => documents.push(document),
                // Deleted between directory scan and read.
                Err(StorageError::NotFound(_)) => {}
                Err(e) => {
                    tracing::warn!(collection, id = %id, error = %e, "Skipping unreadable document");
                }
            }
        }

        Ok(documents)
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> StorageResult<usize> {
        Ok(self
            .list_files(self.paths.collection_dir(collection), "json")?
            .len())
    }

    // ========== Unique Keys ==========

    /// Atomically reserve `key` for `holder`.
    ///
    /// Returns `Ok(false)` when another document already holds the key.
    /// Reserving a key the same holder already owns succeeds.
    pub fn reserve_key(&self, collection: &str, key: &str, holder: &str) -> StorageResult<bool> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = self.paths.unique_key(collection, &key_digest(key));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        match self.create_marker(&path, holder) {
            Ok(()) => return Ok(true),
            Err(StorageError::AlreadyExists(_)) => {}
            Err(e) => return Err(e),
        }

        let Some(marker) = self.read_marker(&path)? else {
            // Marker is being written by a concurrent reservation.
            return Ok(false);
        };

        if marker.holder == holder {
            return Ok(true);
        }

        let stale = !self.contains(collection, &marker.holder)
            && Utc::now() - marker.reserved_at > Duration::seconds(STALE_RESERVATION_SECS);
        if !stale {
            return Ok(false);
        }

        tracing::warn!(collection, holder = %marker.holder, "Reclaiming stale unique-key marker");
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        match self.create_marker(&path, holder) {
            Ok(()) => Ok(true),
            Err(StorageError::AlreadyExists(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Release `key` if, and only if, it is held by `holder`.
    pub fn release_key(&self, collection: &str, key: &str, holder: &str) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = self.paths.unique_key(collection, &key_digest(key));
        match self.read_marker(&path)? {
            Some(marker) if marker.holder == holder => match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
            _ => Ok(()),
        }
    }

    /// Id of the document holding `key`, if any.
    pub fn lookup_key(&self, collection: &str, key: &str) -> StorageResult<Option<String>> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = self.paths.unique_key(collection, &key_digest(key));
        Ok(self.read_marker(&path)?.map(|marker| marker.holder))
    }

    fn create_marker(&self, path: &Path, holder: &str) -> StorageResult<()> {
        let marker = KeyMarker {
            holder: holder.to_string(),
            reserved_at: Utc::now(),
        };

        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        serde_json::to_writer(&mut file, &marker)?;
        file.flush()?;
        Ok(())
    }

    /// Read a marker; a missing or half-written marker reads as `None`.
    fn read_marker(&self, path: &Path) -> StorageResult<Option<KeyMarker>> {
        match fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes).ok()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ========== Generic JSON Operations ==========

    /// Read a JSON file and deserialize it.
    pub fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<T> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let value = serde_json::from_reader(reader)?;
        Ok(value)
    }

    /// Write a JSON file (atomic write via rename).
    pub fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Unique temp name so concurrent writers never share a temp file.
        let temp_path = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }

        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Check if a file exists.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        File::open(path.as_ref()).is_ok()
    }

    /// List the stems of all files in a directory with the given extension.
    pub fn list_files(&self, dir: impl AsRef<Path>, extension: &str) -> StorageResult<Vec<String>> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != extension) {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }
}
