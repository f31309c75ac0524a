//! Record storage.
//!
//! [`PhotoStore`] is the seam storage backends plug into.
//! [`MemoryStore`] keeps records in process; [`DirectoryStore`] persists
//! them to a gallery directory and is what the `lumen` binary uses.
//!
//! A gallery directory holds a versioned `gallery.json` index (record
//! metadata in insertion order) and one `<id>.jpg` file per record with
//! the encoded image bytes.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::record::EditedPhoto;

/// Storage for edited photo records.
pub trait PhotoStore {
    /// Store `record`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if a record with the same id is
    /// already stored. Persistent backends also return their I/O errors.
    fn insert(&mut self, record: EditedPhoto) -> Result<(), StoreError>;

    /// Look up a record by id.
    fn get(&self, id: Uuid) -> Option<&EditedPhoto>;

    /// All records, newest first. Records with equal timestamps are
    /// ordered by insertion, later first.
    fn recent(&self) -> Vec<&EditedPhoto>;

    /// Remove and return the record with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such record is stored.
    /// Persistent backends also return their I/O errors.
    fn delete(&mut self, id: Uuid) -> Result<EditedPhoto, StoreError>;

    /// Number of stored records.
    fn len(&self) -> usize;

    /// Returns `true` if no records are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store: records live in insertion order, deletes leave a
/// tombstone so slot indices stay stable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Vec<Option<EditedPhoto>>,
    index: HashMap<Uuid, usize>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Live records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &EditedPhoto> {
        self.slots.iter().flatten()
    }
}

impl PhotoStore for MemoryStore {
    fn insert(&mut self, record: EditedPhoto) -> Result<(), StoreError> {
        if self.index.contains_key(&record.id) {
            return Err(StoreError::DuplicateId(record.id));
        }
        debug!(id = %record.id, filter = %record.filter_name, "storing edited photo");
        self.index.insert(record.id, self.slots.len());
        self.slots.push(Some(record));
        Ok(())
    }

    fn get(&self, id: Uuid) -> Option<&EditedPhoto> {
        let &slot = self.index.get(&id)?;
        self.slots.get(slot)?.as_ref()
    }

    fn recent(&self) -> Vec<&EditedPhoto> {
        let mut live: Vec<(usize, &EditedPhoto)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(slot, record)| record.as_ref().map(|r| (slot, r)))
            .collect();
        live.sort_by(|(sa, a), (sb, b)| b.created_at.cmp(&a.created_at).then(sb.cmp(sa)));
        live.into_iter().map(|(_, record)| record).collect()
    }

    fn delete(&mut self, id: Uuid) -> Result<EditedPhoto, StoreError> {
        let slot = self.index.remove(&id).ok_or(StoreError::NotFound(id))?;
        let record = self
            .slots
            .get_mut(slot)
            .and_then(Option::take)
            .ok_or(StoreError::NotFound(id))?;
        debug!(%id, "deleted edited photo");
        Ok(record)
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}

/// On-disk index format version.
const INDEX_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct GalleryIndex {
    version: u32,
    records: Vec<IndexEntry>,
}

/// Record metadata as written to the index. The image bytes live in their
/// own file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    id: Uuid,
    created_at: DateTime<Utc>,
    filter_name: String,
    intensity: f64,
}

impl From<&EditedPhoto> for IndexEntry {
    fn from(record: &EditedPhoto) -> Self {
        Self {
            id: record.id,
            created_at: record.created_at,
            filter_name: record.filter_name.clone(),
            intensity: record.intensity,
        }
    }
}

/// A gallery persisted under one directory.
///
/// Records are loaded into memory on [`open`](Self::open); every insert
/// and delete rewrites the index through a temporary file and a rename,
/// so a crash leaves either the old or the new index in place.
#[derive(Debug)]
pub struct DirectoryStore {
    root: PathBuf,
    records: MemoryStore,
}

impl DirectoryStore {
    /// File name of the index inside the gallery directory.
    pub const INDEX_FILE: &'static str = "gallery.json";

    /// Open the gallery at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory, index or a photo file
    /// cannot be read, [`StoreError::Index`] for a corrupt index, and
    /// [`StoreError::UnsupportedVersion`] for an index from another
    /// format version.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;

        let mut records = MemoryStore::new();
        let index_path = root.join(Self::INDEX_FILE);
        match fs::read(&index_path) {
            Ok(bytes) => {
                let index: GalleryIndex =
                    serde_json::from_slice(&bytes).map_err(|source| StoreError::Index {
                        path: index_path.clone(),
                        source,
                    })?;
                if index.version != INDEX_VERSION {
                    return Err(StoreError::UnsupportedVersion {
                        found: index.version,
                        expected: INDEX_VERSION,
                    });
                }
                for entry in index.records {
                    let photo_path = photo_path(&root, entry.id);
                    let image_bytes = fs::read(&photo_path).map_err(|source| StoreError::Io {
                        path: photo_path,
                        source,
                    })?;
                    records.insert(EditedPhoto {
                        id: entry.id,
                        created_at: entry.created_at,
                        filter_name: entry.filter_name,
                        intensity: entry.intensity,
                        image_bytes,
                    })?;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(StoreError::Io {
                    path: index_path,
                    source,
                });
            }
        }

        debug!(root = %root.display(), records = records.len(), "opened gallery");
        Ok(Self { root, records })
    }

    /// The gallery directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write_index(&self, records: Vec<IndexEntry>) -> Result<(), StoreError> {
        let index_path = self.root.join(Self::INDEX_FILE);
        let index = GalleryIndex {
            version: INDEX_VERSION,
            records,
        };
        let json = serde_json::to_vec_pretty(&index).map_err(|source| StoreError::Index {
            path: index_path.clone(),
            source,
        })?;

        let tmp_path = self.root.join(format!("{}.tmp", Self::INDEX_FILE));
        fs::write(&tmp_path, json).map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &index_path).map_err(|source| StoreError::Io {
            path: index_path,
            source,
        })
    }
}

fn photo_path(root: &Path, id: Uuid) -> PathBuf {
    root.join(format!("{id}.jpg"))
}

impl PhotoStore for DirectoryStore {
    fn insert(&mut self, record: EditedPhoto) -> Result<(), StoreError> {
        if self.records.get(record.id).is_some() {
            return Err(StoreError::DuplicateId(record.id));
        }

        let photo = photo_path(&self.root, record.id);
        fs::write(&photo, &record.image_bytes).map_err(|source| StoreError::Io {
            path: photo.clone(),
            source,
        })?;

        let mut entries: Vec<IndexEntry> = self.records.records().map(IndexEntry::from).collect();
        entries.push(IndexEntry::from(&record));
        if let Err(err) = self.write_index(entries) {
            if let Err(cleanup) = fs::remove_file(&photo) {
                warn!(path = %photo.display(), error = %cleanup, "could not remove unindexed photo");
            }
            return Err(err);
        }

        self.records.insert(record)
    }

    fn get(&self, id: Uuid) -> Option<&EditedPhoto> {
        self.records.get(id)
    }

    fn recent(&self) -> Vec<&EditedPhoto> {
        self.records.recent()
    }

    fn delete(&mut self, id: Uuid) -> Result<EditedPhoto, StoreError> {
        if self.records.get(id).is_none() {
            return Err(StoreError::NotFound(id));
        }

        let entries = self
            .records
            .records()
            .filter(|record| record.id != id)
            .map(IndexEntry::from)
            .collect();
        self.write_index(entries)?;
        let record = self.records.delete(id)?;

        let photo = photo_path(&self.root, id);
        if let Err(err) = fs::remove_file(&photo) {
            warn!(path = %photo.display(), error = %err, "could not remove deleted photo");
        }
        Ok(record)
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
