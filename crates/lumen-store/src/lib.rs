//! lumen-store: records of saved edits.
//!
//! An [`EditedPhoto`] pairs the applied filter and intensity with the
//! JPEG-encoded result. Records live behind the [`PhotoStore`] trait and
//! come back newest first; [`DirectoryStore`] keeps them on disk.

#![warn(missing_docs)]

pub mod error;
pub mod record;
pub mod store;

pub use error::StoreError;
pub use record::{EditedPhoto, RecordSummary, StoreConfig};
pub use store::{DirectoryStore, MemoryStore, PhotoStore};
