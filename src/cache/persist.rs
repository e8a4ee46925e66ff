//! Snapshot import/export.
//!
//! A snapshot is the JSON encoding of the live entry map. Values are tagged
//! with their kind and expirations are absolute RFC 3339 instants, so a
//! snapshot can be loaded into a different process later.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::cache::{Entry, Store};
use crate::error::Result;

impl Store {
    // == Save ==
    /// Writes every live entry to `writer`.
    ///
    /// Expired entries are not exported, so they are lost in a round trip.
    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        let items = self.items();
        serde_json::to_writer(writer, &items)?;
        debug!(items = items.len(), "Snapshot saved");
        Ok(())
    }

    /// Saves to `path`, creating the file or truncating an existing one.
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    // == Load ==
    /// Merges a snapshot from `reader`, skipping keys that hold a live entry.
    ///
    /// Nothing is merged unless the whole snapshot decodes. Returns the
    /// number of entries inserted.
    pub fn load<R: Read>(&self, reader: R) -> Result<usize> {
        let items: HashMap<String, Entry> = serde_json::from_reader(reader)?;
        let offered = items.len();
        let merged = self.merge(items);
        debug!(offered, merged, "Snapshot loaded");
        Ok(merged)
    }

    /// Loads a snapshot from `path`.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let reader = BufReader::new(File::open(path)?);
        self.load(reader)
    }
}
