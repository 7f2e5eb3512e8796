use std::path::{Path, PathBuf};

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};

use super::{AnchorStore, Subscribers, ring_tail, tail};
use crate::anchor::Anchor;
use crate::error::{AnchorError, Result};
use crate::io::{object_from_json, object_to_json};

#[derive(Debug, Default, Serialize, Deserialize)]
struct AnchorTable {
    next_id: i64,
    anchors: Vec<Anchor>,
}

/// Anchor table kept as a single JSON document, rewritten on every insert.
pub struct JsonFileStore {
    path: PathBuf,
    table: AnchorTable,
    subscribers: Subscribers,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<JsonFileStore> {
        let path = path.as_ref().to_path_buf();
        let table = if path.exists() {
            object_from_json(&path).map_err(unavailable)?
        } else {
            AnchorTable {
                next_id: 1,
                anchors: Vec::new(),
            }
        };
        log::debug!(
            "opened anchor store {} with {} rows",
            path.display(),
            table.anchors.len()
        );
        Ok(JsonFileStore {
            path,
            table,
            subscribers: Subscribers::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.table.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.anchors.is_empty()
    }
}

fn unavailable(e: AnchorError) -> AnchorError {
    match e {
        AnchorError::PersistenceUnavailable(_) => e,
        other => AnchorError::PersistenceUnavailable(other.to_string()),
    }
}

impl AnchorStore for JsonFileStore {
    fn insert(&mut self, anchor: &Anchor) -> Result<i64> {
        let id = self.table.next_id.max(1);
        let mut row = anchor.clone();
        row.id = Some(id);
        self.table.anchors.push(row);
        self.table.next_id = id + 1;
        if let Err(e) = object_to_json(&self.path, &self.table) {
            self.table.anchors.pop();
            self.table.next_id = id;
            return Err(unavailable(e));
        }
        self.subscribers.publish(&ring_tail(&self.table.anchors));
        Ok(id)
    }

    fn latest(&self, n: usize) -> Result<Vec<Anchor>> {
        Ok(tail(&self.table.anchors, n))
    }

    fn subscribe(&mut self) -> Receiver<Vec<Anchor>> {
        self.subscribers.add()
    }
}
