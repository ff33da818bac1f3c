//! # MetadataTable
//!
//! Bidirectional mapping between document ids and index positions, plus
//! the opaque metadata stored alongside each document.
//!
//! The forward map (`document_id -> DocumentRecord`) is the source of
//! truth. A reverse map (`position -> document_id`) is maintained in
//! lockstep so that resolving a search hit back to its document is O(1)
//! instead of a scan over every record.
//!
//! Removing a record drops both directions of the mapping but **not** the
//! underlying vector — the index is append-only, so the vector lingers as
//! a tombstone that no longer resolves to any document. The store facade
//! filters those out of search results.
//!
//! Only the forward map is serialized; the reverse map is rebuilt when a
//! snapshot is loaded.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::error::StoreError;

/// Everything the table knows about one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// The document's slot in the embedding index.
    pub position: usize,
    /// Opaque caller-supplied metadata, returned verbatim with search hits.
    pub metadata: HashMap<String, JsonValue>,
}

/// Document id <-> position mapping with O(1) lookups in both directions.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    /// `document_id -> record`. The serialized representation.
    documents: HashMap<String, DocumentRecord>,
    /// `position -> document_id`, rebuilt from `documents` on load.
    by_position: HashMap<usize, String>,
}

impl MetadataTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a table from a forward map, reconstructing the reverse map.
    ///
    /// Fails if two documents claim the same position — that can only
    /// happen with a hand-edited or corrupt snapshot.
    pub fn from_documents(documents: HashMap<String, DocumentRecord>) -> Result<Self, String> {
        let mut by_position = HashMap::with_capacity(documents.len());
        for (document_id, record) in &documents {
            if let Some(other) = by_position.insert(record.position, document_id.clone()) {
                return Err(format!(
                    "documents '{}' and '{}' both map to position {}",
                    other, document_id, record.position
                ));
            }
        }
        Ok(Self {
            documents,
            by_position,
        })
    }

    /// Record a document at `position`.
    ///
    /// # Errors
    /// [`StoreError::DuplicateKey`] if `document_id` is already present.
    /// Overwriting is never implicit; remove the old record first.
    pub fn put(
        &mut self,
        document_id: &str,
        position: usize,
        metadata: HashMap<String, JsonValue>,
    ) -> Result<(), StoreError> {
        if self.documents.contains_key(document_id) {
            return Err(StoreError::DuplicateKey(document_id.to_string()));
        }
        self.documents
            .insert(document_id.to_string(), DocumentRecord { position, metadata });
        self.by_position.insert(position, document_id.to_string());
        Ok(())
    }

    /// Look up a document's record by id.
    pub fn get(&self, document_id: &str) -> Option<&DocumentRecord> {
        self.documents.get(document_id)
    }

    /// Resolve a position back to its document id, O(1).
    ///
    /// Returns `None` for tombstoned positions (removed documents) and
    /// positions never assigned.
    pub fn resolve_position(&self, position: usize) -> Option<&str> {
        self.by_position.get(&position).map(String::as_str)
    }

    /// Resolve a position to its document id and record in one step, O(1).
    pub fn resolve_record(&self, position: usize) -> Option<(&str, &DocumentRecord)> {
        let document_id = self.by_position.get(&position)?;
        let record = self.documents.get(document_id)?;
        Some((document_id.as_str(), record))
    }

    /// Remove a document, dropping both directions of the mapping.
    ///
    /// Returns the position the document occupied, or `None` if the id was
    /// unknown. The vector at that position stays in the index as a
    /// tombstone.
    pub fn remove(&mut self, document_id: &str) -> Option<usize> {
        let record = self.documents.remove(document_id)?;
        self.by_position.remove(&record.position);
        Some(record.position)
    }

    /// Whether a document id is present.
    pub fn contains(&self, document_id: &str) -> bool {
        self.documents.contains_key(document_id)
    }

    /// Number of live documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the table holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate over `(document_id, record)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DocumentRecord)> {
        self.documents.iter().map(|(id, r)| (id.as_str(), r))
    }
}

impl Serialize for MetadataTable {
    /// Serialize the forward map only. The reverse map is derived state
    /// and is reconstructed by [`MetadataTable::from_documents`] on load.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.documents.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MetadataTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let documents = HashMap::<String, DocumentRecord>::deserialize(deserializer)?;
        Self::from_documents(documents).map_err(de::Error::custom)
    }
}
