// Copyright 2025 the idx-manifest developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use bson::{Bson, Document};
use indexmap::IndexMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use crate::backend::{CreateIndex, DbBackend, IndexDescriptor};
use crate::errors::{DuplicateKeyError, Error, IndexConflictError};
use crate::plan::IndexCommand;
use crate::Result;

/// Time source for TTL visibility. The store's passive expiry is modeled at
/// read time, so tests can drive it with [FixedClock] instead of waiting.
pub trait Clock: Send + Sync {
    fn now(&self) -> bson::DateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> bson::DateTime {
        bson::DateTime::now()
    }
}

// Millis in an atomic rather than a locked DateTime, so reading the clock
// can never fail.
pub struct FixedClock(AtomicI64);

impl FixedClock {
    pub fn new(at: bson::DateTime) -> FixedClock {
        FixedClock(AtomicI64::new(at.timestamp_millis()))
    }

    pub fn set(&self, at: bson::DateTime) {
        self.0.store(at.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> bson::DateTime {
        bson::DateTime::from_millis(self.0.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
struct MemCollection {
    docs: Vec<Document>,
    indexes: IndexMap<String, IndexDescriptor>,
}

impl MemCollection {
    fn check_unique(&self, ns: &str, descriptor: &IndexDescriptor, doc: &Document) -> Result<()> {
        let tuple = index_key_tuple(doc, &descriptor.key);
        for existing in &self.docs {
            if index_key_tuple(existing, &descriptor.key) == tuple {
                return Err(DuplicateKeyError {
                    ns: ns.to_string(),
                    name: descriptor.name.clone(),
                    key: format_key_tuple(&descriptor.key, &tuple),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// In-memory implementation of the backend contract, with just enough of a
/// document store behind it to exercise uniqueness and TTL semantics.
pub struct MemoryBackend {
    state: Mutex<IndexMap<String, MemCollection>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryBackend {
    fn default() -> MemoryBackend {
        MemoryBackend::new()
    }
}

impl MemoryBackend {
    pub fn new() -> MemoryBackend {
        MemoryBackend::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> MemoryBackend {
        MemoryBackend {
            state: Mutex::new(IndexMap::new()),
            clock,
        }
    }

    /// Inserts `doc`, rejecting it when a unique index already covers an
    /// equal key tuple. Missing indexed fields count as null, the way the
    /// real store indexes them.
    pub fn insert_one(&self, collection: &str, doc: Document) -> Result<()> {
        let mut state = self.state.lock().map_err(|_| Error::LockError)?;
        let col = state.entry(collection.to_string()).or_default();

        for descriptor in col.indexes.values() {
            if descriptor.unique.unwrap_or(false) {
                col.check_unique(collection, descriptor, &doc)?;
            }
        }

        col.docs.push(doc);
        Ok(())
    }

    /// Returns every document still visible in `collection`. Documents whose
    /// TTL-indexed date field has expired against the injected clock are
    /// hidden, modeling the store's passive deletion.
    pub fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        let state = self.state.lock().map_err(|_| Error::LockError)?;
        let col = match state.get(collection) {
            Some(col) => col,
            None => return Ok(Vec::new()),
        };

        let now = self.clock.now().timestamp_millis();
        let ttl_fields: Vec<(String, i32)> = col
            .indexes
            .values()
            .filter_map(|descriptor| {
                let secs = descriptor.expire_after_seconds?;
                let field = descriptor.key.keys().next()?;
                Some((field.clone(), secs))
            })
            .collect();

        let visible = col
            .docs
            .iter()
            .filter(|doc| !is_expired(doc, &ttl_fields, now))
            .cloned()
            .collect();
        Ok(visible)
    }
}

impl DbBackend for MemoryBackend {
    fn create_index(&self, collection: &str, command: &IndexCommand) -> Result<CreateIndex> {
        let mut state = self.state.lock().map_err(|_| Error::LockError)?;
        let col = state.entry(collection.to_string()).or_default();

        if let Some(existing) = col.indexes.get(command.name.as_str()) {
            if existing.matches(command) {
                return Ok(CreateIndex::AlreadyExists);
            }
            return Err(IndexConflictError {
                ns: collection.to_string(),
                name: command.name.clone(),
                existing: Some(existing.key.clone()),
                requested: command.keys.clone(),
            }
            .into());
        }

        let descriptor = IndexDescriptor::from(command);
        if command.unique {
            // Existing data must already satisfy the constraint.
            let mut seen: Vec<Vec<Bson>> = Vec::with_capacity(col.docs.len());
            for doc in &col.docs {
                let tuple = index_key_tuple(doc, &descriptor.key);
                if seen.contains(&tuple) {
                    return Err(DuplicateKeyError {
                        ns: collection.to_string(),
                        name: descriptor.name.clone(),
                        key: format_key_tuple(&descriptor.key, &tuple),
                    }
                    .into());
                }
                seen.push(tuple);
            }
        }

        col.indexes.insert(command.name.clone(), descriptor);
        Ok(CreateIndex::Created)
    }

    fn list_indexes(&self, collection: &str) -> Result<Vec<IndexDescriptor>> {
        let state = self.state.lock().map_err(|_| Error::LockError)?;
        let descriptors = state
            .get(collection)
            .map(|col| col.indexes.values().cloned().collect())
            .unwrap_or_default();
        Ok(descriptors)
    }
}

fn index_key_tuple(doc: &Document, keys: &Document) -> Vec<Bson> {
    keys.keys()
        .map(|field| doc.get(field).cloned().unwrap_or(Bson::Null))
        .collect()
}

fn format_key_tuple(keys: &Document, tuple: &[Bson]) -> String {
    let mut buf = String::from("{ ");
    for (i, field) in keys.keys().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        buf.push_str(field);
        buf.push_str(": ");
        buf.push_str(&tuple[i].to_string());
    }
    buf.push_str(" }");
    buf
}

fn is_expired(doc: &Document, ttl_fields: &[(String, i32)], now_millis: i64) -> bool {
    ttl_fields.iter().any(|(field, secs)| match doc.get(field) {
        Some(Bson::DateTime(at)) => at.timestamp_millis() + (*secs as i64) * 1000 <= now_millis,
        _ => false,
    })
}
