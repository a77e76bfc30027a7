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

use bson::Document;
use serde::{Deserialize, Serialize};

use crate::plan::IndexCommand;
use crate::Result;

/// One index as reported back by the store, the shape `listIndexes` returns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescriptor {
    pub name: String,

    pub key: Document,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_after_seconds: Option<i32>,
}

impl IndexDescriptor {
    /// Whether this descriptor carries the same definition as `command`.
    /// Used to tell an idempotent re-create from a name conflict.
    pub fn matches(&self, command: &IndexCommand) -> bool {
        self.key == command.keys
            && self.unique.unwrap_or(false) == command.unique
            && self.expire_after_seconds == command.expire_after_seconds
    }
}

impl From<&IndexCommand> for IndexDescriptor {
    fn from(command: &IndexCommand) -> IndexDescriptor {
        IndexDescriptor {
            name: command.name.clone(),
            key: command.keys.clone(),
            unique: if command.unique { Some(true) } else { None },
            expire_after_seconds: command.expire_after_seconds,
        }
    }
}

/// Outcome of a single create-index call.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CreateIndex {
    Created,
    /// An index with the same name and an identical definition was already
    /// present; the call was a no-op.
    AlreadyExists,
}

/// The schema-management surface of the store. The applier only ever talks
/// to the database through this trait, so tests can run against
/// [MemoryBackend](crate::MemoryBackend) instead of a live server.
pub trait DbBackend {
    fn create_index(&self, collection: &str, command: &IndexCommand) -> Result<CreateIndex>;

    fn list_indexes(&self, collection: &str) -> Result<Vec<IndexDescriptor>>;
}
