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

use bson::{doc, Bson};
use log::debug;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::sync::{Client, Database};

use idx_manifest_core::{
    CreateIndex, DbBackend, DuplicateKeyError, Error, IndexCommand, IndexConflictError,
    IndexDescriptor, Result,
};

// Server error codes: IndexOptionsConflict, IndexKeySpecsConflict,
// DuplicateKey, NamespaceNotFound.
const INDEX_OPTIONS_CONFLICT: i32 = 85;
const INDEX_KEY_SPECS_CONFLICT: i32 = 86;
const DUPLICATE_KEY: i32 = 11000;
const NAMESPACE_NOT_FOUND: i32 = 26;

/// Backend over a live MongoDB-compatible server, driven through the raw
/// `createIndexes` / `listIndexes` database commands.
pub(crate) struct MongoBackend {
    database: Database,
}

impl MongoBackend {
    pub fn connect(uri: &str) -> Result<MongoBackend> {
        let client = Client::with_uri_str(uri)
            .map_err(|err| Error::Connection(err.to_string()))?;
        let database = default_database(&client);

        // The sync client connects lazily; ping so an unreachable server
        // fails the run before any spec is applied.
        database
            .run_command(doc! { "ping": 1 })
            .run()
            .map_err(|err| Error::Connection(err.to_string()))?;

        Ok(MongoBackend { database })
    }
}

impl DbBackend for MongoBackend {
    fn create_index(&self, collection: &str, command: &IndexCommand) -> Result<CreateIndex> {
        let mut index = doc! {
            "key": command.keys.clone(),
            "name": command.name.clone(),
        };
        if command.unique {
            index.insert("unique", true);
        }
        if let Some(secs) = command.expire_after_seconds {
            index.insert("expireAfterSeconds", secs);
        }

        let reply = self
            .database
            .run_command(doc! {
                "createIndexes": collection,
                "indexes": [index],
            })
            .run()
            .map_err(|err| map_create_error(err, collection, command))?;

        let before = reply.get_i32("numIndexesBefore").unwrap_or(0);
        let after = reply.get_i32("numIndexesAfter").unwrap_or(before);
        debug!(
            "createIndexes '{}' on '{}': numIndexesBefore={}, numIndexesAfter={}",
            command.name, collection, before, after
        );

        if after > before {
            Ok(CreateIndex::Created)
        } else {
            Ok(CreateIndex::AlreadyExists)
        }
    }

    fn list_indexes(&self, collection: &str) -> Result<Vec<IndexDescriptor>> {
        let reply = match self
            .database
            .run_command(doc! { "listIndexes": collection })
            .run()
        {
            Ok(reply) => reply,
            // A collection none of the specs managed to create yet.
            Err(err) if command_error_code(&err) == Some(NAMESPACE_NOT_FOUND) => {
                return Ok(Vec::new())
            }
            Err(err) => return Err(Error::Database(err.to_string())),
        };

        let cursor = reply
            .get_document("cursor")
            .map_err(|err| Error::Database(format!("malformed listIndexes reply: {}", err)))?;
        let batch = cursor
            .get_array("firstBatch")
            .map_err(|err| Error::Database(format!("malformed listIndexes reply: {}", err)))?;

        let mut descriptors = Vec::with_capacity(batch.len());
        for item in batch {
            if let Bson::Document(doc) = item {
                descriptors.push(bson::from_document::<IndexDescriptor>(doc.clone())?);
            }
        }
        Ok(descriptors)
    }
}

fn command_error_code(err: &mongodb::error::Error) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(command_error) => Some(command_error.code),
        _ => None,
    }
}

fn map_create_error(
    err: mongodb::error::Error,
    collection: &str,
    command: &IndexCommand,
) -> Error {
    match err.kind.as_ref() {
        ErrorKind::Command(command_error) => match command_error.code {
            INDEX_OPTIONS_CONFLICT | INDEX_KEY_SPECS_CONFLICT => {
                Error::IndexConflict(Box::new(IndexConflictError {
                    ns: collection.to_string(),
                    name: command.name.clone(),
                    // The server does not echo the existing definition back.
                    existing: None,
                    requested: command.keys.clone(),
                }))
            }
            DUPLICATE_KEY => Error::DuplicateKey(Box::new(DuplicateKeyError {
                ns: collection.to_string(),
                name: command.name.clone(),
                key: command_error.message.clone(),
            })),
            _ => Error::Database(command_error.message.clone()),
        },
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY =>
        {
            Error::DuplicateKey(Box::new(DuplicateKeyError {
                ns: collection.to_string(),
                name: command.name.clone(),
                key: write_error.message.clone(),
            }))
        }
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::Authentication { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => Error::Connection(err.to_string()),
        _ => Error::Database(err.to_string()),
    }
}

// The driver parses the URI path (including percent-encoding and SRV URIs);
// absent a default database, fall back to "test".
fn default_database(client: &Client) -> Database {
    client
        .default_database()
        .unwrap_or_else(|| client.database("test"))
}
