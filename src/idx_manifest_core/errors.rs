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
use std::io;
use thiserror::Error;

#[derive(Debug)]
pub struct IndexConflictError {
    pub ns: String,   // collection name
    pub name: String, // index name
    pub existing: Option<Document>,
    pub requested: Document,
}

impl From<IndexConflictError> for Error {
    fn from(value: IndexConflictError) -> Self {
        Error::IndexConflict(Box::new(value))
    }
}

#[derive(Debug)]
pub struct DuplicateKeyError {
    pub name: String, // index name
    pub key: String,  // key name
    pub ns: String,   // collection name
}

impl From<DuplicateKeyError> for Error {
    fn from(value: DuplicateKeyError) -> Self {
        Error::DuplicateKey(Box::new(value))
    }
}

/// Problems detected in a manifest before any database call is made.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("manifest contains no index specifications")]
    Empty,
    #[error("index on collection '{0}' has an empty key document")]
    EmptyKeys(String),
    #[error("invalid order of index: {0}")]
    InvalidOrderOfIndex(String),
    #[error("index name '{0}' is illegal")]
    IllegalIndexName(String),
    #[error("collection name '{0}' is illegal")]
    IllegalCollectionName(String),
    #[error("duplicate index name '{1}' for collection '{0}'")]
    DuplicateIndexName(String, String),
    #[error("TTL index '{1}' on collection '{0}' must be keyed on a single field")]
    TtlNotSingleField(String, String),
    #[error("parse error: {0}")]
    ParseError(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot reach the database: {0}")]
    Connection(String),
    #[error("index conflict collection: {}, index: {}, an index with that name exists with a different definition", .0.ns, .0.name)]
    IndexConflict(Box<IndexConflictError>),
    #[error("duplicate key error collection: {}, index: {}, key: {}", .0.ns, .0.name, .0.key)]
    DuplicateKey(Box<DuplicateKeyError>),
    #[error("{0}")]
    Manifest(#[from] ManifestError),
    #[error("database error: {0}")]
    Database(String),
    #[error("the mutex is poisoned")]
    LockError,
    #[error("bson error: {0}")]
    BsonErr(#[from] bson::ser::Error),
    #[error("bson de error: {0}")]
    BsonDeErr(#[from] bson::de::Error),
    #[error("io error: {0}")]
    IOErr(#[from] io::Error),
}
