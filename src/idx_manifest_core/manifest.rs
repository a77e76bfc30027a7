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
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::ManifestError;
use crate::Result;

/// The options for an index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexOptions {
    /// Specifies a name outside the default generated name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Forces the index to be unique so the collection will not accept
    /// documents where the index key value matches an existing value in the
    /// index. The default value is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,

    /// Marks the index as a TTL index. The store deletes a document once the
    /// current time passes the indexed date field's value plus this many
    /// seconds. Requires a single-field key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_after_seconds: Option<i32>,
}

/// One entry of a manifest: which collection, which keys, which options.
///
/// `keys` maps field names to 1 (ascending) or -1 (descending); the document
/// order defines the compound index's prefix-query usability.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSpec {
    pub collection: String,

    pub keys: Document,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<IndexOptions>,
}

/// An ordered list of [IndexSpec] records, stored as a JSON array.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub specs: Vec<IndexSpec>,
}

impl Manifest {
    pub fn new(specs: Vec<IndexSpec>) -> Manifest {
        Manifest { specs }
    }

    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Manifest> {
        let file = File::open(path.as_ref())?;
        Manifest::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Manifest> {
        let specs: Vec<IndexSpec> = serde_json::from_reader(reader)
            .map_err(|err| ManifestError::ParseError(err.to_string()))?;
        Ok(Manifest { specs })
    }
}
