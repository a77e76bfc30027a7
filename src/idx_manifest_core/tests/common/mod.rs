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
use idx_manifest_core::{IndexOptions, IndexSpec, Manifest};

#[allow(dead_code)]
pub fn spec(collection: &str, keys: Document) -> IndexSpec {
    IndexSpec {
        collection: collection.to_string(),
        keys,
        options: None,
    }
}

#[allow(dead_code)]
pub fn named_spec(collection: &str, keys: Document, name: &str) -> IndexSpec {
    IndexSpec {
        collection: collection.to_string(),
        keys,
        options: Some(IndexOptions {
            name: Some(name.to_string()),
            ..IndexOptions::default()
        }),
    }
}

#[allow(dead_code)]
pub fn unique_spec(collection: &str, keys: Document, name: &str) -> IndexSpec {
    IndexSpec {
        collection: collection.to_string(),
        keys,
        options: Some(IndexOptions {
            name: Some(name.to_string()),
            unique: Some(true),
            ..IndexOptions::default()
        }),
    }
}

#[allow(dead_code)]
pub fn ttl_spec(collection: &str, keys: Document, name: &str, secs: i32) -> IndexSpec {
    IndexSpec {
        collection: collection.to_string(),
        keys,
        options: Some(IndexOptions {
            name: Some(name.to_string()),
            expire_after_seconds: Some(secs),
            ..IndexOptions::default()
        }),
    }
}

#[allow(dead_code)]
pub fn manifest(specs: Vec<IndexSpec>) -> Manifest {
    Manifest::new(specs)
}
