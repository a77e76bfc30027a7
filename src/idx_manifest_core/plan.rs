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

use crate::errors::ManifestError;
use crate::manifest::{IndexSpec, Manifest};
use crate::Result;

/// A fully resolved create-index command. The name is always filled in and
/// the key document is normalized to `Int32` orders.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexCommand {
    pub name: String,
    pub keys: Document,
    pub unique: bool,
    pub expire_after_seconds: Option<i32>,
}

/// Turns a manifest into per-collection command lists without touching any
/// database. Collections keep the order of their first appearance in the
/// manifest; commands keep manifest order within a collection.
///
/// Fails on the first malformed entry, so a bad manifest never results in a
/// partially applied run.
pub fn compute_operations(manifest: &Manifest) -> Result<IndexMap<String, Vec<IndexCommand>>> {
    if manifest.specs.is_empty() {
        return Err(ManifestError::Empty.into());
    }

    let mut plan: IndexMap<String, Vec<IndexCommand>> = IndexMap::new();

    for spec in &manifest.specs {
        let command = resolve_spec(spec)?;
        let commands = plan.entry(spec.collection.clone()).or_default();
        if commands.iter().any(|existing| existing.name == command.name) {
            return Err(ManifestError::DuplicateIndexName(
                spec.collection.clone(),
                command.name,
            )
            .into());
        }
        commands.push(command);
    }

    Ok(plan)
}

fn resolve_spec(spec: &IndexSpec) -> Result<IndexCommand> {
    if !is_legal_name(&spec.collection) {
        return Err(ManifestError::IllegalCollectionName(spec.collection.clone()).into());
    }
    if spec.keys.is_empty() {
        return Err(ManifestError::EmptyKeys(spec.collection.clone()).into());
    }

    let mut keys = Document::new();
    for (field, value) in spec.keys.iter() {
        let order = key_order(value).ok_or_else(|| {
            ManifestError::InvalidOrderOfIndex(format!("{}: {}", field, value))
        })?;
        keys.insert(field.clone(), Bson::Int32(order));
    }

    let options = spec.options.clone().unwrap_or_default();
    let name = match options.name {
        Some(name) => {
            if !is_legal_name(&name) {
                return Err(ManifestError::IllegalIndexName(name).into());
            }
            name
        }
        None => generate_index_name(&keys),
    };

    if options.expire_after_seconds.is_some() && keys.len() != 1 {
        return Err(ManifestError::TtlNotSingleField(spec.collection.clone(), name).into());
    }

    Ok(IndexCommand {
        name,
        keys,
        unique: options.unique.unwrap_or(false),
        expire_after_seconds: options.expire_after_seconds,
    })
}

// JSON manifests can carry the order as an integer or a double.
fn key_order(value: &Bson) -> Option<i32> {
    match value {
        Bson::Int32(order) if *order == 1 || *order == -1 => Some(*order),
        Bson::Int64(order) if *order == 1 || *order == -1 => Some(*order as i32),
        Bson::Double(order) if *order == 1.0 || *order == -1.0 => Some(*order as i32),
        _ => None,
    }
}

fn is_legal_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('$') && !name.contains('\0')
}

// The scheme MongoDB-compatible servers use when no name is given,
// e.g. { a: 1, b: -1 } -> "a_1_b_-1".
pub(crate) fn generate_index_name(keys: &Document) -> String {
    let mut buf = String::new();
    for (field, value) in keys.iter() {
        if !buf.is_empty() {
            buf.push('_');
        }
        buf.push_str(field);
        buf.push('_');
        match value {
            Bson::Int32(order) => buf.push_str(&order.to_string()),
            _ => buf.push('1'),
        }
    }
    buf
}
