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

use indexmap::IndexMap;
use log::{info, warn};

use crate::backend::{CreateIndex, DbBackend, IndexDescriptor};
use crate::errors::Error;
use crate::manifest::Manifest;
use crate::plan::compute_operations;
use crate::Result;

/// A spec that could not be applied. The rest of its collection's specs were
/// skipped; other collections were still processed.
#[derive(Debug)]
pub struct CollectionFailure {
    pub collection: String,
    pub index: String,
    pub error: Error,
}

/// End-of-run summary: the index set actually present per touched collection,
/// plus whatever failed on the way there.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub collections: IndexMap<String, Vec<IndexDescriptor>>,
    pub failures: Vec<CollectionFailure>,
    pub created: usize,
    pub existing: usize,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies `manifest` against `backend`, one create-index call at a time, in
/// manifest order.
///
/// Index creation is not transactional across indexes: a conflict or a
/// uniqueness violation stops that collection's remaining specs but nothing
/// already created is rolled back. Connection-level failures abort the whole
/// run with no report.
pub fn apply_manifest(backend: &dyn DbBackend, manifest: &Manifest) -> Result<ApplyReport> {
    let plan = compute_operations(manifest)?;
    let mut report = ApplyReport::default();

    for (collection, commands) in &plan {
        for command in commands {
            match backend.create_index(collection, command) {
                Ok(CreateIndex::Created) => {
                    info!("created index '{}' on collection '{}'", command.name, collection);
                    report.created += 1;
                }
                Ok(CreateIndex::AlreadyExists) => {
                    info!(
                        "index '{}' on collection '{}' is already up to date",
                        command.name, collection
                    );
                    report.existing += 1;
                }
                Err(err @ (Error::IndexConflict(_) | Error::DuplicateKey(_))) => {
                    warn!(
                        "collection '{}': skipping remaining specs: {}",
                        collection, err
                    );
                    report.failures.push(CollectionFailure {
                        collection: collection.clone(),
                        index: command.name.clone(),
                        error: err,
                    });
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        let descriptors = backend.list_indexes(collection)?;
        report.collections.insert(collection.clone(), descriptors);
    }

    Ok(report)
}
