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

//! Declarative secondary-index manifests for MongoDB-style document stores.
//!
//! A manifest is an ordered list of index specifications: target collection,
//! key document (field order is significant), and options such as `unique`
//! or `expireAfterSeconds`. The library splits applying a manifest into a
//! pure planning step ([compute_operations]) and an I/O step
//! ([apply_manifest]) that drives any [DbBackend] implementation, so the
//! planning logic can be tested without a live database.
//!
//! ```no_run
//! use idx_manifest_core::{apply_manifest, MemoryBackend, Manifest};
//!
//! let manifest = Manifest::open_file("manifests/fleets.json").unwrap();
//! let backend = MemoryBackend::new();
//! let report = apply_manifest(&backend, &manifest).unwrap();
//! assert!(report.is_success());
//! ```

mod apply;
mod backend;
mod errors;
mod manifest;
mod memory;
mod plan;
mod report;

pub use apply::{apply_manifest, ApplyReport, CollectionFailure};
pub use backend::{CreateIndex, DbBackend, IndexDescriptor};
pub use errors::{DuplicateKeyError, Error, IndexConflictError, ManifestError};
pub use manifest::{IndexOptions, IndexSpec, Manifest};
pub use memory::{Clock, FixedClock, MemoryBackend, SystemClock};
pub use plan::{compute_operations, IndexCommand};
pub use report::render_report;

pub use bson;

pub type Result<T> = std::result::Result<T, Error>;
