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

use bson::doc;
use idx_manifest_core::{apply_manifest, compute_operations, DbBackend, Manifest, MemoryBackend};
use std::path::PathBuf;

use crate::common::{manifest, named_spec, spec, ttl_spec};

mod common;

#[test]
fn test_parse_manifest() {
    let json = r#"[
        {
            "collection": "message",
            "keys": { "senderId": 1, "receiverId": 1, "sendTime": -1 },
            "options": { "name": "idx_sender_receiver_time" }
        },
        {
            "collection": "offline_messages",
            "keys": { "expireTime": 1 },
            "options": { "name": "idx_expire_time", "expireAfterSeconds": 0 }
        },
        {
            "collection": "group_messages",
            "keys": { "messageId": 1 }
        }
    ]"#;

    let manifest = Manifest::from_reader(json.as_bytes()).unwrap();
    assert_eq!(manifest.specs.len(), 3);

    // Field order in the key document must survive parsing.
    let fields: Vec<&str> = manifest.specs[0].keys.keys().map(|k| k.as_str()).collect();
    assert_eq!(fields, vec!["senderId", "receiverId", "sendTime"]);

    let options = manifest.specs[1].options.as_ref().unwrap();
    assert_eq!(options.name.as_deref(), Some("idx_expire_time"));
    assert_eq!(options.expire_after_seconds, Some(0));

    assert!(manifest.specs[2].options.is_none());
}

#[test]
fn test_parse_error() {
    let result = Manifest::from_reader("{ not json".as_bytes());
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("parse error"));
}

#[test]
fn test_empty_manifest() {
    let result = compute_operations(&manifest(vec![]));
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("no index specifications"));
}

#[test]
fn test_empty_key_document() {
    let result = compute_operations(&manifest(vec![spec("message", doc! {})]));
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("empty key document"));
}

#[test]
fn test_invalid_key_order() {
    let result = compute_operations(&manifest(vec![spec("message", doc! { "sendTime": 2 })]));
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("invalid order of index"));
}

#[test]
fn test_duplicate_index_name() {
    let result = compute_operations(&manifest(vec![
        named_spec("message", doc! { "a": 1 }, "idx_x"),
        named_spec("message", doc! { "b": 1 }, "idx_x"),
    ]));
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("duplicate index name 'idx_x'"));
}

#[test]
fn test_same_name_on_different_collections() {
    // idx_message_id exists on both group_messages and mailbox_message in
    // the shipped manifests; names are only unique per collection.
    let plan = compute_operations(&manifest(vec![
        named_spec("group_messages", doc! { "messageId": 1 }, "idx_message_id"),
        named_spec("mailbox_message", doc! { "messageId": 1 }, "idx_message_id"),
    ]))
    .unwrap();
    assert_eq!(plan.len(), 2);
}

#[test]
fn test_ttl_index_requires_single_field() {
    let result = compute_operations(&manifest(vec![ttl_spec(
        "offline_messages",
        doc! { "userId": 1, "expireTime": 1 },
        "idx_expire_time",
        0,
    )]));
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("must be keyed on a single field"));
}

#[test]
fn test_illegal_index_name() {
    let result = compute_operations(&manifest(vec![named_spec(
        "message",
        doc! { "a": 1 },
        "idx$bad",
    )]));
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("is illegal"));
}

#[test]
fn test_default_index_name() {
    let plan = compute_operations(&manifest(vec![spec(
        "message",
        doc! { "groupId": 1, "sendTime": -1 },
    )]))
    .unwrap();
    let commands = plan.get("message").unwrap();
    assert_eq!(commands[0].name, "groupId_1_sendTime_-1");
}

#[test]
fn test_validation_happens_before_any_database_call() {
    let backend = MemoryBackend::new();
    let bad = manifest(vec![
        named_spec("message", doc! { "a": 1 }, "idx_a"),
        spec("message", doc! {}),
    ]);

    assert!(apply_manifest(&backend, &bad).is_err());
    // Fail fast: not even the well-formed first spec may have been applied.
    assert!(backend.list_indexes("message").unwrap().is_empty());
}

fn manifests_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../manifests")
}

#[test]
fn test_shipped_manifests_apply_cleanly() {
    for (file, collections, indexes) in [
        ("fleets.json", 4, 12),
        ("fleets_im.json", 2, 8),
    ] {
        let manifest = Manifest::open_file(manifests_dir().join(file)).unwrap();
        let backend = MemoryBackend::new();
        let report = apply_manifest(&backend, &manifest).unwrap();

        assert!(report.is_success(), "{} failed to apply", file);
        assert_eq!(report.collections.len(), collections, "{}", file);
        assert_eq!(report.created, indexes, "{}", file);
    }
}
