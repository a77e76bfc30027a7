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
use std::fmt::Write;

use crate::apply::ApplyReport;

/// Human-readable end-of-run report. The exact layout is not a compatibility
/// surface; machine consumers should read [ApplyReport] directly.
pub fn render_report(report: &ApplyReport) -> String {
    let mut out = String::new();

    for (collection, descriptors) in &report.collections {
        let _ = writeln!(
            out,
            "collection '{}' ({} indexes):",
            collection,
            descriptors.len()
        );
        for descriptor in descriptors {
            let mut line = format!("  {} {}", descriptor.name, format_keys(&descriptor.key));
            if descriptor.unique.unwrap_or(false) {
                line.push_str(" [unique]");
            }
            if let Some(secs) = descriptor.expire_after_seconds {
                let _ = write!(line, " [ttl, expireAfterSeconds={}]", secs);
            }
            let _ = writeln!(out, "{}", line);
        }
    }

    for failure in &report.failures {
        let _ = writeln!(
            out,
            "failed: collection '{}', index '{}': {}",
            failure.collection, failure.index, failure.error
        );
    }

    let _ = writeln!(
        out,
        "{} created, {} already existed, {} failed",
        report.created,
        report.existing,
        report.failures.len()
    );

    out
}

fn format_keys(keys: &Document) -> String {
    let mut buf = String::from("{ ");
    for (i, (field, value)) in keys.iter().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        buf.push_str(field);
        buf.push_str(": ");
        let _ = write!(buf, "{}", value);
    }
    buf.push_str(" }");
    buf
}
