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

//! Command-line front end for applying index manifests.
//!
//! ```text
//! idx-manifest apply-indexes --manifest manifests/fleets.json \
//!     --db mongodb://localhost:27017/fleets
//! ```
//!
//! Exit code is 0 on full success and 1 when any collection failed or the
//! database could not be reached. The failing collection/index is printed to
//! stderr.

mod mongo;

use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, Command as App};
use log::LevelFilter;
use std::process;

use idx_manifest_core::{apply_manifest, render_report, Manifest};

use crate::mongo::MongoBackend;

const DEFAULT_DB_URI: &str = "mongodb://localhost:27017/test";

fn main() {
    let app = App::new("idx-manifest")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Applies declarative index manifests to a MongoDB-compatible database")
        .subcommand(
            App::new("apply-indexes")
                .about("apply a manifest file against a live database")
                .arg(
                    Arg::new("manifest")
                        .long("manifest")
                        .value_name("PATH")
                        .help("path to a JSON manifest file")
                        .required(true)
                        .num_args(1),
                )
                .arg(
                    Arg::new("db")
                        .long("db")
                        .value_name("URI")
                        .help("connection string; the database name is taken from the URI path")
                        .default_value(DEFAULT_DB_URI)
                        .num_args(1),
                )
                .arg(
                    Arg::new("verbose")
                        .long("verbose")
                        .short('v')
                        .help("print debug logs")
                        .action(ArgAction::SetTrue),
                ),
        );

    let matches = app.get_matches();

    match matches.subcommand() {
        Some(("apply-indexes", sub)) => {
            init_logger(sub.get_flag("verbose"));
            let manifest_path = sub.get_one::<String>("manifest").unwrap();
            let uri = sub.get_one::<String>("db").unwrap();
            if let Err(err) = apply(manifest_path, uri) {
                eprintln!("idx-manifest: {}", err);
                process::exit(1);
            }
        }
        _ => {
            eprintln!("no command given, try 'apply-indexes --help'");
            process::exit(1);
        }
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn apply(manifest_path: &str, uri: &str) -> Result<()> {
    let manifest = Manifest::open_file(manifest_path)?;
    let backend = MongoBackend::connect(uri)?;

    let report = apply_manifest(&backend, &manifest)?;
    print!("{}", render_report(&report));

    if !report.is_success() {
        for failure in &report.failures {
            eprintln!(
                "failed: collection '{}', index '{}': {}",
                failure.collection, failure.index, failure.error
            );
        }
        return Err(anyhow!(
            "{} collection(s) failed to apply",
            report.failures.len()
        ));
    }

    Ok(())
}
