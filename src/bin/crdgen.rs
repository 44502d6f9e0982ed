// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CRD YAML Generator
//!
//! Generates the `DNSEndpoint` CRD YAML from the Rust types defined in src/crd.rs.
//!
//! Usage:
//!   cargo run --bin crdgen                 # print to stdout
//!   cargo run --bin crdgen -- deploy/crds  # write deploy/crds/dnsendpoints.crd.yaml

use dnsource::crd::DNSEndpoint;
use kube::CustomResourceExt;
use std::fs;
use std::path::Path;

const COPYRIGHT_HEADER: &str = "# Copyright (c) 2025 Erick Bourgeois, firestoned
# SPDX-License-Identifier: MIT
#
# This file is AUTO-GENERATED from src/crd.rs
# DO NOT EDIT MANUALLY - Run `cargo run --bin crdgen` to regenerate
#
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let content = render_crd::<DNSEndpoint>()?;

    match std::env::args().nth(1) {
        Some(dir) => {
            let output_dir = Path::new(&dir);
            fs::create_dir_all(output_dir)?;

            let output_path = output_dir.join("dnsendpoints.crd.yaml");
            fs::write(&output_path, content)?;
            eprintln!("✓ Generated {}", output_path.display());
        }
        None => print!("{content}"),
    }

    Ok(())
}

fn render_crd<T>() -> Result<String, Box<dyn std::error::Error>>
where
    T: CustomResourceExt,
{
    let yaml = serde_yaml::to_string(&T::crd())?;
    Ok(format!("{COPYRIGHT_HEADER}{yaml}"))
}
