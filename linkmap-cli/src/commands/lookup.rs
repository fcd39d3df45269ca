// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `linkmap lookup` command - Print the triple behind a code.

use linkmap_core::{Config, LookupRequest};

use super::open_store;

pub async fn execute(config: Config, code: &str) -> Result<(), Box<dyn std::error::Error>> {
    let request = LookupRequest::from_param(Some(code))?;
    let store = open_store(&config)?;

    match store.lookup(&request.code)? {
        Some(triple) => {
            println!("keyword:  {}", triple.keyword);
            println!("src:      {}", triple.src);
            println!("creative: {}", triple.creative);
            Ok(())
        }
        None => {
            eprintln!("✗ Code not found: {}", request.code);
            std::process::exit(2);
        }
    }
}
