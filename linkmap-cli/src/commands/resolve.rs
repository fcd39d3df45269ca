// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `linkmap resolve` command - Resolve or refresh the code for a triple.

use linkmap_core::{Config, LinkError, UpsertAction, UpsertRequest};

use super::open_store;

pub async fn execute(
    config: Config,
    keyword: Option<&str>,
    src: Option<&str>,
    creative: Option<&str>,
    refresh: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = UpsertRequest::from_params(keyword, src, creative, refresh)?;
    let store = open_store(&config)?;

    match store.upsert(&request.triple, request.refresh) {
        Ok(outcome) => {
            match &outcome.action {
                UpsertAction::Existing => println!("{}", outcome.code),
                UpsertAction::Created => println!("{} (new)", outcome.code),
                UpsertAction::Refreshed { previous } => {
                    println!("{} (replaces {})", outcome.code, previous)
                }
            }
            Ok(())
        }
        Err(LinkError::HistoryAppend { committed, source }) => {
            println!("{} (refreshed)", committed);
            eprintln!("⚠ History not recorded: {}", source);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
