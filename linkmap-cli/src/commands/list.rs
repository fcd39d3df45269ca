// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `linkmap list` command - List every mapping in the table.

use linkmap_core::Config;

use super::open_store;

pub async fn execute(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&config)?;
    let rows = store.rows()?;

    if rows.is_empty() {
        println!("No mappings in {}.", store.table_path().display());
        return Ok(());
    }

    println!(
        "{:<32}  {:<20}  {:<20}  {:<20}",
        "CODE", "KEYWORD", "SRC", "CREATIVE"
    );
    for row in &rows {
        println!(
            "{:<32}  {:<20}  {:<20}  {:<20}",
            row.code.as_str(),
            row.triple.keyword.as_str(),
            row.triple.src.as_str(),
            row.triple.creative.as_str()
        );
    }
    println!();
    println!("Total: {} mapping(s)", rows.len());

    Ok(())
}
