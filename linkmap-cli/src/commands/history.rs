// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `linkmap history` command - Show refreshed codes in order.

use linkmap_core::Config;

use super::open_store;

pub async fn execute(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&config)?;
    let entries = store.history().entries()?;

    if entries.is_empty() {
        println!("No refreshes recorded.");
        return Ok(());
    }

    for entry in &entries {
        println!("{} → {}", entry.old_code, entry.new_code);
    }
    println!();
    println!("Total: {} refresh(es)", entries.len());

    Ok(())
}
