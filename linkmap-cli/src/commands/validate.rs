// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `linkmap validate` command - Validate configuration file.

use linkmap_core::ConfigLoader;

pub async fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Storage Settings:");
            println!(
                "  Mappings Table:     {}",
                config.storage.mappings_path().display()
            );
            println!(
                "  History Ledger:     {}",
                config.storage.history_path().display()
            );
            println!(
                "  Lock File:          {}",
                config.storage.lock_path().display()
            );
            println!(
                "  Lock Timeout:       {}ms",
                config.storage.lock_timeout.as_millis()
            );
            println!();
            println!("Gateway Settings:");
            println!(
                "  Listen Address:     {}:{}",
                config.gateway.bind, config.gateway.port
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
