// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `linkmap serve` command - Run the HTTP gateway.

use std::net::SocketAddr;
use std::sync::Arc;

use linkmap_core::Config;

use super::open_store;
use crate::gateway;

pub async fn execute(config: Config, port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(open_store(&config)?);
    let addr = SocketAddr::new(config.gateway.bind, port.unwrap_or(config.gateway.port));

    tracing::info!(
        addr = %addr,
        data_dir = %config.storage.data_dir.display(),
        "Starting gateway"
    );

    gateway::start_gateway(addr, store).await?;
    Ok(())
}
