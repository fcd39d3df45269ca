// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Code generation.
//!
//! A code is the first 16 bytes of SHA-256 over `keyword ++ src ++ creative`
//! (no separator), rendered as 32 lowercase hex digits. Salted codes append a
//! per-call salt so every refresh lands on a fresh code.

use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use crate::types::{Code, Triple, MAX_CODE_LEN};

/// Generate a code for `triple`.
///
/// Stable mode is a pure function of the triple. Randomized mode mixes in a
/// fresh salt and practically never repeats.
pub fn generate(triple: &Triple, randomized: bool) -> Code {
    if randomized {
        salted_code(triple)
    } else {
        stable_code(triple)
    }
}

/// Deterministic code: same triple, same code, even on an empty table.
pub fn stable_code(triple: &Triple) -> Code {
    digest(triple, None)
}

/// Randomized code for a refresh.
pub fn salted_code(triple: &Triple) -> Code {
    digest(triple, Some(&fresh_salt()))
}

/// Nanosecond timestamp plus a random v4 UUID.
fn fresh_salt() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{:x}{}", nanos, uuid::Uuid::new_v4().simple())
}

fn digest(triple: &Triple, salt: Option<&str>) -> Code {
    let mut hasher = Sha256::new();
    hasher.update(triple.keyword.as_str().as_bytes());
    hasher.update(triple.src.as_str().as_bytes());
    hasher.update(triple.creative.as_str().as_bytes());
    if let Some(salt) = salt {
        hasher.update(salt.as_bytes());
    }
    let hash = hasher.finalize();

    Code::from_digest(hex::encode(&hash[..MAX_CODE_LEN / 2]))
}
