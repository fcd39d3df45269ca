// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Bounded exclusive file locks.
//!
//! Wraps `flock(LOCK_EX | LOCK_NB)` in a polling loop with a deadline. Locks
//! are advisory and tied to the open file description, so they exclude other
//! processes and other threads of this process alike, as long as each
//! acquisition opens the file itself.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};

use crate::error::{LinkError, LinkResult};

/// Delay between non-blocking lock attempts.
const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// An exclusively locked file. Unlocked on drop.
pub struct FileLock {
    file: Flock<File>,
    path: PathBuf,
}

impl FileLock {
    /// Open `path` with `options` and lock it exclusively.
    ///
    /// # Errors
    /// `StorageUnavailable` if the file cannot be opened or flock fails
    /// outright, `LockTimeout` if another holder keeps it past `timeout`.
    pub fn acquire(path: &Path, options: &OpenOptions, timeout: Duration) -> LinkResult<Self> {
        let started = Instant::now();
        let mut file = options
            .open(path)
            .map_err(|source| LinkError::StorageUnavailable {
                context: "opening lock file",
                path: path.to_path_buf(),
                source,
            })?;

        loop {
            match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
                Ok(locked) => {
                    tracing::trace!(
                        path = %path.display(),
                        waited_us = started.elapsed().as_micros() as u64,
                        "Lock acquired"
                    );
                    return Ok(Self {
                        file: locked,
                        path: path.to_path_buf(),
                    });
                }
                Err((returned, Errno::EWOULDBLOCK)) | Err((returned, Errno::EINTR)) => {
                    if started.elapsed() >= timeout {
                        tracing::warn!(
                            path = %path.display(),
                            timeout_ms = timeout.as_millis() as u64,
                            "Lock acquisition timed out"
                        );
                        return Err(LinkError::LockTimeout {
                            path: path.to_path_buf(),
                            waited_ms: started.elapsed().as_millis() as u64,
                        });
                    }
                    file = returned;
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err((_, errno)) => {
                    return Err(LinkError::StorageUnavailable {
                        context: "locking file",
                        path: path.to_path_buf(),
                        source: std::io::Error::from(errno),
                    });
                }
            }
        }
    }

    /// Lock a sibling lock file, creating it if needed.
    pub fn acquire_sidecar(path: &Path, timeout: Duration) -> LinkResult<Self> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(false);
        Self::acquire(path, &options, timeout)
    }

    /// Path of the locked file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The locked file handle.
    pub fn file(&self) -> &File {
        &self.file
    }
}
