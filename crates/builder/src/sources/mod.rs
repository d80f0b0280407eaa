//! Source-specific ingestion drivers.
//!
//! Each driver reads one upstream dump, classifies every key as valid,
//! invalid or skipped, and feeds valid keys into the shared build state.
//! An unsupported algorithm is a counted outcome; any other decode or
//! adapter failure aborts the run.

pub mod github;
pub mod hackernews;
pub mod strongset;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use keydrop_crypto::KeyError;

use crate::error::{BuildError, Result};

/// Interval between progress log lines.
const PROGRESS_EVERY: usize = 1000;

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| BuildError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Classify an adapter result: unsupported algorithms are `None` (the
/// caller counts them invalid), everything else propagates as fatal.
pub(crate) fn adapt<T>(result: keydrop_crypto::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(key) => Ok(Some(key)),
        Err(KeyError::UnsupportedAlgorithm(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
