use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use keydrop_core::{BUCKETS, MAX_AIRDROP, SUBTREE_DEPTH, SUBTREE_LEAVES};
use keydrop_crypto::tree_depth;

use crate::builder::FinalTree;
use crate::error::{BuildError, Result};

/// Summary committed to `etc/tree.json`.
#[derive(Debug, Clone, Serialize)]
pub struct TreeSummary {
    /// SHA-256 of the serialized tree file.
    pub checksum: String,
    /// Top-level Merkle root.
    pub root: String,
    /// Number of subtrees (top-level leaves).
    pub leaves: u64,
    /// Number of committed keys.
    pub keys: u64,
    pub subleaves: u32,
    pub depth: u32,
    pub subdepth: u32,
    /// Faucet entry count.
    pub faucet: u64,
    pub shares: u64,
    pub reward: u64,
    /// Per-bucket SHA-256, indexed 0..255.
    pub checksums: Vec<String>,
}

/// Drop any previous build outputs and recreate the output directories.
/// The run is idempotent: a failed run leaves a partial build directory
/// that the next run removes wholesale.
pub fn reset_build_dir(prefix: &Path) -> Result<()> {
    let build_dir = prefix.join("build");
    match fs::remove_dir_all(&build_dir) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(BuildError::Io {
                path: build_dir,
                source,
            })
        }
    }
    create_dir(&build_dir.join("nonces"))?;
    create_dir(&prefix.join("etc"))
}

/// Serialize the sealed tree: `build/tree.bin`, the 256 bucket files and
/// `etc/tree.json`.
pub fn write_outputs(prefix: &Path, tree: &FinalTree) -> Result<TreeSummary> {
    let build_dir = prefix.join("build");
    let nonces_dir = build_dir.join("nonces");

    // tree.bin: u32 count (LE), then each subtree's leaves in order
    let mut bytes = Vec::with_capacity(4 + tree.subtrees.len() * SUBTREE_LEAVES * 32);
    bytes.extend_from_slice(&(tree.subtrees.len() as u32).to_le_bytes());
    for subtree in &tree.subtrees {
        for leaf in subtree {
            bytes.extend_from_slice(leaf);
        }
    }
    write_file(&build_dir.join("tree.bin"), &bytes)?;
    let checksum = sha256_hex(&bytes);

    let mut checksums = Vec::with_capacity(BUCKETS);
    for index in 0..BUCKETS {
        let data = tree.buckets.serialize(index);
        write_file(&nonces_dir.join(format!("{:03}.bin", index)), &data)?;
        debug!(bucket = index, entries = tree.buckets.entries(index), "bucket written");
        checksums.push(sha256_hex(&data));
    }

    let leaves = tree.subtrees.len() as u64;
    let recipients = leaves + tree.faucet_shares;
    let reward = if recipients == 0 {
        0
    } else {
        MAX_AIRDROP / recipients
    };
    match recipients.checked_mul(reward) {
        Some(total) if total <= MAX_AIRDROP => {}
        _ => return Err(BuildError::RewardOverflow { reward, recipients }),
    }

    let summary = TreeSummary {
        checksum,
        root: hex::encode(tree.root),
        leaves,
        keys: tree.total_keys,
        subleaves: SUBTREE_LEAVES as u32,
        depth: tree_depth(leaves),
        subdepth: SUBTREE_DEPTH,
        faucet: tree.faucet_entries,
        shares: tree.faucet_shares,
        reward,
        checksums,
    };

    let path = prefix.join("etc").join("tree.json");
    let json = serde_json::to_vec_pretty(&summary).map_err(|source| BuildError::Json {
        path: path.clone(),
        source,
    })?;
    write_file(&path, &json)?;

    Ok(summary)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
