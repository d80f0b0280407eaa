//! Keydrop Tree Builder
//!
//! Single-pass batch pipeline that turns the upstream key dumps into the
//! airdrop commitment: per-user subtrees of key hashes, 256 buckets of
//! encrypted nonces, and the top-level Merkle root. Inputs are read fully,
//! processed in memory, and the outputs replace any previous build.

mod buckets;
mod builder;
mod error;
mod faucet;
mod output;
mod sources;
mod subtree;

pub use buckets::NonceBuckets;
pub use builder::{FinalTree, SourceStats, TreeBuilder};
pub use error::{BuildError, Result};
pub use faucet::Faucet;
pub use output::{reset_build_dir, write_outputs, TreeSummary};
pub use sources::{github, hackernews, strongset};
pub use subtree::{subtree_root, SubtreeBuilder, SubtreeLeaves};

use std::path::Path;

use rand::{CryptoRng, RngCore};
use tracing::info;

/// Build the full commitment from the inputs under `prefix`.
///
/// Source order is fixed (code-host, strong-set, social-news); bucket
/// contents follow it, so it is part of the output contract.
pub fn run<R: RngCore + CryptoRng>(prefix: &Path, rng: R) -> Result<TreeSummary> {
    let faucet = Faucet::load(prefix)?;
    reset_build_dir(prefix)?;

    let mut builder = TreeBuilder::new(rng, faucet);
    github::ingest(&mut builder, prefix)?;
    strongset::ingest(&mut builder, prefix)?;
    hackernews::ingest(&mut builder, prefix)?;

    let tree = builder.finalize();
    let summary = write_outputs(prefix, &tree)?;
    info!(
        root = %summary.root,
        leaves = summary.leaves,
        keys = summary.keys,
        reward = summary.reward,
        "commitment tree written"
    );
    Ok(summary)
}
