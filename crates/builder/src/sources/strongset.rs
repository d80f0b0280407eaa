use std::fs;
use std::path::Path;

use rand::{CryptoRng, RngCore};
use tracing::{info, warn};

use keydrop_crypto::AirdropKey;
use keydrop_pgp::parse_armored_stream;

use crate::builder::{SourceStats, TreeBuilder};
use crate::error::{BuildError, Result};
use crate::sources::{adapt, PROGRESS_EVERY};
use crate::subtree::SubtreeBuilder;

/// Ingest the PGP strong-set dump.
///
/// Each armored block must carry a `Key-ID` header; the decoded key's
/// computed id has to match it or the entry is discarded with a warning.
/// Blocks whose `Email` header matches a faucet identity are skipped
/// outright. Every accepted key seals its own single-key subtree under a
/// fresh seed.
pub fn ingest<R: RngCore + CryptoRng>(
    builder: &mut TreeBuilder<R>,
    prefix: &Path,
) -> Result<SourceStats> {
    let path = prefix.join("strongset.asc");
    let text = fs::read_to_string(&path).map_err(|source| BuildError::Io {
        path: path.clone(),
        source,
    })?;
    let blocks = parse_armored_stream(&text)?;

    let mut stats = SourceStats::default();
    for (index, block) in blocks.iter().enumerate() {
        if index > 0 && index % PROGRESS_EVERY == 0 {
            info!(source = "strongset", processed = index, "ingesting");
        }

        let declared = block
            .header("Key-ID")
            .ok_or(BuildError::MissingKeyId { index })?;

        if let Some(email) = block.header("Email") {
            if builder.faucet().contains(email) {
                stats.skipped += 1;
                continue;
            }
        }

        let packet = keydrop_pgp::PublicKey::from_bytes(&block.data)?;
        let Some(key) = adapt(AirdropKey::from_pgp(&packet))? else {
            stats.invalid_users += 1;
            stats.invalid_keys += 1;
            continue;
        };

        let computed = hex::encode_upper(packet.key_id());
        let declared = declared.trim_start_matches("0x");
        if !computed.eq_ignore_ascii_case(declared) {
            warn!(declared, computed = %computed, "strong-set key id mismatch");
            stats.invalid_users += 1;
            stats.invalid_keys += 1;
            continue;
        }

        if !key.validate() {
            stats.invalid_users += 1;
            stats.invalid_keys += 1;
            continue;
        }

        let seed = builder.new_seed();
        let mut subtree = SubtreeBuilder::new(seed);
        builder.commit_key(&key, &seed, &mut subtree)?;
        builder.push_subtree(subtree);
        stats.valid_users += 1;
        stats.valid_keys += 1;
    }

    info!(
        source = "strongset",
        valid_users = stats.valid_users,
        valid_keys = stats.valid_keys,
        invalid_users = stats.invalid_users,
        invalid_keys = stats.invalid_keys,
        skipped = stats.skipped,
        "source complete"
    );
    Ok(stats)
}
