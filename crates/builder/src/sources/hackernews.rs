use std::path::Path;

use rand::{CryptoRng, RngCore};
use tracing::{info, warn};

use keydrop_core::HnUser;
use keydrop_crypto::AirdropKey;
use keydrop_pgp::parse_armored_stream;

use crate::builder::{SourceStats, TreeBuilder};
use crate::error::{BuildError, Result};
use crate::sources::{adapt, read_json, PROGRESS_EVERY};
use crate::subtree::SubtreeBuilder;

/// Ingest the social-news registry.
///
/// Each entry carries a declared full fingerprint and an armored key
/// bundle; the bundle's computed fingerprint has to match. There is no
/// faucet dedup for this source. Accepted keys seal single-key subtrees
/// under fresh seeds.
pub fn ingest<R: RngCore + CryptoRng>(
    builder: &mut TreeBuilder<R>,
    prefix: &Path,
) -> Result<SourceStats> {
    let users: Vec<HnUser> = read_json(&prefix.join("hn-keys.json"))?;

    let mut stats = SourceStats::default();
    for (index, user) in users.iter().enumerate() {
        if index > 0 && index % PROGRESS_EVERY == 0 {
            info!(source = "hn", processed = index, "ingesting");
        }

        let blocks = parse_armored_stream(user.key().bundle())?;
        let block = blocks.first().ok_or_else(|| BuildError::EmptyBundle {
            user: user.name().to_string(),
        })?;

        let packet = keydrop_pgp::PublicKey::from_bytes(&block.data)?;
        let Some(key) = adapt(AirdropKey::from_pgp(&packet))? else {
            stats.invalid_users += 1;
            stats.invalid_keys += 1;
            continue;
        };

        let computed = hex::encode_upper(packet.fingerprint());
        if !computed.eq_ignore_ascii_case(user.key().fingerprint()) {
            warn!(
                user = user.name(),
                declared = user.key().fingerprint(),
                computed = %computed,
                "social-news fingerprint mismatch"
            );
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
        source = "hn",
        valid_users = stats.valid_users,
        valid_keys = stats.valid_keys,
        invalid_users = stats.invalid_users,
        invalid_keys = stats.invalid_keys,
        skipped = stats.skipped,
        "source complete"
    );
    Ok(stats)
}
