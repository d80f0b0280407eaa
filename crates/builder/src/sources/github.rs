use std::cmp::Reverse;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::{CryptoRng, RngCore};
use tracing::info;

use keydrop_core::{GithubPgpKey, GithubPgpUser, GithubSshKey, GithubSshUser};
use keydrop_crypto::AirdropKey;

use crate::builder::{SourceStats, TreeBuilder};
use crate::error::{BuildError, Result};
use crate::sources::{adapt, read_json, PROGRESS_EVERY};
use crate::subtree::SubtreeBuilder;

/// One entry of a user's merged key list.
enum UserKey<'a> {
    Ssh(&'a GithubSshKey),
    Pgp(&'a GithubPgpKey),
}

impl UserKey<'_> {
    fn id(&self) -> i64 {
        match self {
            UserKey::Ssh(key) => key.id(),
            UserKey::Pgp(key) => key.id(),
        }
    }
}

/// Ingest the code-host dumps.
///
/// `github-ssh.json` and `github-pgp.json` are parallel-indexed; any length,
/// id or name disagreement is fatal. Each user gets one seed shared across
/// all of their keys, processed most-recent-first until the subtree holds
/// its full width. Keys past that point are counted invalid.
pub fn ingest<R: RngCore + CryptoRng>(
    builder: &mut TreeBuilder<R>,
    prefix: &Path,
) -> Result<SourceStats> {
    let ssh_users: Vec<GithubSshUser> = read_json(&prefix.join("github-ssh.json"))?;
    let pgp_users: Vec<GithubPgpUser> = read_json(&prefix.join("github-pgp.json"))?;

    if ssh_users.len() != pgp_users.len() {
        return Err(BuildError::GithubLengthMismatch {
            ssh: ssh_users.len(),
            pgp: pgp_users.len(),
        });
    }

    let mut stats = SourceStats::default();
    for (index, (ssh_user, pgp_user)) in ssh_users.iter().zip(&pgp_users).enumerate() {
        if ssh_user.id() != pgp_user.id() || ssh_user.name() != pgp_user.name() {
            return Err(BuildError::GithubRecordMismatch {
                index,
                ssh_id: ssh_user.id(),
                ssh_name: ssh_user.name().to_string(),
                pgp_id: pgp_user.id(),
                pgp_name: pgp_user.name().to_string(),
            });
        }
        if index > 0 && index % PROGRESS_EVERY == 0 {
            info!(source = "github", processed = index, "ingesting");
        }

        if builder.faucet().contains(ssh_user.name()) {
            stats.skipped += 1;
            continue;
        }

        let mut keys: Vec<UserKey> = ssh_user
            .keys()
            .iter()
            .map(UserKey::Ssh)
            .chain(pgp_user.keys().iter().map(UserKey::Pgp))
            .collect();
        keys.sort_by_key(|key| Reverse(key.id()));

        let seed = builder.new_seed();
        let mut subtree = SubtreeBuilder::new(seed);
        let mut valid = 0u64;
        let mut invalid = 0u64;

        for key in keys {
            // Deterministic truncation: a full subtree drops the remainder
            if subtree.is_full() {
                invalid += 1;
                continue;
            }

            let adapted = match key {
                UserKey::Ssh(record) => {
                    let decoded = keydrop_ssh::PublicKey::parse(record.line())?;
                    adapt(AirdropKey::from_ssh(&decoded))?
                }
                UserKey::Pgp(record) => {
                    // Only primary keys with a verified email are eligible
                    if record.parent_id() != -1 || !record.has_verified_email() {
                        invalid += 1;
                        continue;
                    }
                    let data = BASE64.decode(record.data())?;
                    let packet = keydrop_pgp::PublicKey::from_bytes(&data)?;
                    adapt(AirdropKey::from_pgp(&packet))?
                }
            };
            let Some(key) = adapted else {
                invalid += 1;
                continue;
            };
            if !key.validate() {
                invalid += 1;
                continue;
            }

            builder.commit_key(&key, &seed, &mut subtree)?;
            valid += 1;
        }

        stats.invalid_keys += invalid;
        if subtree.is_empty() {
            // Nothing usable; the user contributes no subtree
            if invalid > 0 {
                stats.invalid_users += 1;
            }
            continue;
        }
        builder.push_subtree(subtree);
        stats.valid_users += 1;
        stats.valid_keys += valid;
    }

    info!(
        source = "github",
        valid_users = stats.valid_users,
        valid_keys = stats.valid_keys,
        invalid_users = stats.invalid_users,
        invalid_keys = stats.invalid_keys,
        skipped = stats.skipped,
        "source complete"
    );
    Ok(stats)
}
