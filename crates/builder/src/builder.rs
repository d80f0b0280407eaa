use rand::{CryptoRng, RngCore};

use keydrop_core::{Hash, Seed};
use keydrop_crypto::{generate_seed, AirdropKey};

use crate::buckets::NonceBuckets;
use crate::error::Result;
use crate::faucet::Faucet;
use crate::subtree::{subtree_root, SubtreeBuilder, SubtreeLeaves};

/// Per-source ingestion counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceStats {
    pub valid_users: u64,
    pub valid_keys: u64,
    pub invalid_users: u64,
    pub invalid_keys: u64,
    /// Entries excluded by faucet dedup; not counted as invalid.
    pub skipped: u64,
}

/// Owns all mutable build state. Ingestors are plain functions borrowing
/// this mutably; nothing is shared across threads.
pub struct TreeBuilder<R> {
    rng: R,
    faucet: Faucet,
    buckets: NonceBuckets,
    subtrees: Vec<SubtreeLeaves>,
    total_keys: u64,
}

impl<R: RngCore + CryptoRng> TreeBuilder<R> {
    pub fn new(rng: R, faucet: Faucet) -> Self {
        Self {
            rng,
            faucet,
            buckets: NonceBuckets::new(),
            subtrees: Vec::new(),
            total_keys: 0,
        }
    }

    pub fn faucet(&self) -> &Faucet {
        &self.faucet
    }

    /// Fresh seed: one per user, or per standalone entry.
    pub fn new_seed(&mut self) -> Seed {
        generate_seed(&mut self.rng)
    }

    /// Commit one validated key under `seed`: route its encrypted nonce to
    /// the key's bucket and push both key hashes into the subtree.
    ///
    /// The envelope is always bound to the pre-nonce key; the caller's
    /// subtree receives `H(key)` and `H(post-nonce key)`.
    pub fn commit_key(
        &mut self,
        key: &AirdropKey,
        seed: &Seed,
        subtree: &mut SubtreeBuilder,
    ) -> Result<()> {
        let bucket = key.bucket();
        let (nonce, new_key) = key.generate(&mut self.rng)?;
        let ciphertext = key.encrypt(&nonce, seed, &mut self.rng)?;

        self.buckets.push(bucket, ciphertext);
        subtree.push_pair(key.hash(), new_key.hash());
        self.total_keys += 1;
        Ok(())
    }

    /// Seal a finished subtree into the tree. The builder never mutates a
    /// subtree again after this point.
    pub fn push_subtree(&mut self, subtree: SubtreeBuilder) {
        self.subtrees.push(subtree.finish());
    }

    pub fn subtree_count(&self) -> usize {
        self.subtrees.len()
    }

    pub fn total_keys(&self) -> u64 {
        self.total_keys
    }

    /// Order subtrees by their subroots and compute the top-level root.
    pub fn finalize(self) -> FinalTree {
        let mut paired: Vec<(Hash, SubtreeLeaves)> = self
            .subtrees
            .into_iter()
            .map(|leaves| (subtree_root(&leaves), leaves))
            .collect();
        paired.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let roots: Vec<Hash> = paired.iter().map(|(root, _)| *root).collect();
        let root = keydrop_crypto::merkle_root(&roots);

        FinalTree {
            subtrees: paired.into_iter().map(|(_, leaves)| leaves).collect(),
            root,
            total_keys: self.total_keys,
            buckets: self.buckets,
            faucet_entries: self.faucet.entries(),
            faucet_shares: self.faucet.shares(),
        }
    }
}

/// The sealed commitment, ready for serialization.
pub struct FinalTree {
    /// Subtrees in subroot order.
    pub subtrees: Vec<SubtreeLeaves>,
    pub root: Hash,
    pub total_keys: u64,
    pub buckets: NonceBuckets,
    pub faucet_entries: u64,
    pub faucet_shares: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use keydrop_core::SEED_SIZE;
    use keydrop_crypto::merkle_root;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn test_builder() -> TreeBuilder<ChaCha20Rng> {
        TreeBuilder::new(ChaCha20Rng::seed_from_u64(1), Faucet::from_entries(&[]))
    }

    fn ed25519_airdrop_key(rng: &mut ChaCha20Rng) -> AirdropKey {
        use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

        let signing = ed25519_dalek::SigningKey::generate(rng);
        let mut blob = Vec::new();
        blob.extend_from_slice(&11u32.to_be_bytes());
        blob.extend_from_slice(b"ssh-ed25519");
        blob.extend_from_slice(&32u32.to_be_bytes());
        blob.extend_from_slice(&signing.verifying_key().to_bytes());
        let line = format!("ssh-ed25519 {}", BASE64.encode(&blob));

        let decoded = keydrop_ssh::PublicKey::parse(&line).unwrap();
        AirdropKey::from_ssh(&decoded).unwrap()
    }

    #[test]
    fn test_commit_key_routes_bucket_and_hashes() {
        let mut builder = test_builder();
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let key = ed25519_airdrop_key(&mut rng);

        let seed = [1u8; SEED_SIZE];
        let mut subtree = SubtreeBuilder::new(seed);
        builder.commit_key(&key, &seed, &mut subtree).unwrap();

        assert_eq!(builder.total_keys(), 1);
        assert_eq!(builder.buckets.entries(key.bucket() as usize), 1);
        assert!(!subtree.is_empty());
        assert!(!subtree.is_full());
    }

    #[test]
    fn test_finalize_sorts_subtrees_by_root() {
        let mut builder = test_builder();
        for byte in [9u8, 3, 7] {
            let seed = builder.new_seed();
            let mut subtree = SubtreeBuilder::new(seed);
            subtree.push_pair([byte; 32], [byte + 1; 32]);
            builder.push_subtree(subtree);
        }

        let tree = builder.finalize();
        let roots: Vec<_> = tree.subtrees.iter().map(|s| subtree_root(s)).collect();
        assert!(roots.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(tree.root, merkle_root(&roots));
    }

    #[test]
    fn test_finalize_empty_tree() {
        let tree = test_builder().finalize();
        assert!(tree.subtrees.is_empty());
        assert_eq!(tree.root, merkle_root(&[]));
        assert_eq!(tree.total_keys, 0);
    }
}
