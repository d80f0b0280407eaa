use keydrop_core::{Hash, Seed, SUBTREE_LEAVES};
use keydrop_crypto::{filler_stream, merkle_root};

/// One sealed subtree: exactly [`SUBTREE_LEAVES`] byte-sorted hashes.
pub type SubtreeLeaves = [Hash; SUBTREE_LEAVES];

/// Accumulates the hash pairs of one user's keys, then pads and seals
/// them into a fixed-width subtree.
#[derive(Debug, Clone)]
pub struct SubtreeBuilder {
    seed: Seed,
    hashes: Vec<Hash>,
}

impl SubtreeBuilder {
    pub fn new(seed: Seed) -> Self {
        Self {
            seed,
            hashes: Vec::with_capacity(SUBTREE_LEAVES),
        }
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.hashes.len() >= SUBTREE_LEAVES
    }

    /// Push the pre- and post-nonce hashes of one committed key.
    pub fn push_pair(&mut self, key_hash: Hash, new_key_hash: Hash) {
        debug_assert!(self.hashes.len() + 2 <= SUBTREE_LEAVES);
        self.hashes.push(key_hash);
        self.hashes.push(new_key_hash);
    }

    /// Pad with seed-derived filler chunks (taken from the front of the
    /// stream) and sort all leaves by unsigned byte-wise comparison.
    pub fn finish(mut self) -> SubtreeLeaves {
        let filler = filler_stream(&self.seed);
        let mut next = 0;
        while self.hashes.len() < SUBTREE_LEAVES {
            self.hashes.push(filler[next]);
            next += 1;
        }

        // [u8; 32] orders lexicographically on unsigned bytes
        self.hashes.sort_unstable();

        let mut leaves = [[0u8; 32]; SUBTREE_LEAVES];
        leaves.copy_from_slice(&self.hashes);
        leaves
    }
}

/// Merkle root of one sealed subtree.
pub fn subtree_root(leaves: &SubtreeLeaves) -> Hash {
    merkle_root(leaves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keydrop_core::SEED_SIZE;

    const SEED: Seed = [7u8; SEED_SIZE];

    #[test]
    fn test_empty_subtree_is_all_filler_sorted() {
        let leaves = SubtreeBuilder::new(SEED).finish();

        let mut expected: Vec<Hash> = filler_stream(&SEED).to_vec();
        expected.sort_unstable();
        assert_eq!(leaves.to_vec(), expected);
    }

    #[test]
    fn test_partial_subtree_pads_from_front_of_stream() {
        let mut builder = SubtreeBuilder::new(SEED);
        builder.push_pair([0xAA; 32], [0xBB; 32]);
        builder.push_pair([0xCC; 32], [0xDD; 32]);
        let leaves = builder.finish();

        let filler = filler_stream(&SEED);
        let mut expected = vec![
            [0xAA; 32],
            [0xBB; 32],
            [0xCC; 32],
            [0xDD; 32],
            filler[0],
            filler[1],
            filler[2],
            filler[3],
        ];
        expected.sort_unstable();
        assert_eq!(leaves.to_vec(), expected);
    }

    #[test]
    fn test_full_subtree_gets_no_filler() {
        let mut builder = SubtreeBuilder::new(SEED);
        for i in 0..4u8 {
            builder.push_pair([2 * i; 32], [2 * i + 1; 32]);
        }
        assert!(builder.is_full());

        let leaves = builder.finish();
        let filler = filler_stream(&SEED);
        assert!(leaves.iter().all(|leaf| !filler.contains(leaf)));
    }

    #[test]
    fn test_leaves_are_sorted_ascending() {
        let mut builder = SubtreeBuilder::new(SEED);
        builder.push_pair([0xFF; 32], [0x00; 32]);
        let leaves = builder.finish();
        assert!(leaves.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_fill_state_tracking() {
        let mut builder = SubtreeBuilder::new(SEED);
        assert!(builder.is_empty());
        assert!(!builder.is_full());
        for i in 0..4u8 {
            builder.push_pair([i; 32], [i + 100; 32]);
        }
        assert!(!builder.is_empty());
        assert!(builder.is_full());
    }
}
