use hkdf::Hkdf;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use keydrop_core::{Hash, Seed, SEED_SIZE, SUBTREE_LEAVES};

/// Fresh per-user seed: SHA-256 over 64 random bytes, truncated.
pub fn generate_seed<R: RngCore + CryptoRng>(rng: &mut R) -> Seed {
    let mut entropy = [0u8; 64];
    rng.fill_bytes(&mut entropy);
    let digest = Sha256::digest(entropy);
    let mut seed = [0u8; SEED_SIZE];
    seed.copy_from_slice(&digest[..SEED_SIZE]);
    seed
}

/// Deterministic subtree filler derived from the user's seed.
///
/// `HKDF-Extract(SHA-256, seed)` then a single expand (empty info) to one
/// full subtree of 32-byte chunks. Claimants re-derive these to tell real
/// leaves from padding without the tree revealing which is which.
pub fn filler_stream(seed: &Seed) -> [Hash; SUBTREE_LEAVES] {
    let hkdf = Hkdf::<Sha256>::new(None, seed);
    let mut okm = [0u8; SUBTREE_LEAVES * 32];
    hkdf.expand(&[], &mut okm)
        .expect("one subtree is within HKDF-SHA256 output bounds");

    let mut out = [[0u8; 32]; SUBTREE_LEAVES];
    for (slot, chunk) in out.iter_mut().zip(okm.chunks_exact(32)) {
        slot.copy_from_slice(chunk);
    }
    out
}
