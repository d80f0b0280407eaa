/// 32-byte hash (BLAKE2b-256 tree leaves, SHA-256 checksums)
pub type Hash = [u8; 32];

/// Per-user seed shared across all of that user's keys
pub type Seed = [u8; SEED_SIZE];

/// Total airdrop supply in base units.
pub const MAX_AIRDROP: u64 = 924_800_000 * 1_000_000;

/// Number of 32-byte leaves committed per subtree.
///
/// Fixed-width subtrees give constant-depth inclusion proofs and hide how
/// many real keys a claimant registered.
pub const SUBTREE_LEAVES: usize = 8;

/// Merkle depth of one subtree (log2 of `SUBTREE_LEAVES`).
pub const SUBTREE_DEPTH: u32 = 3;

/// Size of the per-user encrypted seed.
///
/// Chosen so a PKCS#1 v1.5 envelope over an RSA-1024 key holds the 32-byte
/// nonce prefix plus the seed.
pub const SEED_SIZE: usize = 30;

/// Size of the per-key nonce.
pub const NONCE_SIZE: usize = 32;

/// Number of nonce buckets, addressed by one key-derived byte.
pub const BUCKETS: usize = 256;
