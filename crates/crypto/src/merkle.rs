use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

use keydrop_core::Hash;

type Blake2b256 = Blake2b<U32>;

/// BLAKE2b-256 of a byte string.
pub fn blake2b256(data: &[u8]) -> Hash {
    let digest = Blake2b256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Root of a duplicate-last binary Merkle tree.
///
/// An odd node at any level is hashed with itself. The root of a single
/// leaf is that leaf; the root of the empty sequence is the hash of the
/// empty string.
pub fn merkle_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return blake2b256(&[]);
    }

    let mut nodes = leaves.to_vec();
    while nodes.len() > 1 {
        let mut next = Vec::with_capacity((nodes.len() + 1) / 2);
        for pair in nodes.chunks(2) {
            let left = &pair[0];
            let right = pair.get(1).unwrap_or(left);
            let mut hasher = Blake2b256::new();
            hasher.update(left);
            hasher.update(right);
            let digest = hasher.finalize();
            let mut parent = [0u8; 32];
            parent.copy_from_slice(&digest);
            next.push(parent);
        }
        nodes = next;
    }
    nodes[0]
}

/// Proof depth of a duplicate-last tree over `n` leaves.
pub fn tree_depth(mut n: u64) -> u32 {
    let mut depth = 0;
    while n > 1 {
        n = (n + 1) >> 1;
        depth += 1;
    }
    depth
}
