//! Keydrop Cryptography
//!
//! This crate provides the airdrop-key abstraction and the hashing
//! primitives of the commitment tree.

mod key;
mod merkle;
mod seed;

pub use key::*;
pub use merkle::*;
pub use seed::*;
