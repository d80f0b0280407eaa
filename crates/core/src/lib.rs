//! Keydrop Core Types
//!
//! This crate defines the protocol constants and the typed upstream records
//! used throughout Keydrop.

mod constants;
mod records;

pub use constants::*;
pub use records::*;
