//! Keydrop PGP decoding
//!
//! Minimal RFC 4880 support: public-key packet framing and key material for
//! the algorithms the airdrop can commit to, plus an ASCII armor reader for
//! the strong-set dump and keybase-style bundles. Signatures, user ids and
//! subkey packets are never interpreted here.

mod armor;
mod packet;

pub use armor::{parse_armored_stream, ArmoredBlock};
pub use packet::{KeyMaterial, PublicKey, ED25519_OID, TAG_PUBLIC_KEY};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PgpError {
    #[error("truncated packet")]
    Truncated,

    #[error("not a packet header")]
    InvalidFraming,

    #[error("unsupported packet length encoding")]
    UnsupportedLength,

    #[error("unexpected packet tag {0}")]
    UnexpectedPacket(u8),

    #[error("malformed key material")]
    MalformedKey,

    #[error("armored block is not terminated")]
    UnterminatedArmor,

    #[error("invalid base64 in armored block: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, PgpError>;
