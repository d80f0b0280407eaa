//! Keydrop SSH decoding
//!
//! Parses single-line OpenSSH public keys (`<type> <base64> [comment]`) into
//! the raw material the airdrop-key adapter consumes. Key types outside the
//! airdrop protocol are preserved as opaque so the adapter can classify them
//! instead of failing the decode.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SshError {
    #[error("malformed public key line")]
    MalformedLine,

    #[error("invalid base64 blob: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("truncated key blob")]
    Truncated,

    #[error("key type differs between line and blob")]
    TypeMismatch,
}

pub type Result<T> = std::result::Result<T, SshError>;

/// Wire material of one SSH public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshMaterial {
    /// Big-endian exponent and modulus, leading zeros stripped.
    Rsa { e: Vec<u8>, n: Vec<u8> },
    Ed25519(Vec<u8>),
    Other,
}

/// A decoded OpenSSH public key.
#[derive(Debug, Clone)]
pub struct PublicKey {
    pub algorithm: String,
    pub material: SshMaterial,
}

impl PublicKey {
    /// Parse an `authorized_keys`-style line.
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let algorithm = parts.next().ok_or(SshError::MalformedLine)?;
        let blob = parts.next().ok_or(SshError::MalformedLine)?;
        let blob = BASE64.decode(blob.as_bytes())?;

        let mut r = Reader::new(&blob);
        let embedded = r.string()?;
        if embedded != algorithm.as_bytes() {
            return Err(SshError::TypeMismatch);
        }

        let material = match algorithm {
            "ssh-rsa" => {
                let e = strip_leading_zeros(r.string()?);
                let n = strip_leading_zeros(r.string()?);
                SshMaterial::Rsa { e, n }
            }
            "ssh-ed25519" => SshMaterial::Ed25519(r.string()?.to_vec()),
            _ => SshMaterial::Other,
        };

        Ok(PublicKey {
            algorithm: algorithm.to_string(),
            material,
        })
    }
}

fn strip_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// RFC 4251 `string`: u32 length prefix then raw bytes.
    fn string(&mut self) -> Result<&'a [u8]> {
        let len = self
            .data
            .get(self.pos..self.pos + 4)
            .ok_or(SshError::Truncated)?;
        let len = u32::from_be_bytes([len[0], len[1], len[2], len[3]]) as usize;
        self.pos += 4;
        let out = self
            .data
            .get(self.pos..self.pos + len)
            .ok_or(SshError::Truncated)?;
        self.pos += len;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_line(algorithm: &str, fields: &[&[u8]]) -> String {
        let mut blob = Vec::new();
        blob.extend_from_slice(&(algorithm.len() as u32).to_be_bytes());
        blob.extend_from_slice(algorithm.as_bytes());
        for field in fields {
            blob.extend_from_slice(&(field.len() as u32).to_be_bytes());
            blob.extend_from_slice(field);
        }
        format!("{} {} test@host", algorithm, BASE64.encode(&blob))
    }

    #[test]
    fn test_parse_rsa() {
        // mpint encoding pads a high-bit modulus with a zero byte
        let mut n = vec![0u8];
        n.extend_from_slice(&[0xC3; 256]);
        let line = encode_line("ssh-rsa", &[&[1, 0, 1], &n]);

        let key = PublicKey::parse(&line).unwrap();
        assert_eq!(key.algorithm, "ssh-rsa");
        assert_eq!(
            key.material,
            SshMaterial::Rsa {
                e: vec![1, 0, 1],
                n: vec![0xC3; 256],
            }
        );
    }

    #[test]
    fn test_parse_ed25519() {
        let line = encode_line("ssh-ed25519", &[&[9u8; 32]]);
        let key = PublicKey::parse(&line).unwrap();
        assert_eq!(key.material, SshMaterial::Ed25519(vec![9u8; 32]));
    }

    #[test]
    fn test_unknown_type_is_opaque() {
        let line = encode_line("ecdsa-sha2-nistp256", &[b"nistp256", &[4u8; 65]]);
        let key = PublicKey::parse(&line).unwrap();
        assert_eq!(key.algorithm, "ecdsa-sha2-nistp256");
        assert_eq!(key.material, SshMaterial::Other);
    }

    #[test]
    fn test_type_mismatch() {
        let blob = {
            let mut b = Vec::new();
            b.extend_from_slice(&11u32.to_be_bytes());
            b.extend_from_slice(b"ssh-ed25519");
            b.extend_from_slice(&32u32.to_be_bytes());
            b.extend_from_slice(&[9u8; 32]);
            b
        };
        let line = format!("ssh-rsa {}", BASE64.encode(&blob));
        assert!(matches!(
            PublicKey::parse(&line),
            Err(SshError::TypeMismatch)
        ));
    }

    #[test]
    fn test_missing_blob() {
        assert!(matches!(
            PublicKey::parse("ssh-rsa"),
            Err(SshError::MalformedLine)
        ));
    }

    #[test]
    fn test_truncated_blob() {
        let mut blob = Vec::new();
        blob.extend_from_slice(&7u32.to_be_bytes());
        blob.extend_from_slice(b"ssh-rsa");
        blob.extend_from_slice(&100u32.to_be_bytes()); // length past the end
        let line = format!("ssh-rsa {}", BASE64.encode(&blob));
        assert!(matches!(PublicKey::parse(&line), Err(SshError::Truncated)));
    }

    #[test]
    fn test_bad_base64() {
        assert!(matches!(
            PublicKey::parse("ssh-rsa %%%%"),
            Err(SshError::Base64(_))
        ));
    }
}
