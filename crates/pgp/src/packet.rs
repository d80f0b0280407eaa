use sha1::{Digest, Sha1};

use crate::{PgpError, Result};

/// Public-key packet tag.
pub const TAG_PUBLIC_KEY: u8 = 6;

/// Curve OID for Ed25519 (1.3.6.1.4.1.11591.15.1).
pub const ED25519_OID: [u8; 9] = [0x2B, 0x06, 0x01, 0x04, 0x01, 0xDA, 0x47, 0x0F, 0x01];

const ALGO_RSA: u8 = 1;
const ALGO_RSA_ENCRYPT: u8 = 2;
const ALGO_RSA_SIGN: u8 = 3;
const ALGO_EDDSA: u8 = 22;

/// Key material for the algorithms the pipeline can act on.
///
/// Anything else is kept opaque; the airdrop-key adapter turns it into an
/// unsupported-algorithm outcome rather than a decode failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    /// Big-endian modulus and exponent, leading zeros stripped.
    Rsa { n: Vec<u8>, e: Vec<u8> },
    /// Curve OID plus the raw point MPI with any SEC prefix byte removed.
    EdDsa { oid: Vec<u8>, point: Vec<u8> },
    Other,
}

/// A decoded public-key packet.
#[derive(Debug, Clone)]
pub struct PublicKey {
    pub version: u8,
    pub created: u32,
    pub algorithm: u8,
    pub material: KeyMaterial,
    body: Vec<u8>,
}

impl PublicKey {
    /// Decode the first packet of a binary packet stream.
    ///
    /// The stream must open with a public-key packet; trailing packets
    /// (user ids, signatures, subkeys) are ignored.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let (tag, body) = read_packet(data)?;
        if tag != TAG_PUBLIC_KEY {
            return Err(PgpError::UnexpectedPacket(tag));
        }
        Self::from_body(body)
    }

    fn from_body(body: &[u8]) -> Result<Self> {
        let mut r = Reader::new(body);
        let version = r.u8()?;

        let (created, algorithm, material) = match version {
            2 | 3 | 4 => {
                let created = r.u32()?;
                if version != 4 {
                    // v2/v3 validity period in days
                    let _ = r.u16()?;
                }
                let algorithm = r.u8()?;
                let material = match algorithm {
                    ALGO_RSA | ALGO_RSA_ENCRYPT | ALGO_RSA_SIGN => {
                        let n = r.mpi()?;
                        let e = r.mpi()?;
                        KeyMaterial::Rsa { n, e }
                    }
                    ALGO_EDDSA => {
                        let oid_len = r.u8()? as usize;
                        if oid_len == 0 || oid_len > 32 {
                            return Err(PgpError::MalformedKey);
                        }
                        let oid = r.take(oid_len)?.to_vec();
                        let mut point = r.mpi()?;
                        // SEC-style compression prefix on the native point
                        if point.len() == 33 && point[0] == 0x40 {
                            point.remove(0);
                        }
                        KeyMaterial::EdDsa { oid, point }
                    }
                    _ => KeyMaterial::Other,
                };
                (created, algorithm, material)
            }
            // Unknown layout; keep the body for fingerprinting and let the
            // adapter classify the version as unsupported.
            _ => (0, 0, KeyMaterial::Other),
        };

        Ok(PublicKey {
            version,
            created,
            algorithm,
            material,
            body: body.to_vec(),
        })
    }

    /// V4 fingerprint: `SHA-1(0x99 || len || body)`.
    pub fn fingerprint(&self) -> [u8; 20] {
        let mut hasher = Sha1::new();
        hasher.update([0x99]);
        hasher.update((self.body.len() as u16).to_be_bytes());
        hasher.update(&self.body);
        let digest = hasher.finalize();
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest);
        out
    }

    /// Trailing 8 bytes of the fingerprint, the id keyservers publish.
    pub fn key_id(&self) -> [u8; 8] {
        let fp = self.fingerprint();
        let mut out = [0u8; 8];
        out.copy_from_slice(&fp[12..]);
        out
    }
}

/// Split one packet off the front of `data`, returning `(tag, body)`.
fn read_packet(data: &[u8]) -> Result<(u8, &[u8])> {
    let first = *data.first().ok_or(PgpError::Truncated)?;
    if first & 0x80 == 0 {
        return Err(PgpError::InvalidFraming);
    }

    let (tag, len, header_len) = if first & 0x40 != 0 {
        // New format
        let tag = first & 0x3F;
        let o1 = *data.get(1).ok_or(PgpError::Truncated)? as usize;
        match o1 {
            0..=191 => (tag, o1, 2),
            192..=223 => {
                let o2 = *data.get(2).ok_or(PgpError::Truncated)? as usize;
                (tag, ((o1 - 192) << 8) + o2 + 192, 3)
            }
            255 => {
                let bytes = data.get(2..6).ok_or(PgpError::Truncated)?;
                let len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                (tag, len as usize, 6)
            }
            // Partial body lengths never appear in key packets
            _ => return Err(PgpError::UnsupportedLength),
        }
    } else {
        // Old format
        let tag = (first >> 2) & 0x0F;
        match first & 0x03 {
            0 => {
                let len = *data.get(1).ok_or(PgpError::Truncated)? as usize;
                (tag, len, 2)
            }
            1 => {
                let bytes = data.get(1..3).ok_or(PgpError::Truncated)?;
                (tag, u16::from_be_bytes([bytes[0], bytes[1]]) as usize, 3)
            }
            2 => {
                let bytes = data.get(1..5).ok_or(PgpError::Truncated)?;
                let len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                (tag, len as usize, 5)
            }
            // Indeterminate length
            _ => return Err(PgpError::UnsupportedLength),
        }
    };

    let body = data
        .get(header_len..header_len + len)
        .ok_or(PgpError::Truncated)?;
    Ok((tag, body))
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let out = self
            .data
            .get(self.pos..self.pos + n)
            .ok_or(PgpError::Truncated)?;
        self.pos += n;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Multiprecision integer: 2-byte bit count then big-endian magnitude.
    /// Leading zero bytes are stripped so equal integers encode equally.
    fn mpi(&mut self) -> Result<Vec<u8>> {
        let bits = self.u16()? as usize;
        let len = (bits + 7) / 8;
        let raw = self.take(len)?;
        let start = raw.iter().position(|&b| b != 0).unwrap_or(raw.len());
        Ok(raw[start..].to_vec())
    }
}
