use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce as AeadNonce};
use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::edwards::CompressedEdwardsY;
use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, RngCore};
use rsa::{BigUint, Pkcs1v15Encrypt, RsaPublicKey};
use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;
use x25519_dalek::{EphemeralSecret, PublicKey as X25519PublicKey};

use keydrop_core::{Hash, Seed, NONCE_SIZE, SEED_SIZE};
use keydrop_pgp::{KeyMaterial, ED25519_OID};
use keydrop_ssh::SshMaterial;

use crate::merkle::blake2b256;

/// Per-key nonce committed alongside the key.
pub type KeyNonce = [u8; NONCE_SIZE];

const PGP_ALGO_RSA: u8 = 1;

#[derive(Error, Debug)]
pub enum KeyError {
    /// The airdrop protocol excludes this key type. The only non-fatal
    /// adapter error: callers count it and move on.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid curve point")]
    InvalidPoint,

    #[error("rsa encryption failed: {0}")]
    Rsa(#[from] rsa::Error),

    #[error("aead encryption failed")]
    Aead,
}

pub type Result<T> = std::result::Result<T, KeyError>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Algorithm {
    /// Big-endian modulus and exponent, leading zeros stripped.
    Rsa { n: Vec<u8>, e: Vec<u8> },
    /// Compressed Edwards point.
    Ed25519 { point: [u8; 32] },
}

/// Uniform airdrop key over the heterogeneous upstream encodings.
///
/// One value commits to one public key. Applying a nonce produces the
/// "post-nonce" form whose hash is committed next to the original, so a
/// claimant can prove both the key they own and the nonce they decrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirdropKey {
    algorithm: Algorithm,
    /// Set once a nonce has been applied to an RSA key. RSA admits no
    /// algebraic tweak, so the nonce enters the canonical encoding instead.
    tweak: Option<KeyNonce>,
}

impl AirdropKey {
    /// Adapt a decoded PGP public-key packet.
    pub fn from_pgp(key: &keydrop_pgp::PublicKey) -> Result<Self> {
        if key.version != 4 {
            return Err(KeyError::UnsupportedAlgorithm(format!(
                "pgp v{} key",
                key.version
            )));
        }
        match &key.material {
            KeyMaterial::Rsa { n, e } if key.algorithm == PGP_ALGO_RSA => Ok(Self {
                algorithm: Algorithm::Rsa {
                    n: n.clone(),
                    e: e.clone(),
                },
                tweak: None,
            }),
            KeyMaterial::EdDsa { oid, point } if oid[..] == ED25519_OID && point.len() == 32 => {
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(point);
                Ok(Self {
                    algorithm: Algorithm::Ed25519 { point: bytes },
                    tweak: None,
                })
            }
            _ => Err(KeyError::UnsupportedAlgorithm(format!(
                "pgp algorithm {}",
                key.algorithm
            ))),
        }
    }

    /// Adapt a decoded OpenSSH public key.
    pub fn from_ssh(key: &keydrop_ssh::PublicKey) -> Result<Self> {
        match &key.material {
            SshMaterial::Rsa { e, n } => Ok(Self {
                algorithm: Algorithm::Rsa {
                    n: n.clone(),
                    e: e.clone(),
                },
                tweak: None,
            }),
            SshMaterial::Ed25519(point) if point.len() == 32 => {
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(point);
                Ok(Self {
                    algorithm: Algorithm::Ed25519 { point: bytes },
                    tweak: None,
                })
            }
            _ => Err(KeyError::UnsupportedAlgorithm(key.algorithm.clone())),
        }
    }

    /// Semantic validity of the key parameters.
    pub fn validate(&self) -> bool {
        match &self.algorithm {
            Algorithm::Rsa { n, e } => {
                let n_bits = bit_length(n);
                if !(1024..=4096).contains(&n_bits) {
                    return false;
                }
                // modulus and exponent of a usable RSA key are odd
                if n.last().map_or(true, |b| b & 1 == 0) {
                    return false;
                }
                if e.last().map_or(true, |b| b & 1 == 0) {
                    return false;
                }
                (2..=33).contains(&bit_length(e))
            }
            Algorithm::Ed25519 { point } => match CompressedEdwardsY(*point).decompress() {
                Some(p) => !p.is_small_order(),
                None => false,
            },
        }
    }

    /// Bucket index: low byte of SHA-256 over the canonical encoding.
    pub fn bucket(&self) -> u8 {
        Sha256::digest(self.encode())[0]
    }

    /// BLAKE2b-256 of the canonical encoding; this is the tree leaf.
    pub fn hash(&self) -> Hash {
        blake2b256(&self.encode())
    }

    /// Fresh nonce plus the post-nonce form of this key.
    pub fn generate<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<(KeyNonce, AirdropKey)> {
        let mut nonce = [0u8; NONCE_SIZE];
        rng.fill_bytes(&mut nonce);
        let mut tweaked = self.clone();
        tweaked.apply_nonce(&nonce)?;
        Ok((nonce, tweaked))
    }

    /// Rebind the key to a nonce.
    ///
    /// Ed25519 keys are tweaked on the curve (`P + H(nonce)·G`), matching
    /// what the claimant does to their private scalar. RSA keys commit to
    /// the nonce through their encoding.
    pub fn apply_nonce(&mut self, nonce: &KeyNonce) -> Result<()> {
        match &mut self.algorithm {
            Algorithm::Rsa { .. } => {
                self.tweak = Some(*nonce);
                Ok(())
            }
            Algorithm::Ed25519 { point } => {
                let decompressed = CompressedEdwardsY(*point)
                    .decompress()
                    .ok_or(KeyError::InvalidPoint)?;
                let scalar = nonce_scalar(nonce);
                let tweaked = decompressed + scalar * ED25519_BASEPOINT_POINT;
                *point = tweaked.compress().to_bytes();
                Ok(())
            }
        }
    }

    /// Encrypt `nonce || seed` to this key.
    ///
    /// Always uses the pre-nonce key material: the claimant cannot know the
    /// nonce before opening this envelope.
    pub fn encrypt<R: RngCore + CryptoRng>(
        &self,
        nonce: &KeyNonce,
        seed: &Seed,
        rng: &mut R,
    ) -> Result<Vec<u8>> {
        let mut msg = Vec::with_capacity(NONCE_SIZE + SEED_SIZE);
        msg.extend_from_slice(nonce);
        msg.extend_from_slice(seed);

        match &self.algorithm {
            Algorithm::Rsa { n, e } => {
                let key =
                    RsaPublicKey::new(BigUint::from_bytes_be(n), BigUint::from_bytes_be(e))?;
                Ok(key.encrypt(rng, Pkcs1v15Encrypt, &msg)?)
            }
            Algorithm::Ed25519 { point } => {
                let decompressed = CompressedEdwardsY(*point)
                    .decompress()
                    .ok_or(KeyError::InvalidPoint)?;
                let recipient = X25519PublicKey::from(decompressed.to_montgomery().to_bytes());

                let ephemeral = EphemeralSecret::random_from_rng(&mut *rng);
                let ephemeral_public = X25519PublicKey::from(&ephemeral);
                let shared = ephemeral.diffie_hellman(&recipient);

                let symmetric_key: [u8; 32] = Sha256::digest(shared.as_bytes()).into();
                let cipher = ChaCha20Poly1305::new_from_slice(&symmetric_key)
                    .map_err(|_| KeyError::Aead)?;

                let mut aead_nonce = [0u8; 12];
                rng.fill_bytes(&mut aead_nonce);
                let ciphertext = cipher
                    .encrypt(AeadNonce::from_slice(&aead_nonce), msg.as_slice())
                    .map_err(|_| KeyError::Aead)?;

                let mut out = Vec::with_capacity(32 + 12 + ciphertext.len());
                out.extend_from_slice(ephemeral_public.as_bytes());
                out.extend_from_slice(&aead_nonce);
                out.extend_from_slice(&ciphertext);
                Ok(out)
            }
        }
    }

    /// Canonical encoding, the preimage of `hash()` and `bucket()`.
    ///
    /// RSA: `0x01 || len(n) || n || len(e) || e [|| nonce]`;
    /// Ed25519: `0x02 || point`.
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match &self.algorithm {
            Algorithm::Rsa { n, e } => {
                out.push(0x01);
                out.extend_from_slice(&(n.len() as u16).to_be_bytes());
                out.extend_from_slice(n);
                out.extend_from_slice(&(e.len() as u16).to_be_bytes());
                out.extend_from_slice(e);
            }
            Algorithm::Ed25519 { point } => {
                out.push(0x02);
                out.extend_from_slice(point);
            }
        }
        if let Some(tweak) = &self.tweak {
            out.extend_from_slice(tweak);
        }
        out
    }
}

/// Reduce a nonce to a curve scalar via SHA-512, the ed25519 way.
fn nonce_scalar(nonce: &KeyNonce) -> Scalar {
    let digest = Sha512::digest(nonce);
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&digest);
    Scalar::from_bytes_mod_order_wide(&wide)
}

fn bit_length(bytes: &[u8]) -> usize {
    match bytes.first() {
        Some(&first) => (bytes.len() - 1) * 8 + (8 - first.leading_zeros() as usize),
        None => 0,
    }
}
