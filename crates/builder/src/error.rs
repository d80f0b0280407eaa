use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("github ssh and pgp lists differ in length ({ssh} vs {pgp})")]
    GithubLengthMismatch { ssh: usize, pgp: usize },

    #[error(
        "github records disagree at index {index}: \
         ssh {ssh_id}/{ssh_name}, pgp {pgp_id}/{pgp_name}"
    )]
    GithubRecordMismatch {
        index: usize,
        ssh_id: u64,
        ssh_name: String,
        pgp_id: u64,
        pgp_name: String,
    },

    #[error("strong-set block {index} has no Key-ID header")]
    MissingKeyId { index: usize },

    #[error("social-news user {user} has an empty key bundle")]
    EmptyBundle { user: String },

    #[error("invalid base64 key data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("pgp decode failed: {0}")]
    Pgp(#[from] keydrop_pgp::PgpError),

    #[error("ssh decode failed: {0}")]
    Ssh(#[from] keydrop_ssh::SshError),

    #[error("key operation failed: {0}")]
    Key(#[from] keydrop_crypto::KeyError),

    #[error("reward {reward} over {recipients} recipients exceeds the airdrop supply")]
    RewardOverflow { reward: u64, recipients: u64 },
}

pub type Result<T> = std::result::Result<T, BuildError>;
