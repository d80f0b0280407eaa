use serde::Deserialize;

/// One claimant from the pre-existing faucet list (`faucet.json`).
///
/// Faucet members already hold a reward allocation; any upstream entity
/// matching one of their identity fields is excluded from the key-derived
/// commitment.
#[derive(Debug, Clone, Deserialize)]
pub struct FaucetEntry {
    pub email: String,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub pgp: Option<String>,
    #[serde(default)]
    pub freenode: Option<String>,
    pub address: String,
    pub shares: u64,
}

/// `github-ssh.json` entry: `[id, name, [[key_id, openssh_line], ...]]`.
///
/// Upstream serializes records as positional JSON arrays; deserializing into
/// tuple structs makes any shape drift a hard error instead of a silent
/// misread.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubSshUser(u64, String, Vec<GithubSshKey>);

impl GithubSshUser {
    pub fn id(&self) -> u64 {
        self.0
    }

    pub fn name(&self) -> &str {
        &self.1
    }

    pub fn keys(&self) -> &[GithubSshKey] {
        &self.2
    }
}

/// `[key_id, openssh_line]`
#[derive(Debug, Clone, Deserialize)]
pub struct GithubSshKey(i64, String);

impl GithubSshKey {
    pub fn id(&self) -> i64 {
        self.0
    }

    pub fn line(&self) -> &str {
        &self.1
    }
}

/// `github-pgp.json` entry, parallel-indexed with `github-ssh.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubPgpUser(u64, String, Vec<GithubPgpKey>);

impl GithubPgpUser {
    pub fn id(&self) -> u64 {
        self.0
    }

    pub fn name(&self) -> &str {
        &self.1
    }

    pub fn keys(&self) -> &[GithubPgpKey] {
        &self.2
    }
}

/// `[id, parent_id, key_id, base64_key, emails, uses, ctime, etime, depth]`
#[derive(Debug, Clone, Deserialize)]
pub struct GithubPgpKey(
    i64,
    i64,
    String,
    String,
    Vec<GithubEmail>,
    i64,
    i64,
    i64,
    i64,
);

impl GithubPgpKey {
    pub fn id(&self) -> i64 {
        self.0
    }

    /// `-1` marks a primary key; anything else is a subkey record.
    pub fn parent_id(&self) -> i64 {
        self.1
    }

    /// Declared 16-hex-char key id.
    pub fn key_id(&self) -> &str {
        &self.2
    }

    /// Base64 of the raw public-key packet stream.
    pub fn data(&self) -> &str {
        &self.3
    }

    pub fn emails(&self) -> &[GithubEmail] {
        &self.4
    }

    pub fn has_verified_email(&self) -> bool {
        self.4.iter().any(|e| e.verified())
    }
}

/// `[email, verified]` where verified is 0 or 1.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubEmail(String, i64);

impl GithubEmail {
    pub fn address(&self) -> &str {
        &self.0
    }

    pub fn verified(&self) -> bool {
        self.1 == 1
    }
}

/// `hn-keys.json` entry: `[hn_user, keybase_user, primary_key, addresses]`.
#[derive(Debug, Clone, Deserialize)]
pub struct HnUser(String, String, HnKey, Vec<HnAddress>);

impl HnUser {
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn keybase(&self) -> &str {
        &self.1
    }

    pub fn key(&self) -> &HnKey {
        &self.2
    }

    pub fn addresses(&self) -> &[HnAddress] {
        &self.3
    }
}

/// `[fingerprint, kid, ktype, ctime, mtime, armored_bundle]`
#[derive(Debug, Clone, Deserialize)]
pub struct HnKey(String, String, i64, i64, i64, String);

impl HnKey {
    /// Declared 40-hex-char full fingerprint.
    pub fn fingerprint(&self) -> &str {
        &self.0
    }

    pub fn kid(&self) -> &str {
        &self.1
    }

    /// Armored PGP public-key bundle.
    pub fn bundle(&self) -> &str {
        &self.5
    }
}

/// `[currency, address]`
#[derive(Debug, Clone, Deserialize)]
pub struct HnAddress(String, String);

impl HnAddress {
    pub fn currency(&self) -> &str {
        &self.0
    }

    pub fn address(&self) -> &str {
        &self.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faucet_entry_optional_fields() {
        let entry: FaucetEntry = serde_json::from_str(
            r#"{"email":"a@b.c","github":"Octocat","address":"hs1q...","shares":5}"#,
        )
        .unwrap();
        assert_eq!(entry.email, "a@b.c");
        assert_eq!(entry.github.as_deref(), Some("Octocat"));
        assert!(entry.pgp.is_none());
        assert!(entry.freenode.is_none());
        assert_eq!(entry.shares, 5);
    }

    #[test]
    fn test_github_ssh_user_shape() {
        let user: GithubSshUser =
            serde_json::from_str(r#"[42,"alice",[[7,"ssh-ed25519 AAAA alice@host"]]]"#).unwrap();
        assert_eq!(user.id(), 42);
        assert_eq!(user.name(), "alice");
        assert_eq!(user.keys().len(), 1);
        assert_eq!(user.keys()[0].id(), 7);
    }

    #[test]
    fn test_github_ssh_user_rejects_short_record() {
        let result: Result<GithubSshUser, _> = serde_json::from_str(r#"[42,"alice"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_github_pgp_key_shape() {
        let key: GithubPgpKey = serde_json::from_str(
            r#"[9,-1,"0123456789ABCDEF","QUJD",[["a@b.c",1],["x@y.z",0]],1,100,200,0]"#,
        )
        .unwrap();
        assert_eq!(key.id(), 9);
        assert_eq!(key.parent_id(), -1);
        assert_eq!(key.key_id(), "0123456789ABCDEF");
        assert!(key.has_verified_email());
    }

    #[test]
    fn test_github_pgp_key_unverified_emails() {
        let key: GithubPgpKey =
            serde_json::from_str(r#"[9,3,"0123456789ABCDEF","QUJD",[["a@b.c",0]],1,100,200,0]"#)
                .unwrap();
        assert_eq!(key.parent_id(), 3);
        assert!(!key.has_verified_email());
    }

    #[test]
    fn test_hn_user_shape() {
        let user: HnUser = serde_json::from_str(
            r#"["pg","pg_kb",["AB12","0101",1,10,20,"-----BEGIN..."],[["BTC","1abc"]]]"#,
        )
        .unwrap();
        assert_eq!(user.name(), "pg");
        assert_eq!(user.keybase(), "pg_kb");
        assert_eq!(user.key().fingerprint(), "AB12");
        assert_eq!(user.addresses()[0].currency(), "BTC");
    }
}
