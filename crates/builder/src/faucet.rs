use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use keydrop_core::FaucetEntry;

use crate::error::Result;
use crate::sources::read_json;

/// The pre-existing claimant list: an identity dedup set plus share totals.
///
/// Faucet members already hold an allocation, so any upstream entity whose
/// github handle, email or other identity matches one of these entries is
/// excluded from the key-derived commitment.
pub struct Faucet {
    identities: HashSet<String>,
    entries: u64,
    shares: u64,
}

impl Faucet {
    pub fn load(prefix: &Path) -> Result<Self> {
        let entries: Vec<FaucetEntry> = read_json(&prefix.join("faucet.json"))?;
        let faucet = Self::from_entries(&entries);
        info!(
            entries = faucet.entries,
            shares = faucet.shares,
            "faucet loaded"
        );
        Ok(faucet)
    }

    pub fn from_entries(entries: &[FaucetEntry]) -> Self {
        let mut identities = HashSet::new();
        let mut shares = 0u64;
        for entry in entries {
            identities.insert(entry.email.to_lowercase());
            for identity in [&entry.github, &entry.pgp, &entry.freenode]
                .into_iter()
                .flatten()
            {
                identities.insert(identity.to_lowercase());
            }
            shares += entry.shares;
        }
        Self {
            identities,
            entries: entries.len() as u64,
            shares,
        }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, identity: &str) -> bool {
        self.identities.contains(&identity.to_lowercase())
    }

    pub fn entries(&self) -> u64 {
        self.entries
    }

    pub fn shares(&self) -> u64 {
        self.shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(email: &str, github: Option<&str>, shares: u64) -> FaucetEntry {
        serde_json::from_str(&format!(
            r#"{{"email":"{}","github":{},"address":"hs1q0","shares":{}}}"#,
            email,
            github.map_or("null".to_string(), |g| format!("\"{}\"", g)),
            shares,
        ))
        .unwrap()
    }

    #[test]
    fn test_identities_are_lowercased() {
        let faucet = Faucet::from_entries(&[entry("Alice@Example.COM", Some("OctoCat"), 2)]);
        assert!(faucet.contains("alice@example.com"));
        assert!(faucet.contains("ALICE@EXAMPLE.COM"));
        assert!(faucet.contains("octocat"));
        assert!(!faucet.contains("bob@example.com"));
    }

    #[test]
    fn test_shares_and_entries_accumulate() {
        let faucet = Faucet::from_entries(&[
            entry("a@x.com", None, 3),
            entry("b@x.com", Some("b"), 4),
        ]);
        assert_eq!(faucet.entries(), 2);
        assert_eq!(faucet.shares(), 7);
    }

    #[test]
    fn test_empty_faucet() {
        let faucet = Faucet::from_entries(&[]);
        assert_eq!(faucet.entries(), 0);
        assert_eq!(faucet.shares(), 0);
        assert!(!faucet.contains("anyone"));
    }
}
