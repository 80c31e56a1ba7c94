//! Neynar API response types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Bulk lookup response: queried address → matching users (best match first)
pub type BulkUsersResponse = HashMap<String, Vec<User>>;

/// A Farcaster user as returned by Neynar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub fid: u64,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub pfp_url: Option<String>,
    #[serde(default)]
    pub custody_address: Option<String>,
    #[serde(default)]
    pub verified_addresses: VerifiedAddresses,
}

impl User {
    /// Every verified address across chains, as returned by the API
    pub fn linked_addresses(&self) -> impl Iterator<Item = &str> {
        self.verified_addresses
            .eth_addresses
            .iter()
            .chain(self.verified_addresses.sol_addresses.iter())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedAddresses {
    #[serde(default)]
    pub eth_addresses: Vec<String>,
    #[serde(default)]
    pub sol_addresses: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PowerUsersResponse {
    pub(crate) result: PowerUsersResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PowerUsersResult {
    pub(crate) fids: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_response_deserialization() {
        let json = r#"{
            "0xabc": [
                {
                    "object": "user",
                    "fid": 3,
                    "username": "dwr",
                    "display_name": "Dan Romero",
                    "custody_address": "0x6b0bda3f2ffed5efc83fa8c024acff1dd45793f1",
                    "pfp_url": "https://example.com/dwr.png",
                    "verified_addresses": {
                        "eth_addresses": ["0xD7029BDEa1c17493893AAfE29AAD69EF892B8ff2"],
                        "sol_addresses": []
                    }
                }
            ],
            "0xdef": []
        }"#;

        let response: BulkUsersResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.len(), 2);
        let user = &response["0xabc"][0];
        assert_eq!(user.fid, 3);
        assert_eq!(user.username, "dwr");
        assert_eq!(user.display_name.as_deref(), Some("Dan Romero"));
        assert_eq!(user.verified_addresses.eth_addresses.len(), 1);
        assert!(response["0xdef"].is_empty());
    }

    #[test]
    fn test_user_minimal_fields() {
        let json = r#"{"fid": 42, "username": "minimal"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.fid, 42);
        assert!(user.display_name.is_none());
        assert!(user.pfp_url.is_none());
        assert_eq!(user.linked_addresses().count(), 0);
    }

    #[test]
    fn test_linked_addresses_spans_chains() {
        let user = User {
            fid: 7,
            username: "multi".to_string(),
            display_name: None,
            pfp_url: None,
            custody_address: None,
            verified_addresses: VerifiedAddresses {
                eth_addresses: vec!["0xAAA".to_string(), "0xBBB".to_string()],
                sol_addresses: vec!["So1ana".to_string()],
            },
        };
        let linked: Vec<&str> = user.linked_addresses().collect();
        assert_eq!(linked, vec!["0xAAA", "0xBBB", "So1ana"]);
    }

    #[test]
    fn test_power_users_response_deserialization() {
        let json = r#"{"result": {"fids": [1, 2, 3]}}"#;
        let response: PowerUsersResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.result.fids, vec![1, 2, 3]);
    }
}
