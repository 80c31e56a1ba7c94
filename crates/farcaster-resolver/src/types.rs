//! Core types for the address resolver

use chrono::{DateTime, Utc};
use neynar_client::User;
use serde::{Deserialize, Serialize};

/// Which naming system an identity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    Farcaster,
    Ens,
    Base,
}

/// An identity bound to an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIdentity {
    pub primary_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub kind: IdentityKind,
    /// Farcaster ID; only set for Farcaster identities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_notable: Option<bool>,
    pub resolved_at: DateTime<Utc>,
}

impl ResolvedIdentity {
    pub fn from_farcaster_user(user: &User, is_notable: bool, resolved_at: DateTime<Utc>) -> Self {
        Self {
            primary_name: user.username.clone(),
            display_name: user.display_name.clone(),
            avatar_url: user.pfp_url.clone(),
            kind: IdentityKind::Farcaster,
            fid: Some(user.fid),
            is_notable: Some(is_notable),
            resolved_at,
        }
    }

    /// Name to show in place of the address, preferring the display name
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.primary_name)
    }
}

/// Aggregate cache state published for display surfaces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    pub cache_size: u64,
    pub last_update: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use neynar_client::VerifiedAddresses;

    fn sample_user() -> User {
        User {
            fid: 3,
            username: "dwr".to_string(),
            display_name: Some("Dan Romero".to_string()),
            pfp_url: Some("https://example.com/dwr.png".to_string()),
            custody_address: None,
            verified_addresses: VerifiedAddresses::default(),
        }
    }

    #[test]
    fn test_from_farcaster_user() {
        let now = Utc::now();
        let identity = ResolvedIdentity::from_farcaster_user(&sample_user(), true, now);
        assert_eq!(identity.primary_name, "dwr");
        assert_eq!(identity.display_name.as_deref(), Some("Dan Romero"));
        assert_eq!(identity.avatar_url.as_deref(), Some("https://example.com/dwr.png"));
        assert_eq!(identity.kind, IdentityKind::Farcaster);
        assert_eq!(identity.fid, Some(3));
        assert_eq!(identity.is_notable, Some(true));
        assert_eq!(identity.resolved_at, now);
    }

    #[test]
    fn test_label_prefers_display_name() {
        let identity = ResolvedIdentity::from_farcaster_user(&sample_user(), false, Utc::now());
        assert_eq!(identity.label(), "Dan Romero");
    }

    #[test]
    fn test_label_falls_back_to_primary_name() {
        let mut user = sample_user();
        user.display_name = Some("  ".to_string());
        let identity = ResolvedIdentity::from_farcaster_user(&user, false, Utc::now());
        assert_eq!(identity.label(), "dwr");

        user.display_name = None;
        let identity = ResolvedIdentity::from_farcaster_user(&user, false, Utc::now());
        assert_eq!(identity.label(), "dwr");
    }

    #[test]
    fn test_identity_serialization() {
        let identity = ResolvedIdentity::from_farcaster_user(&sample_user(), false, Utc::now());
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["primaryName"], "dwr");
        assert_eq!(json["kind"], "farcaster");
        assert_eq!(json["fid"], 3);
        assert_eq!(json["isNotable"], false);
        assert!(json.get("resolvedAt").is_some());

        let back: ResolvedIdentity = serde_json::from_value(json).unwrap();
        assert_eq!(back, identity);
    }

    #[test]
    fn test_cache_metadata_default() {
        let metadata = CacheMetadata::default();
        assert_eq!(metadata.cache_size, 0);
        assert!(metadata.last_update.is_none());

        let json = serde_json::to_string(&metadata).unwrap();
        assert!(json.contains("cacheSize"));
        assert!(json.contains("lastUpdate"));
    }
}
