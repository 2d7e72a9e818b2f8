// Caller identity established by the external verification provider.
#[derive(Clone, Debug)]
pub struct VerifiedIdentity {
    pub subject_id: String,
    // Raw sign-in provider tag as reported by the verifier.
    pub provider_tag: String,
}

// Authentication providers the broker recognizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    Anonymous,
    Password,
}

impl Provider {
    // Unknown tags are rejected rather than defaulted to a role.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "anonymous" => Some(Provider::Anonymous),
            "password" => Some(Provider::Password),
            _ => None,
        }
    }
}

// Target service-account identity per provider.
#[derive(Clone, Debug)]
pub struct ServiceAccounts {
    pub anonymous: String,
    pub password: String,
}

impl ServiceAccounts {
    pub fn target_for(&self, provider: Provider) -> &str {
        match provider {
            Provider::Anonymous => &self.anonymous,
            Provider::Password => &self.password,
        }
    }
}

// Room document persisted in the rooms table. guest_id and expiry_date are
// absent until the first guest request claims the room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub room_id: String,
    pub guest_id: Option<String>,
    pub expiry_date: Option<u64>,
}

// Validity window granted to a caller, epoch seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessWindow {
    pub expires_at: u64,
}

// Cloud access token leg of the bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloudToken {
    pub token: String,
    pub expire_time: u64,
}

// Signed gateway token leg of the bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayToken {
    pub endpoint: String,
    pub token: String,
    pub expire_time: u64,
}

// Raw material returned by the signing provider before the bundle is
// assembled; expire_time is stamped by the minting use case so both legs
// always agree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedGatewayToken {
    pub endpoint: String,
    pub token: String,
}

// Both credentials returned together per request, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialBundle {
    pub cloud: CloudToken,
    pub gateway: GatewayToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_tag_is_anonymous_then_provider_is_anonymous() {
        assert_eq!(Provider::from_tag("anonymous"), Some(Provider::Anonymous));
    }

    #[test]
    fn when_tag_is_password_then_provider_is_password() {
        assert_eq!(Provider::from_tag("password"), Some(Provider::Password));
    }

    #[test]
    fn when_tag_is_unknown_then_provider_is_none() {
        assert_eq!(Provider::from_tag("google.com"), None);
        assert_eq!(Provider::from_tag(""), None);
        // Tags are matched exactly, not case-folded.
        assert_eq!(Provider::from_tag("Anonymous"), None);
    }

    #[test]
    fn when_provider_is_mapped_then_matching_account_is_returned() {
        let accounts = ServiceAccounts {
            anonymous: "guest@example.iam.gserviceaccount.com".to_string(),
            password: "admin@example.iam.gserviceaccount.com".to_string(),
        };

        assert_eq!(
            accounts.target_for(Provider::Anonymous),
            "guest@example.iam.gserviceaccount.com"
        );
        assert_eq!(
            accounts.target_for(Provider::Password),
            "admin@example.iam.gserviceaccount.com"
        );
    }
}
