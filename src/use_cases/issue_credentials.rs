use crate::domain::entities::{AccessWindow, CredentialBundle, Provider, ServiceAccounts};
use crate::domain::errors::BrokerError;
use crate::domain::expiry;
use crate::domain::ports::{Clock, CredentialMinter, IdentityVerifier, RoomStore};
use crate::use_cases::mint_bundle::MintBundleUseCase;
use crate::use_cases::resolve_room_window::RoomWindowUseCase;

// Per-request orchestration: verify identity, branch by provider, resolve a
// window, clamp it, mint the bundle. Every stage short-circuits on failure.
pub struct IssueCredentialsUseCase<V, C, S, M> {
    pub verifier: V,
    pub clock: C,
    pub rooms: S,
    pub minter: M,
    pub accounts: ServiceAccounts,
}

impl<V, C, S, M> IssueCredentialsUseCase<V, C, S, M>
where
    V: IdentityVerifier,
    C: Clock,
    S: RoomStore,
    M: CredentialMinter,
{
    pub async fn execute(
        &self,
        assertion: Option<&str>,
        room_id: Option<&str>,
    ) -> Result<CredentialBundle, BrokerError> {
        // No external call is made for a missing assertion.
        let assertion = match assertion {
            Some(value) if !value.is_empty() => value,
            _ => return Err(BrokerError::MissingCredential),
        };

        let identity = self
            .verifier
            .verify(assertion)
            .await
            .map_err(BrokerError::InvalidCredential)?;

        let provider = Provider::from_tag(&identity.provider_tag)
            .ok_or_else(|| BrokerError::UnknownProvider(identity.provider_tag.clone()))?;
        let target_account = self.accounts.target_for(provider).to_string();

        tracing::info!(
            subject_id = %identity.subject_id,
            provider = ?provider,
            "caller verified"
        );

        let now = self.clock.now_epoch_seconds();
        let window = match provider {
            Provider::Anonymous => {
                let room_id = match room_id {
                    Some(id) if !id.trim().is_empty() => id,
                    _ => return Err(BrokerError::MissingRoomId),
                };
                let resolver = RoomWindowUseCase {
                    clock: &self.clock,
                    rooms: &self.rooms,
                };
                resolver.execute(room_id, &identity.subject_id).await?
            }
            // Admin windows are fixed; no room lookup is performed.
            Provider::Password => AccessWindow {
                expires_at: expiry::session_ceiling(now),
            },
        };

        let expires_at = expiry::clamp(window.expires_at, expiry::session_ceiling(now));
        tracing::info!(expires_at, "caller authorized");

        let mint = MintBundleUseCase {
            clock: &self.clock,
            minter: &self.minter,
        };
        mint.execute(AccessWindow { expires_at }, &target_account).await
    }
}
