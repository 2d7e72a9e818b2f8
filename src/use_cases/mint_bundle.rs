use crate::domain::entities::{AccessWindow, CloudToken, CredentialBundle, GatewayToken};
use crate::domain::errors::BrokerError;
use crate::domain::ports::{Clock, CredentialMinter};

// Exchanges an authorized window for the two downstream credentials. The two
// provider calls run concurrently; neither is cancelled if the other fails,
// and no partial bundle ever escapes.
pub struct MintBundleUseCase<C, M> {
    pub clock: C,
    pub minter: M,
}

impl<C, M> MintBundleUseCase<C, M>
where
    C: Clock,
    M: CredentialMinter,
{
    pub async fn execute(
        &self,
        window: AccessWindow,
        target_account: &str,
    ) -> Result<CredentialBundle, BrokerError> {
        let now = self.clock.now_epoch_seconds();

        // Upstream validation guarantees a future window; a zero lifetime
        // here means the window elapsed between validation and minting.
        let lifetime_seconds = window.expires_at.saturating_sub(now);
        if lifetime_seconds == 0 {
            return Err(BrokerError::MintingFailure(
                "validity window already elapsed".to_string(),
            ));
        }

        let (access, signed) = tokio::join!(
            self.minter.mint_access_token(target_account, lifetime_seconds),
            self.minter
                .sign_gateway_token(target_account, now, window.expires_at),
        );

        let access_token = access.map_err(BrokerError::MintingFailure)?;
        let signed = signed.map_err(BrokerError::MintingFailure)?;

        // Both legs share the window's expiry, so they can never disagree.
        Ok(CredentialBundle {
            cloud: CloudToken {
                token: access_token,
                expire_time: window.expires_at,
            },
            gateway: GatewayToken {
                endpoint: signed.endpoint,
                token: signed.token,
                expire_time: window.expires_at,
            },
        })
    }
}
