use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::{Room, SignedGatewayToken, VerifiedIdentity};

// Port for the external identity-verification provider. The Err string
// carries the provider's rejection detail for logging; it is never shown to
// the caller.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, assertion: &str) -> Result<VerifiedIdentity, String>;
}

// Port for room persistence used by the guest window resolver.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn get(&self, room_id: &str) -> Result<Option<Room>, String>;

    // Writes guest_id/expiry_date only while both fields are still absent,
    // as one atomic operation. Returns whether the claim applied.
    async fn claim_if_unclaimed(
        &self,
        room_id: &str,
        guest_id: &str,
        expiry_date: u64,
    ) -> Result<bool, String>;
}

// Port for the downstream credential-minting provider. One method per
// provider call so the two legs can run concurrently and be faked apart.
#[async_trait]
pub trait CredentialMinter: Send + Sync {
    async fn mint_access_token(
        &self,
        target_account: &str,
        lifetime_seconds: u64,
    ) -> Result<String, String>;

    async fn sign_gateway_token(
        &self,
        target_account: &str,
        issued_at: u64,
        expires_at: u64,
    ) -> Result<SignedGatewayToken, String>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}

// Ports stay usable through shared references and Arc handles so the
// orchestrator can hand its injected dependencies to sub use cases.

impl<T: Clock + ?Sized> Clock for &T {
    fn now_epoch_seconds(&self) -> u64 {
        (**self).now_epoch_seconds()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now_epoch_seconds(&self) -> u64 {
        (**self).now_epoch_seconds()
    }
}

#[async_trait]
impl<T: IdentityVerifier + ?Sized> IdentityVerifier for Arc<T> {
    async fn verify(&self, assertion: &str) -> Result<VerifiedIdentity, String> {
        (**self).verify(assertion).await
    }
}

#[async_trait]
impl<T: RoomStore + ?Sized> RoomStore for &T {
    async fn get(&self, room_id: &str) -> Result<Option<Room>, String> {
        (**self).get(room_id).await
    }

    async fn claim_if_unclaimed(
        &self,
        room_id: &str,
        guest_id: &str,
        expiry_date: u64,
    ) -> Result<bool, String> {
        (**self).claim_if_unclaimed(room_id, guest_id, expiry_date).await
    }
}

#[async_trait]
impl<T: RoomStore + ?Sized> RoomStore for Arc<T> {
    async fn get(&self, room_id: &str) -> Result<Option<Room>, String> {
        (**self).get(room_id).await
    }

    async fn claim_if_unclaimed(
        &self,
        room_id: &str,
        guest_id: &str,
        expiry_date: u64,
    ) -> Result<bool, String> {
        (**self).claim_if_unclaimed(room_id, guest_id, expiry_date).await
    }
}

#[async_trait]
impl<T: CredentialMinter + ?Sized> CredentialMinter for &T {
    async fn mint_access_token(
        &self,
        target_account: &str,
        lifetime_seconds: u64,
    ) -> Result<String, String> {
        (**self).mint_access_token(target_account, lifetime_seconds).await
    }

    async fn sign_gateway_token(
        &self,
        target_account: &str,
        issued_at: u64,
        expires_at: u64,
    ) -> Result<SignedGatewayToken, String> {
        (**self)
            .sign_gateway_token(target_account, issued_at, expires_at)
            .await
    }
}

#[async_trait]
impl<T: CredentialMinter + ?Sized> CredentialMinter for Arc<T> {
    async fn mint_access_token(
        &self,
        target_account: &str,
        lifetime_seconds: u64,
    ) -> Result<String, String> {
        (**self).mint_access_token(target_account, lifetime_seconds).await
    }

    async fn sign_gateway_token(
        &self,
        target_account: &str,
        issued_at: u64,
        expires_at: u64,
    ) -> Result<SignedGatewayToken, String> {
        (**self)
            .sign_gateway_token(target_account, issued_at, expires_at)
            .await
    }
}
