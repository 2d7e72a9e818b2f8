use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::entities::{Room, SignedGatewayToken, VerifiedIdentity};
use crate::domain::ports::{Clock, CredentialMinter, IdentityVerifier, RoomStore};

pub(crate) type RoomTable = Arc<Mutex<HashMap<String, Room>>>;

// Shared fixed time source for deterministic use-case tests.
#[derive(Clone, Copy)]
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct StoreFailureFlags {
    pub get: bool,
    pub claim: bool,
}

// In-memory room store that mirrors the conditional-claim semantics of the
// real store and records every mutation attempt for assertions.
#[derive(Clone)]
pub(crate) struct RecordingRoomStore {
    rooms: RoomTable,
    claims: Arc<Mutex<Vec<(String, String, u64)>>>,
    gets: Arc<Mutex<u32>>,
    failures: StoreFailureFlags,
}

impl RecordingRoomStore {
    pub(crate) fn new() -> Self {
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            claims: Arc::new(Mutex::new(Vec::new())),
            gets: Arc::new(Mutex::new(0)),
            failures: StoreFailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: StoreFailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn insert_test_room(&self, room: Room) {
        let mut guard = self.rooms.lock().expect("rooms mutex poisoned");
        guard.insert(room.room_id.clone(), room);
    }

    pub(crate) fn get_test_room(&self, room_id: &str) -> Option<Room> {
        let guard = self.rooms.lock().expect("rooms mutex poisoned");
        guard.get(room_id).cloned()
    }

    pub(crate) fn claim_calls(&self) -> Vec<(String, String, u64)> {
        self.claims.lock().expect("claims mutex poisoned").clone()
    }

    pub(crate) fn get_call_count(&self) -> u32 {
        *self.gets.lock().expect("gets mutex poisoned")
    }
}

#[async_trait]
impl RoomStore for RecordingRoomStore {
    async fn get(&self, room_id: &str) -> Result<Option<Room>, String> {
        if self.failures.get {
            return Err("get failed".to_string());
        }

        *self.gets.lock().expect("gets mutex poisoned") += 1;
        let guard = self.rooms.lock().expect("rooms mutex poisoned");
        Ok(guard.get(room_id).cloned())
    }

    async fn claim_if_unclaimed(
        &self,
        room_id: &str,
        guest_id: &str,
        expiry_date: u64,
    ) -> Result<bool, String> {
        if self.failures.claim {
            return Err("claim failed".to_string());
        }

        self.claims
            .lock()
            .expect("claims mutex poisoned")
            .push((room_id.to_string(), guest_id.to_string(), expiry_date));

        let mut guard = self.rooms.lock().expect("rooms mutex poisoned");
        match guard.get_mut(room_id) {
            Some(room) if room.guest_id.is_none() && room.expiry_date.is_none() => {
                room.guest_id = Some(guest_id.to_string());
                room.expiry_date = Some(expiry_date);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }
}

// Scripted identity verifier: returns a fixed identity or rejects, and
// records every assertion it was asked to verify.
#[derive(Clone)]
pub(crate) struct StaticVerifier {
    identity: Option<VerifiedIdentity>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl StaticVerifier {
    pub(crate) fn verified(subject_id: &str, provider_tag: &str) -> Self {
        Self {
            identity: Some(VerifiedIdentity {
                subject_id: subject_id.to_string(),
                provider_tag: provider_tag.to_string(),
            }),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn rejecting() -> Self {
        Self {
            identity: None,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn seen_assertions(&self) -> Vec<String> {
        self.seen.lock().expect("seen mutex poisoned").clone()
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, assertion: &str) -> Result<VerifiedIdentity, String> {
        self.seen
            .lock()
            .expect("seen mutex poisoned")
            .push(assertion.to_string());

        self.identity
            .clone()
            .ok_or_else(|| "token rejected by provider".to_string())
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct MintFailureFlags {
    pub access: bool,
    pub sign: bool,
}

// Minter fake recording both legs so tests can assert fan-out behavior.
#[derive(Clone)]
pub(crate) struct RecordingMinter {
    access_calls: Arc<Mutex<Vec<(String, u64)>>>,
    sign_calls: Arc<Mutex<Vec<(String, u64, u64)>>>,
    failures: MintFailureFlags,
}

impl RecordingMinter {
    pub(crate) fn new() -> Self {
        Self {
            access_calls: Arc::new(Mutex::new(Vec::new())),
            sign_calls: Arc::new(Mutex::new(Vec::new())),
            failures: MintFailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: MintFailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn access_calls(&self) -> Vec<(String, u64)> {
        self.access_calls
            .lock()
            .expect("access calls mutex poisoned")
            .clone()
    }

    pub(crate) fn sign_calls(&self) -> Vec<(String, u64, u64)> {
        self.sign_calls
            .lock()
            .expect("sign calls mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl CredentialMinter for RecordingMinter {
    async fn mint_access_token(
        &self,
        target_account: &str,
        lifetime_seconds: u64,
    ) -> Result<String, String> {
        self.access_calls
            .lock()
            .expect("access calls mutex poisoned")
            .push((target_account.to_string(), lifetime_seconds));

        if self.failures.access {
            return Err("access token request failed".to_string());
        }
        Ok(format!("access-token-for-{target_account}"))
    }

    async fn sign_gateway_token(
        &self,
        target_account: &str,
        issued_at: u64,
        expires_at: u64,
    ) -> Result<SignedGatewayToken, String> {
        self.sign_calls
            .lock()
            .expect("sign calls mutex poisoned")
            .push((target_account.to_string(), issued_at, expires_at));

        if self.failures.sign {
            return Err("sign request failed".to_string());
        }
        Ok(SignedGatewayToken {
            endpoint: "https://gateway.test.example".to_string(),
            token: format!("signed-jwt-for-{target_account}"),
        })
    }
}
