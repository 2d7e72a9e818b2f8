use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entities::{Room, ServiceAccounts};
use crate::domain::ports::{Clock, CredentialMinter, IdentityVerifier, RoomStore};

// Provider handles are constructed once at startup and injected as trait
// objects so tests can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn IdentityVerifier>,
    pub rooms: Arc<dyn RoomStore>,
    pub minter: Arc<dyn CredentialMinter>,
    pub clock: Arc<dyn Clock>,
    pub accounts: ServiceAccounts,
}

// PostgreSQL-backed room store.
#[derive(Clone)]
pub struct PostgresRoomStore {
    pub db: PgPool,
}

#[derive(sqlx::FromRow)]
struct RoomRow {
    room_id: String,
    guest_id: Option<String>,
    expiry_date: Option<i64>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            room_id: row.room_id,
            guest_id: row.guest_id,
            expiry_date: row.expiry_date.map(|value| value as u64),
        }
    }
}

#[async_trait]
impl RoomStore for PostgresRoomStore {
    async fn get(&self, room_id: &str) -> Result<Option<Room>, String> {
        let row = sqlx::query_as::<_, RoomRow>(
            "SELECT room_id, guest_id, expiry_date FROM rooms WHERE room_id = $1",
        )
        .bind(room_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|err| err.to_string())?;

        Ok(row.map(Room::from))
    }

    // The WHERE clause makes the first-touch claim atomic: concurrent
    // claims serialize on the row and at most one applies.
    async fn claim_if_unclaimed(
        &self,
        room_id: &str,
        guest_id: &str,
        expiry_date: u64,
    ) -> Result<bool, String> {
        let result = sqlx::query(
            r#"
            UPDATE rooms
            SET guest_id = $2, expiry_date = $3
            WHERE room_id = $1 AND guest_id IS NULL AND expiry_date IS NULL
            "#,
        )
        .bind(room_id)
        .bind(guest_id)
        .bind(expiry_date as i64)
        .execute(&self.db)
        .await
        .map_err(|err| err.to_string())?;

        Ok(result.rows_affected() == 1)
    }
}

// System clock adapter used outside of tests.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
