use crate::domain::entities::AccessWindow;
use crate::domain::errors::BrokerError;
use crate::domain::expiry::DEFAULT_ROOM_TTL_SECONDS;
use crate::domain::ports::{Clock, RoomStore};

// Resolves whether a guest subject may access a room and for how long.
// Returns the room's expiry as-is; clamping against the session ceiling is
// the orchestrator's job so both the guest and admin paths share it.
pub struct RoomWindowUseCase<C, S> {
    pub clock: C,
    pub rooms: S,
}

impl<C, S> RoomWindowUseCase<C, S>
where
    C: Clock,
    S: RoomStore,
{
    pub async fn execute(
        &self,
        room_id: &str,
        subject_id: &str,
    ) -> Result<AccessWindow, BrokerError> {
        if room_id.trim().is_empty() {
            return Err(BrokerError::MissingRoomId);
        }

        // A guest cannot create a room from nothing; an admin pre-creates it.
        let room = self
            .rooms
            .get(room_id)
            .await
            .map_err(BrokerError::StorageFailure)?
            .ok_or(BrokerError::RoomNotFound)?;

        let now = self.clock.now_epoch_seconds();

        // First-touch bootstrap: claim the room for this subject. The claim
        // only applies while both fields are still absent, so two racing
        // first requests serialize on the row; the loser re-reads the
        // winner's claim below and fails the guest check.
        let room = if room.guest_id.is_none() && room.expiry_date.is_none() {
            let claimed = self
                .rooms
                .claim_if_unclaimed(room_id, subject_id, now + DEFAULT_ROOM_TTL_SECONDS)
                .await
                .map_err(BrokerError::StorageFailure)?;
            if !claimed {
                tracing::debug!(room_id, "room claim lost to a concurrent request");
            }

            self.rooms
                .get(room_id)
                .await
                .map_err(BrokerError::StorageFailure)?
                .ok_or(BrokerError::RoomNotFound)?
        } else {
            room
        };

        // Checks run in this exact order; the first violation is reported.
        match room.guest_id.as_deref() {
            Some(guest) if guest == subject_id => {}
            _ => return Err(BrokerError::GuestMismatch),
        }
        let expiry_date = room.expiry_date.ok_or(BrokerError::NoExpiry)?;
        if expiry_date <= now {
            return Err(BrokerError::Expired);
        }

        Ok(AccessWindow {
            expires_at: expiry_date,
        })
    }
}
