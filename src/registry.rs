use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{AppErr, AppResult};
use crate::member::{Member, MemberId, MemberTx, Role};
use crate::room::{Admission, Room, RoomId};

/// The single source of truth for room existence and membership entry.
///
/// Structural changes to the map (room insert/delete) serialize on the
/// `RwLock`; roster changes inside one room serialize on that room's own
/// lock and never block other rooms. An invariant ties the two together:
/// a room is marked closed, under the write lock, in the same critical
/// section that removes it from the map — so a closed room is never
/// reachable through a lookup.
pub struct Registry {
    rooms: RwLock<HashMap<RoomId, Arc<Room>>>,
    next_room_id: AtomicU64,
    next_member_id: AtomicU64,
    capacity: usize,
}

impl Registry {
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            next_room_id: AtomicU64::new(0),
            next_member_id: AtomicU64::new(0),
            capacity,
        }
    }

    fn alloc_member_id(&self) -> MemberId {
        self.next_member_id.fetch_add(1, Ordering::Relaxed)
    }

    /// `u64::MAX` is a sentinel: allocation fails there and the counter
    /// stays put, so ids can never wrap around and be reissued.
    fn alloc_room_id(&self) -> AppResult<RoomId> {
        let mut id = self.next_room_id.load(Ordering::Relaxed);
        loop {
            if id == u64::MAX {
                return Err(AppErr::IdsExhausted);
            }
            match self.next_room_id.compare_exchange_weak(
                id,
                id + 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(id),
                Err(actual) => id = actual,
            }
        }
    }

    /// Allocate the next room id and insert a room whose first member is
    /// the originator. Ids are strictly increasing and never reused. The
    /// room is fully built before insertion, so no lookup ever observes a
    /// half-constructed room.
    pub async fn create_room(&self, tx: MemberTx) -> AppResult<(Arc<Room>, MemberId)> {
        let room_id = self.alloc_room_id()?;
        let member_id = self.alloc_member_id();
        let room = Arc::new(Room::new(room_id, self.capacity));
        if room
            .try_admit(Member::new(member_id, Role::Originator, tx))
            .await
            != Admission::Admitted
        {
            // only reachable with a configured capacity of zero
            return Err(AppErr::RoomFull);
        }
        self.rooms.write().await.insert(room_id, room.clone());
        tracing::info!(room = room_id, member = member_id, "room created");
        Ok((room, member_id))
    }

    /// Lookup-then-admit. Retries when the room closed underneath the
    /// admission, so a join never silently lands in a room that
    /// reclamation is tearing down.
    pub async fn join_room(
        &self,
        room_id: RoomId,
        tx: MemberTx,
    ) -> AppResult<(Arc<Room>, MemberId)> {
        let member_id = self.alloc_member_id();
        loop {
            let room = self.rooms.read().await.get(&room_id).cloned();
            let Some(room) = room else {
                return Err(AppErr::NoSuchRoom);
            };
            let member = Member::new(member_id, Role::Participant, tx.clone());
            match room.try_admit(member).await {
                Admission::Admitted => return Ok((room, member_id)),
                Admission::Full => return Err(AppErr::RoomFull),
                Admission::Closed => continue,
            }
        }
    }

    /// Idempotent; safe to fire from both the disconnect path and a racing
    /// liveness eviction. The emptied room lingers until the next sweep.
    pub async fn leave(&self, room_id: RoomId, member_id: MemberId) {
        let room = self.rooms.read().await.get(&room_id).cloned();
        if let Some(room) = room {
            if room.remove(member_id).await {
                tracing::debug!(room = room_id, member = member_id, "member left");
            }
        }
    }

    /// Active room ids, sorted; pushed to every new connection.
    pub async fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<_> = self.rooms.read().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Snapshot of all rooms, for the liveness sweep.
    pub async fn rooms_snapshot(&self) -> Vec<Arc<Room>> {
        self.rooms.read().await.values().cloned().collect()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Delete `room_id` iff it is empty at this very moment. Emptiness is
    /// re-checked under the write lock plus the roster lock, so a join that
    /// slipped in mid-cycle keeps the room alive. A room already gone is a
    /// silent no-op.
    pub async fn reclaim(&self, room_id: RoomId) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get(&room_id) else {
            return false;
        };
        if room.close_if_empty().await {
            rooms.remove(&room_id);
            true
        } else {
            false
        }
    }

    /// Shutdown teardown: force-close every room and clear the map.
    pub async fn close_all(&self) {
        let mut rooms = self.rooms.write().await;
        for room in rooms.values() {
            room.close().await;
        }
        rooms.clear();
    }
}
