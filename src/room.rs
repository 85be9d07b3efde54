use tokio::sync::Mutex;

use crate::member::{Frame, Member, MemberId};

pub type RoomId = u64;

/// Outcome of an admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// Roster is at capacity.
    Full,
    /// The registry reclaimed this room; the caller must re-resolve the id.
    Closed,
}

#[derive(Default)]
struct Roster {
    members: Vec<Member>,
    closed: bool,
}

/// A bounded group of members sharing broadcast scope. The roster lock
/// serializes admits, removals and snapshots on this room only; other
/// rooms are never blocked.
pub struct Room {
    id: RoomId,
    capacity: usize,
    roster: Mutex<Roster>,
}

impl Room {
    pub fn new(id: RoomId, capacity: usize) -> Self {
        Self {
            id,
            capacity,
            roster: Mutex::new(Roster::default()),
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Atomic test-and-insert under the roster lock.
    pub async fn try_admit(&self, member: Member) -> Admission {
        let mut roster = self.roster.lock().await;
        if roster.closed {
            return Admission::Closed;
        }
        if roster.members.len() >= self.capacity {
            return Admission::Full;
        }
        roster.members.push(member);
        Admission::Admitted
    }

    /// Idempotent: removing a non-member is a no-op, not an error.
    pub async fn remove(&self, id: MemberId) -> bool {
        let mut roster = self.roster.lock().await;
        let before = roster.members.len();
        roster.members.retain(|m| m.id() != id);
        roster.members.len() != before
    }

    /// Refresh a member's liveness timestamp.
    pub async fn touch(&self, id: MemberId) {
        let mut roster = self.roster.lock().await;
        if let Some(m) = roster.members.iter_mut().find(|m| m.id() == id) {
            m.touch();
        }
    }

    /// Deliver `payload` to a point-in-time snapshot of the roster,
    /// skipping `from` when given. Returns the ids whose send failed; those
    /// feed the liveness path and never abort delivery to the rest.
    pub async fn broadcast(&self, payload: &str, from: Option<MemberId>) -> Vec<MemberId> {
        let snapshot = self.members().await;
        let mut failed = Vec::new();
        for member in &snapshot {
            if Some(member.id()) == from {
                continue;
            }
            if member.send(Frame::Data(payload.to_owned())).is_err() {
                failed.push(member.id());
            }
        }
        failed
    }

    /// Cloned snapshot of the roster, in admission order.
    pub async fn members(&self) -> Vec<Member> {
        self.roster.lock().await.members.clone()
    }

    pub async fn len(&self) -> usize {
        self.roster.lock().await.members.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.roster.lock().await.members.is_empty()
    }

    /// Force-close: mark closed and drain the roster. Dropping the drained
    /// members drops their senders, which unblocks their connection tasks.
    pub(crate) async fn close(&self) -> Vec<Member> {
        let mut roster = self.roster.lock().await;
        roster.closed = true;
        std::mem::take(&mut roster.members)
    }

    /// Reclamation check: closes only if the roster is empty at this very
    /// instant, so a join that slipped in keeps the room alive.
    pub(crate) async fn close_if_empty(&self) -> bool {
        let mut roster = self.roster.lock().await;
        if roster.members.is_empty() {
            roster.closed = true;
            true
        } else {
            false
        }
    }
}
