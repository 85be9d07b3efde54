use std::time::Instant;

use tokio::sync::mpsc;

pub type MemberId = u64;

/// Outbound queue depth per connection. A member whose queue backs up is
/// treated the same as one whose socket is gone.
pub const OUTBOUND_BUF: usize = 64;

pub type MemberTx = mpsc::Sender<Frame>;

/// Frames a member's connection task drains to the socket. Heartbeats are
/// keepalive probes, not application payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Data(String),
    Heartbeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Participant,
    /// The member whose `create` request opened the room.
    Originator,
}

/// One participant inside a room: its outbound channel, role, and the
/// instant it last sent traffic.
#[derive(Debug, Clone)]
pub struct Member {
    id: MemberId,
    role: Role,
    tx: MemberTx,
    last_seen: Instant,
}

impl Member {
    pub fn new(id: MemberId, role: Role, tx: MemberTx) -> Self {
        Self {
            id,
            role,
            tx,
            last_seen: Instant::now(),
        }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    pub(crate) fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Non-blocking send. `Err` means the connection task is gone or its
    /// queue is full; callers feed that into the eviction path.
    pub fn send(&self, frame: Frame) -> Result<(), mpsc::error::TrySendError<Frame>> {
        self.tx.try_send(frame)
    }
}
