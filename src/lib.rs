//! Room-based session server: clients create or join rooms over a
//! line-oriented TCP protocol and the server relays payloads among the
//! members of a room, evicting dead connections via periodic probing.

pub mod config;
pub mod error;
pub mod heartbeat;
pub mod member;
pub mod registry;
pub mod room;
pub mod server;
pub mod session;

pub use config::Config;
pub use error::{AppErr, AppResult};
pub use member::{Frame, Member, MemberId, Role};
pub use registry::Registry;
pub use room::{Admission, Room, RoomId};
