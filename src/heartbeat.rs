//! Liveness monitor: probe every member, evict the unresponsive, reclaim
//! rooms left empty. Runs as its own recurring task, fully decoupled from
//! connection acceptance.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::member::Frame;
use crate::registry::Registry;

pub async fn task(registry: Arc<Registry>, period: Duration) {
    let mut tick = time::interval(period);
    tick.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    loop {
        tick.tick().await;
        sweep(&registry).await;
    }
}

/// One probe → evict → reclaim cycle over every room.
pub async fn sweep(registry: &Registry) {
    for room in registry.rooms_snapshot().await {
        let mut dead = Vec::new();
        for member in room.members().await {
            // a probe failure for one member never skips the others
            if member.send(Frame::Heartbeat).is_err() {
                dead.push((member.id(), member.last_seen()));
            }
        }
        for (id, last_seen) in dead {
            if room.remove(id).await {
                tracing::info!(
                    room = room.id(),
                    member = id,
                    idle_secs = last_seen.elapsed().as_secs(),
                    "evicted unresponsive member"
                );
            }
        }
        if room.is_empty().await && registry.reclaim(room.id()).await {
            tracing::info!(room = room.id(), "reclaimed empty room");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::MemberTx;
    use tokio::sync::mpsc;

    fn tx() -> (MemberTx, mpsc::Receiver<Frame>) {
        mpsc::channel(8)
    }

    #[tokio::test]
    async fn sweep_probes_live_members_and_keeps_them() {
        let reg = Registry::new(16);
        let (t, mut rx) = tx();
        let (room, _) = reg.create_room(t).await.unwrap();

        sweep(&reg).await;

        assert_eq!(rx.try_recv().unwrap(), Frame::Heartbeat);
        assert_eq!(room.len().await, 1);
        assert_eq!(reg.room_count().await, 1);
    }

    #[tokio::test]
    async fn sweep_evicts_members_whose_connection_is_gone() {
        let reg = Registry::new(16);
        let (t0, _rx0) = tx();
        let (room, _) = reg.create_room(t0).await.unwrap();
        let (t1, rx1) = tx();
        let (_, dead_id) = reg.join_room(room.id(), t1).await.unwrap();
        drop(rx1); // its connection task has exited

        sweep(&reg).await;

        let members = room.members().await;
        assert_eq!(members.len(), 1);
        assert!(members.iter().all(|m| m.id() != dead_id));
        assert_eq!(reg.room_count().await, 1, "occupied room must survive");
    }

    #[tokio::test]
    async fn sweep_reclaims_rooms_emptied_by_eviction() {
        let reg = Registry::new(16);
        let (t, rx) = tx();
        let (room, _) = reg.create_room(t).await.unwrap();
        drop(rx);

        sweep(&reg).await;

        assert_eq!(reg.room_count().await, 0);
        let (t, _rx) = tx();
        assert!(reg.join_room(room.id(), t).await.is_err());
    }

    #[tokio::test]
    async fn sweep_reclaims_rooms_left_empty_by_leave() {
        let reg = Registry::new(16);
        let (t, _rx) = tx();
        let (room, member_id) = reg.create_room(t).await.unwrap();
        reg.leave(room.id(), member_id).await;

        assert_eq!(reg.room_count().await, 1);
        sweep(&reg).await;
        assert_eq!(reg.room_count().await, 0);
    }

    #[tokio::test]
    async fn failed_broadcast_recipient_is_evicted_within_one_sweep() {
        let reg = Registry::new(16);
        let (t0, mut rx0) = tx();
        let (room, sender_id) = reg.create_room(t0).await.unwrap();
        let (t1, mut rx1) = tx();
        reg.join_room(room.id(), t1).await.unwrap();
        let (t2, rx2) = tx();
        let (_, dead_id) = reg.join_room(room.id(), t2).await.unwrap();
        drop(rx2);

        let failed = room.broadcast("tune up", Some(sender_id)).await;
        assert_eq!(failed, vec![dead_id]);
        assert_eq!(rx1.try_recv().unwrap(), Frame::Data("tune up".into()));
        assert!(rx0.try_recv().is_err());

        sweep(&reg).await;
        assert_eq!(room.len().await, 2);
        assert!(room.members().await.iter().all(|m| m.id() != dead_id));
    }
}
