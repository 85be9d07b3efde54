//! Per-connection protocol driver: room-list push, one control request,
//! then a bidirectional relay between the socket and the room.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LinesCodec};

use crate::error::{AppErr, AppResult};
use crate::member::{Frame, MemberId, OUTBOUND_BUF};
use crate::registry::Registry;
use crate::room::{Room, RoomId};

type Sink = SplitSink<Framed<TcpStream, LinesCodec>, String>;
type Lines = SplitStream<Framed<TcpStream, LinesCodec>>;

enum Request {
    Create,
    Join(RoomId),
}

fn parse_request(line: &str) -> AppResult<Request> {
    let line = line.trim();
    if line == "create" {
        return Ok(Request::Create);
    }
    if let Some(rest) = line.strip_prefix("join ") {
        if let Ok(id) = rest.trim().parse() {
            return Ok(Request::Join(id));
        }
    }
    Err(AppErr::MalformedRequest)
}

/// Drive one connection from accept to disconnect.
pub async fn handle(stream: TcpStream, peer: SocketAddr, registry: Arc<Registry>) -> AppResult<()> {
    let framed = Framed::new(stream, LinesCodec::new());
    let (mut sink, mut lines) = framed.split();

    // active room list first, one id per line
    for id in registry.room_ids().await {
        sink.send(id.to_string()).await?;
    }

    let Some(first) = lines.next().await else {
        return Ok(()); // hung up before asking anything
    };

    let (tx, rx) = mpsc::channel(OUTBOUND_BUF);
    let admitted = match parse_request(&first?) {
        Ok(Request::Create) => registry.create_room(tx).await,
        Ok(Request::Join(id)) => registry.join_room(id, tx).await,
        Err(e) => Err(e),
    };
    let (room, member_id) = match admitted {
        Ok(ok) => ok,
        Err(e) => {
            tracing::debug!(%peer, error = %e, "admission refused");
            sink.send(e.wire_reply().to_owned()).await?;
            return Ok(());
        }
    };
    sink.send(room.id().to_string()).await?;
    tracing::info!(%peer, room = room.id(), member = member_id, "admitted");

    let result = relay(&mut sink, &mut lines, rx, &room, member_id).await;

    // one leave per connection, on every exit path; a racing liveness
    // eviction has already made this a no-op
    registry.leave(room.id(), member_id).await;
    tracing::info!(%peer, room = room.id(), member = member_id, "disconnected");
    result
}

async fn relay(
    sink: &mut Sink,
    lines: &mut Lines,
    mut rx: mpsc::Receiver<Frame>,
    room: &Room,
    member_id: MemberId,
) -> AppResult<()> {
    loop {
        tokio::select! {
            frame = rx.recv() => match frame {
                Some(Frame::Data(payload)) => sink.send(payload).await?,
                Some(Frame::Heartbeat) => sink.send("heartbeat".to_owned()).await?,
                None => break, // evicted, or the room closed underneath us
            },
            line = lines.next() => match line {
                Some(Ok(payload)) => {
                    room.touch(member_id).await;
                    let failed = room.broadcast(&payload, Some(member_id)).await;
                    if !failed.is_empty() {
                        tracing::debug!(room = room.id(), ?failed, "broadcast send failures");
                    }
                }
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
        }
    }
    Ok(())
}
