use std::sync::Arc;

use tokio::net::TcpListener;

use crate::registry::Registry;
use crate::session;

/// Accept loop: one spawned task per connection. A session's errors stay
/// on its own connection and are logged, never propagated to the loop.
pub async fn run(listener: TcpListener, registry: Arc<Registry>) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let registry = registry.clone();
        tokio::spawn(async move {
            if let Err(e) = session::handle(stream, peer, registry).await {
                tracing::warn!(%peer, error = %e, "session ended with error");
            }
        });
    }
}
