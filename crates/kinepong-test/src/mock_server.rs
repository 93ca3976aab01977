//! Mock pose server
//!
//! Local WebSocket server that broadcasts scripted frames to every connected
//! client and can drop all clients on demand.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::SinkExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

#[derive(Clone, Debug)]
enum Command {
    Text(String),
    Binary(Vec<u8>),
    DropClients,
}

/// Local pose server for end-to-end tests
pub struct MockPoseServer {
    addr: SocketAddr,
    commands: broadcast::Sender<Command>,
    accepted: Arc<AtomicUsize>,
    connected: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl MockPoseServer {
    /// Bind an ephemeral localhost port and start accepting
    pub async fn start() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (commands, _) = broadcast::channel(256);
        let accepted = Arc::new(AtomicUsize::new(0));
        let connected = Arc::new(AtomicUsize::new(0));

        let task = tokio::spawn(accept_loop(
            listener,
            commands.clone(),
            accepted.clone(),
            connected.clone(),
        ));

        Ok(MockPoseServer {
            addr,
            commands,
            accepted,
            connected,
            task,
        })
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Handshakes completed since start
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Clients currently connected
    pub fn connected(&self) -> usize {
        self.connected.load(Ordering::SeqCst)
    }

    /// Send a text frame to every connected client
    pub fn send(&self, text: impl Into<String>) {
        let _ = self.commands.send(Command::Text(text.into()));
    }

    pub fn send_binary(&self, bytes: Vec<u8>) {
        let _ = self.commands.send(Command::Binary(bytes));
    }

    /// Close every current connection. The server keeps accepting.
    pub fn drop_clients(&self) {
        let _ = self.commands.send(Command::DropClients);
    }

    /// Wait until at least `n` handshakes have completed
    pub async fn wait_for_accepted(&self, n: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.accepted() < n {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        true
    }
}

impl Drop for MockPoseServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn accept_loop(
    listener: TcpListener,
    commands: broadcast::Sender<Command>,
    accepted: Arc<AtomicUsize>,
    connected: Arc<AtomicUsize>,
) {
    while let Ok((tcp, peer)) = listener.accept().await {
        // Subscribe before the handshake so no frame sent after Open is missed
        let rx = commands.subscribe();
        tokio::spawn(serve_client(tcp, peer, rx, accepted.clone(), connected.clone()));
    }
}

async fn serve_client(
    tcp: TcpStream,
    peer: SocketAddr,
    mut commands: broadcast::Receiver<Command>,
    accepted: Arc<AtomicUsize>,
    connected: Arc<AtomicUsize>,
) {
    let Ok(mut ws) = tokio_tungstenite::accept_async(tcp).await else {
        return;
    };
    accepted.fetch_add(1, Ordering::SeqCst);
    connected.fetch_add(1, Ordering::SeqCst);
    debug!(%peer, "mock client connected");

    loop {
        let sent = match commands.recv().await {
            Ok(Command::Text(text)) => ws.send(Message::Text(text)).await,
            Ok(Command::Binary(bytes)) => ws.send(Message::Binary(bytes)).await,
            Ok(Command::DropClients) => {
                let _ = ws.close(None).await;
                break;
            }
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        };
        if sent.is_err() {
            break;
        }
    }

    connected.fetch_sub(1, Ordering::SeqCst);
    debug!(%peer, "mock client gone");
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_broadcast_reaches_client() {
        let server = MockPoseServer::start().await.unwrap();
        let (mut ws, _) = tokio_tungstenite::connect_async(server.url()).await.unwrap();
        assert!(server.wait_for_accepted(1, Duration::from_secs(2)).await);

        server.send("{\"players\": []}");
        let msg = ws.next().await.unwrap().unwrap();
        assert_eq!(msg, Message::Text("{\"players\": []}".into()));

        server.drop_clients();
        let msg = ws.next().await.unwrap().unwrap();
        assert!(matches!(msg, Message::Close(_)));
    }
}
