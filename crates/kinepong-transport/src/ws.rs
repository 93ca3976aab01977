//! WebSocket connector
//!
//! Each attempt runs as a tokio task that performs the handshake and then
//! forwards inbound frames as [`TransportEvent`]s. Nothing is written to the
//! socket beyond the handshake and protocol-level control replies.

use futures_util::StreamExt;
use tokio::runtime::Handle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::warn;

use crate::{
    event_channel, ConnectionHandle, Connector, EventSender, TransportError, TransportEvent,
    TransportResult,
};

/// Default pose server endpoint
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8080";

/// Check that an endpoint is a plaintext WebSocket URL with a host
pub fn validate_endpoint(url: &str) -> TransportResult<()> {
    let rest = url
        .strip_prefix("ws://")
        .ok_or_else(|| TransportError::InvalidUrl {
            url: url.to_string(),
            reason: "scheme must be ws://".into(),
        })?;

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() {
        return Err(TransportError::InvalidUrl {
            url: url.to_string(),
            reason: "missing host".into(),
        });
    }
    Ok(())
}

/// Connector backed by tokio-tungstenite
pub struct WsConnector {
    runtime: Handle,
}

impl WsConnector {
    /// Spawn socket tasks on the given runtime
    pub fn new(runtime: Handle) -> Self {
        WsConnector { runtime }
    }

    /// Spawn socket tasks on the runtime of the calling context.
    ///
    /// Panics outside a tokio runtime, like `Handle::current`.
    pub fn current() -> Self {
        WsConnector {
            runtime: Handle::current(),
        }
    }
}

impl Connector for WsConnector {
    fn connect(&mut self, url: &str) -> TransportResult<ConnectionHandle> {
        validate_endpoint(url)?;
        let (tx, rx) = event_channel();
        let task = self.runtime.spawn(run_socket(url.to_string(), tx));
        Ok(ConnectionHandle::new(rx, task))
    }
}

async fn run_socket(url: String, events: EventSender) {
    let mut stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            let _ = events.send(TransportEvent::Closed {
                reason: Some(TransportError::Connect(e.to_string()).to_string()),
            });
            return;
        }
    };

    if events.send(TransportEvent::Opened).is_err() {
        return; // Client dropped
    }

    let mut reason = None;
    while let Some(message) = stream.next().await {
        let event = match message {
            Ok(Message::Text(text)) => TransportEvent::Message(text),
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => TransportEvent::Message(text),
                Err(_) => {
                    warn!(url = %url, "dropping non-UTF-8 binary frame");
                    continue;
                }
            },
            Ok(Message::Close(frame)) => {
                reason = frame.map(|f| format!("{} {}", u16::from(f.code), f.reason));
                TransportEvent::Closing
            }
            Ok(_) => continue,
            Err(e) => {
                reason = Some(TransportError::Socket(e.to_string()).to_string());
                break;
            }
        };

        if events.send(event).is_err() {
            return;
        }
    }

    let _ = events.send(TransportEvent::Closed { reason });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConnectionState, ReconnectPolicy, TransportClient};
    use futures_util::SinkExt;
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[test]
    fn test_validate_endpoint() {
        assert!(validate_endpoint("ws://localhost:8080").is_ok());
        assert!(validate_endpoint("ws://pose.example/stream?fps=30").is_ok());
        assert!(validate_endpoint("wss://pose.example/stream").is_err());
        assert!(validate_endpoint("http://localhost:8080").is_err());
        assert!(validate_endpoint("ws://").is_err());
        assert!(validate_endpoint("localhost:8080").is_err());
    }

    async fn poll_until<F>(client: &mut TransportClient, received: &mut Vec<String>, mut done: F)
    where
        F: FnMut(&TransportClient, &[String]) -> bool,
    {
        for _ in 0..500 {
            received.extend(client.poll());
            if done(client, received) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached, state {}", client.state());
    }

    #[tokio::test]
    async fn test_ws_receives_text_frames() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(Message::Text("{\"players\": []}".into())).await.unwrap();
            ws.send(Message::Binary(b"{\"players\": [{}]}".to_vec())).await.unwrap();
            ws.send(Message::Binary(vec![0xff, 0xfe])).await.unwrap();
            ws.close(None).await.unwrap();
        });

        let mut client = TransportClient::new(
            format!("ws://{}", addr),
            Box::new(WsConnector::current()),
            ReconnectPolicy::default(),
        );
        client.connect();

        let mut received = Vec::new();
        poll_until(&mut client, &mut received, |_, got| got.len() >= 2).await;
        assert_eq!(received[0], "{\"players\": []}");
        assert_eq!(received[1], "{\"players\": [{}]}");
        assert_eq!(client.stats().opens, 1);

        poll_until(&mut client, &mut received, |c, _| {
            c.stats().closes >= 1
        })
        .await;
        assert_eq!(received.len(), 2);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_ws_connect_refused_reports_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut client = TransportClient::new(
            format!("ws://{}", addr),
            Box::new(WsConnector::current()),
            ReconnectPolicy::default(),
        );
        client.connect();

        let mut received = Vec::new();
        poll_until(&mut client, &mut received, |c, _| c.stats().closes >= 1).await;
        assert!(client.last_close_reason().is_some());
        assert_ne!(client.state(), ConnectionState::Open);
    }
}
