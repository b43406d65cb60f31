//! Live Feed Connector Implementation

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use alert_feed::FeedEvent;
use alert_model::Alert;
use futures_util::stream::{Stream, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

/// Delay between a connection loss and the next attempt. Fixed: no backoff
/// growth, no maximum attempt count.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(3000);

/// Connector error types
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The connection attempt itself failed
    #[error("Connect failed: {0}")]
    Connect(String),

    /// Error on an established connection
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Live feed connector configuration
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// WebSocket endpoint of the alert stream
    pub url: String,
    /// Reconnect delay after a close
    pub retry_delay: Duration,
}

impl FeedConfig {
    /// Config for the given endpoint with the default retry delay
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Text frames from one established connection
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<String, ConnectorError>> + Send>>;

/// Drive the live feed until the event receiver is dropped.
///
/// Connection lifecycle, per attempt: emit `Opened` on success, one `Alert`
/// per well-formed message (malformed payloads are dropped and logged, never
/// fatal), `TransportError` for transport faults (informational; error and
/// close are independent signals), and `Closed` when the stream ends. After
/// each close the task sleeps the retry delay and reconnects, so the retry
/// chain is strictly sequential: one scheduled attempt per close, never
/// overlapping, retrying indefinitely. No messages are queued or replayed
/// across reconnects.
pub async fn run(config: FeedConfig, events: mpsc::Sender<FeedEvent>) {
    run_with(config, events, ws_connect).await
}

/// Spawn the connector on the current runtime and hand back the event side.
/// Dropping the receiver stops the connector at its next send or reconnect.
pub fn spawn(config: FeedConfig) -> mpsc::Receiver<FeedEvent> {
    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(run(config, tx));
    rx
}

/// Open a WebSocket and narrow it to a text-frame stream
async fn ws_connect(url: String) -> Result<MessageStream, ConnectorError> {
    let (socket, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| ConnectorError::Connect(e.to_string()))?;

    let stream = socket.filter_map(|frame| async move {
        match frame {
            Ok(Message::Text(text)) => Some(Ok(text)),
            Ok(_) => None,
            Err(e) => Some(Err(ConnectorError::Transport(e.to_string()))),
        }
    });

    Ok(Box::pin(stream))
}

async fn run_with<C, F>(config: FeedConfig, events: mpsc::Sender<FeedEvent>, mut connect: C)
where
    C: FnMut(String) -> F,
    F: Future<Output = Result<MessageStream, ConnectorError>>,
{
    loop {
        match connect(config.url.clone()).await {
            Ok(mut stream) => {
                if events.send(FeedEvent::Opened).await.is_err() {
                    return;
                }
                while let Some(frame) = stream.next().await {
                    let event = match frame {
                        Ok(text) => match Alert::from_json(&text) {
                            Ok(alert) => FeedEvent::Alert(alert),
                            Err(err) => {
                                warn!(%err, "Dropping malformed feed message");
                                continue;
                            }
                        },
                        Err(err) => FeedEvent::TransportError(err.to_string()),
                    };
                    if events.send(event).await.is_err() {
                        return;
                    }
                }
                if events.send(FeedEvent::Closed).await.is_err() {
                    return;
                }
            }
            Err(err) => {
                if events
                    .send(FeedEvent::TransportError(err.to_string()))
                    .await
                    .is_err()
                {
                    return;
                }
                if events.send(FeedEvent::Closed).await.is_err() {
                    return;
                }
            }
        }

        debug!(delay_ms = config.retry_delay.as_millis() as u64, "Reconnect scheduled");
        tokio::time::sleep(config.retry_delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn wire_alert(id: &str) -> String {
        format!(
            r#"{{
                "alert_id": "{id}",
                "node_id": "Camera-Node-005",
                "timestamp": "2024-08-14T12:30:00Z",
                "location": {{"lat": 34.685, "lon": 33.041}},
                "confidence": 0.92
            }}"#
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_chain_is_sequential_with_fixed_delay() {
        let attempts: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
        let connect = {
            let attempts = Arc::clone(&attempts);
            move |_url: String| {
                attempts.lock().unwrap().push(Instant::now());
                async { Err(ConnectorError::Connect("connection refused".into())) }
            }
        };

        let (tx, mut rx) = mpsc::channel(16);
        let task = tokio::spawn(run_with(FeedConfig::new("ws://feed/ws"), tx, connect));

        // Three failed attempts, each reported as error + close
        for _ in 0..3 {
            assert!(matches!(
                rx.recv().await.unwrap(),
                FeedEvent::TransportError(_)
            ));
            assert!(matches!(rx.recv().await.unwrap(), FeedEvent::Closed));
        }

        drop(rx);
        task.await.unwrap();

        let attempts = attempts.lock().unwrap();
        assert!(attempts.len() >= 3);
        for pair in attempts.windows(2) {
            // Exactly one attempt per close, 3000 ms after its predecessor
            assert_eq!(pair[1] - pair[0], DEFAULT_RETRY_DELAY);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_message_is_dropped_not_fatal() {
        let mut calls = 0;
        let connect = move |_url: String| {
            calls += 1;
            let result = if calls == 1 {
                let frames = stream::iter(vec![
                    Ok("{broken".to_string()),
                    Ok(wire_alert("a1")),
                ]);
                Ok(Box::pin(frames) as MessageStream)
            } else {
                Err(ConnectorError::Connect("done".into()))
            };
            async move { result }
        };

        let (tx, mut rx) = mpsc::channel(16);
        let task = tokio::spawn(run_with(FeedConfig::new("ws://feed/ws"), tx, connect));

        assert!(matches!(rx.recv().await.unwrap(), FeedEvent::Opened));
        // The broken frame produces no event; the next alert still arrives
        match rx.recv().await.unwrap() {
            FeedEvent::Alert(alert) => assert_eq!(alert.alert_id, "a1"),
            other => panic!("expected alert, got {other:?}"),
        }
        assert!(matches!(rx.recv().await.unwrap(), FeedEvent::Closed));

        drop(rx);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_does_not_suspend_retry() {
        let mut calls = 0;
        let connect = move |_url: String| {
            calls += 1;
            let result = if calls == 1 {
                let frames = stream::iter(vec![Err(ConnectorError::Transport(
                    "reset by peer".into(),
                ))]);
                Ok(Box::pin(frames) as MessageStream)
            } else {
                // The chain reached a second attempt after the error
                let frames = stream::iter(vec![Ok(wire_alert("a2"))]);
                Ok(Box::pin(frames) as MessageStream)
            };
            async move { result }
        };

        let (tx, mut rx) = mpsc::channel(16);
        let task = tokio::spawn(run_with(FeedConfig::new("ws://feed/ws"), tx, connect));

        assert!(matches!(rx.recv().await.unwrap(), FeedEvent::Opened));
        assert!(matches!(
            rx.recv().await.unwrap(),
            FeedEvent::TransportError(_)
        ));
        assert!(matches!(rx.recv().await.unwrap(), FeedEvent::Closed));

        assert!(matches!(rx.recv().await.unwrap(), FeedEvent::Opened));
        assert!(matches!(rx.recv().await.unwrap(), FeedEvent::Alert(_)));

        drop(rx);
        task.await.unwrap();
    }
}
