//! End-to-end test against a real in-process WebSocket server.
//!
//! Everything between the facade and the socket is exercised unmocked: the
//! handshake URL (path and token query parameter), the outbound user frame,
//! and the chunk/complete stream flowing back into the transcript.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use lectavera_auth::{AuthStore, TokenPair};
use lectavera_client::{ClientConfig, SessionEvent, StudySessionClient};
use lectavera_types::{Role, StudyMode, Verdict};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

const TIMEOUT: Duration = Duration::from_secs(10);

struct ServerHarness {
    addr: std::net::SocketAddr,
    /// Full request URI of the accepted handshake.
    uri: oneshot::Receiver<String>,
    /// Text frames the client transmitted.
    received: mpsc::UnboundedReceiver<String>,
    /// Text frames to push to the client.
    outbound: mpsc::UnboundedSender<String>,
}

/// Accepts exactly one WebSocket connection and bridges it to channels.
async fn spawn_server() -> ServerHarness {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (uri_tx, uri_rx) = oneshot::channel();
    let (recv_tx, recv_rx) = mpsc::unbounded_channel();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut uri_tx = Some(uri_tx);
        let ws = accept_hdr_async(stream, |req: &Request, resp: Response| {
            if let Some(tx) = uri_tx.take() {
                let _ = tx.send(req.uri().to_string());
            }
            Ok::<_, ErrorResponse>(resp)
        })
        .await
        .unwrap();
        let (mut sink, mut stream) = ws.split();

        loop {
            tokio::select! {
                frame = out_rx.recv() => match frame {
                    Some(text) => sink.send(WsMessage::Text(text)).await.unwrap(),
                    None => break,
                },
                msg = stream.next() => match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        let _ = recv_tx.send(text);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                },
            }
        }
    });

    ServerHarness {
        addr,
        uri: uri_rx,
        received: recv_rx,
        outbound: out_tx,
    }
}

fn auth() -> Arc<AuthStore> {
    Arc::new(AuthStore::with_tokens(TokenPair {
        access_token: "it-access-token".into(),
        refresh_token: "it-refresh-token".into(),
    }))
}

async fn next_update(rx: &mut broadcast::Receiver<SessionEvent>) {
    loop {
        let event = tokio::time::timeout(TIMEOUT, rx.recv())
            .await
            .expect("timed out waiting for session event")
            .expect("event stream closed");
        if event == SessionEvent::TranscriptUpdated {
            return;
        }
    }
}

#[tokio::test]
async fn full_round_trip_over_a_real_socket() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let mut server = spawn_server().await;
    let config = ClientConfig {
        ws_base_url: format!("ws://{}", server.addr),
    };

    let client = StudySessionClient::connect("sess-42", auth(), &config);
    let mut connected = client.watch_connected();
    tokio::time::timeout(TIMEOUT, async {
        while !*connected.borrow_and_update() {
            connected.changed().await.unwrap();
        }
    })
    .await
    .expect("timed out waiting for connection");

    // The handshake carried the session path and the bearer token.
    let uri = server.uri.await.unwrap();
    assert_eq!(uri, "/ws/sess-42?token=it-access-token");

    let mut events = client.subscribe();
    client
        .send_message("Summarize chapter 3", StudyMode::Summarize)
        .await
        .unwrap();
    next_update(&mut events).await;

    let sent = tokio::time::timeout(TIMEOUT, server.received.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&sent).unwrap(),
        serde_json::json!({"content": "Summarize chapter 3", "mode": "summarize"})
    );

    // Stream a response back and finalize it.
    for frame in [
        r#"{"type":"chunk","content":"Chapter 3 "}"#,
        r#"{"type":"chunk","content":"covers limits."}"#,
        r#"{"type":"complete","citations":[{"source_type":"pdf","document_name":"calculus.pdf","page_number":41,"snippet":"limits"}],"verdict":"correct"}"#,
    ] {
        server.outbound.send(frame.to_string()).unwrap();
        next_update(&mut events).await;
    }

    let transcript = client.transcript().await.unwrap();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].role, Role::User);
    let answer = &transcript[1];
    assert_eq!(answer.role, Role::Assistant);
    assert!(!answer.is_streaming);
    assert_eq!(answer.content, "Chapter 3 covers limits.");
    assert_eq!(answer.verdict, Some(Verdict::Correct));
    assert_eq!(answer.citations.len(), 1);
    assert_eq!(
        answer.citations[0].document_name.as_deref(),
        Some("calculus.pdf")
    );

    client.disconnect().await;
    assert!(!client.is_connected());
}
