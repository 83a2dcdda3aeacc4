//! Integration tests for the WebSocket transport.
//!
//! A real server and client exchange frames over loopback.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use teeg_transport::{Connection, Transport, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: &str) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        ws
    }

    /// Binds on an OS-assigned port and returns the server side of one
    /// accepted connection plus the client.
    async fn pair() -> (teeg_transport::WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().unwrap().to_string();

        let accept = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });
        let client = connect_client(&addr).await;
        let server = accept.await.expect("task should complete");
        (server, client)
    }

    #[tokio::test]
    async fn test_text_frames_flow_both_ways() {
        let (server, mut client) = pair().await;
        assert!(server.id().into_inner() > 0);

        server.send(br#"{"type":"Bomb"}"#).await.unwrap();
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "JSON should go out as a text frame");
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"type":"Bomb"}"#);

        client
            .send(Message::text(r#"{"type":"Ping","client_time":1}"#))
            .await
            .unwrap();
        let received = server.recv().await.unwrap().expect("a frame");
        assert_eq!(received, br#"{"type":"Ping","client_time":1}"#);

        server.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_binary_frames_are_accepted() {
        let (server, mut client) = pair().await;

        client
            .send(Message::binary(vec![0xff, 0x00]))
            .await
            .unwrap();

        let received = server.recv().await.unwrap().unwrap();
        assert_eq!(received, vec![0xff, 0x00]);
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_client_close() {
        let (server, mut client) = pair().await;

        client.send(Message::Close(None)).await.unwrap();

        let result = server.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_send_is_not_blocked_by_pending_recv() {
        let (server, mut client) = pair().await;
        let server = Arc::new(server);

        let reader = {
            let server = Arc::clone(&server);
            tokio::spawn(async move { server.recv().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        tokio::time::timeout(Duration::from_secs(1), server.send(b"state"))
            .await
            .expect("send must not wait for the reader")
            .unwrap();
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"state");

        client.send(Message::Close(None)).await.unwrap();
        assert!(reader.await.unwrap().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ping_frames_count_as_activity() {
        let (server, mut client) = pair().await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(server.idle_for() >= Duration::from_millis(200));

        client
            .send(Message::Ping(b"keepalive".to_vec().into()))
            .await
            .unwrap();
        // The ping is consumed inside recv, which keeps waiting for data.
        let pending =
            tokio::time::timeout(Duration::from_millis(100), server.recv())
                .await;
        assert!(pending.is_err(), "a ping is not a data frame");

        assert!(server.idle_for() < Duration::from_millis(200));
        let pong = tokio::time::timeout(Duration::from_secs(1), client.next())
            .await
            .expect("the server should answer the ping")
            .unwrap()
            .unwrap();
        assert!(pong.is_pong(), "expected a pong, got {pong:?}");
    }
}
