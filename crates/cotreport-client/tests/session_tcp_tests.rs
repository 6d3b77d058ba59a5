//! Forwarding session against a real loopback TCP peer.

use cotreport_client::{
    ClientConfig, ConnectionState, ForwardingSession, OutboundMessage, OutboundQueue,
    TcpConnector, TickOutcome,
};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

fn session_for(addr: &str) -> ForwardingSession<TcpConnector> {
    ForwardingSession::new(TcpConnector::new(ClientConfig {
        server_addr: addr.to_string(),
        connect_timeout: Some(Duration::from_secs(2)),
        write_timeout: Some(Duration::from_secs(2)),
        ..Default::default()
    }))
}

fn event(uid: &str) -> OutboundMessage {
    OutboundMessage::new(uid, format!("<event uid=\"{}\"/>", uid))
}

#[tokio::test]
async fn test_unreachable_server_stays_disconnected() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let mut session = session_for(&addr);
    let mut queue = OutboundQueue::new();
    queue.push(event("m1"));

    for _ in 0..3 {
        let outcome = session.tick(&mut queue).await;
        assert!(matches!(outcome, TickOutcome::ConnectFailed(_)), "{:?}", outcome);
        assert_eq!(session.state(), ConnectionState::Disconnected);
    }

    assert_eq!(queue.len(), 1);
    let metrics = session.metrics().snapshot();
    assert_eq!(metrics.connect_attempts, 3);
    assert_eq!(metrics.connect_failures, 3);
    assert_eq!(metrics.messages_sent, 0);
}

#[tokio::test]
async fn test_drain_writes_messages_in_order() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let mut session = session_for(&addr);
    let mut queue = OutboundQueue::new();
    for uid in ["m1", "m2", "m3"] {
        queue.push(event(uid));
    }

    assert!(matches!(session.tick(&mut queue).await, TickOutcome::Connected));
    let (mut peer, _) = listener.accept().await.unwrap();

    let outcome = session.tick(&mut queue).await;
    assert!(matches!(outcome, TickOutcome::Drained { sent: 3 }), "{:?}", outcome);
    assert!(queue.is_empty());

    session.disconnect().await;

    let mut received = String::new();
    peer.read_to_string(&mut received).await.unwrap();
    assert_eq!(
        received,
        "<event uid=\"m1\"/><event uid=\"m2\"/><event uid=\"m3\"/>"
    );
    assert_eq!(session.metrics().bytes_sent(), received.len() as u64);
}

#[tokio::test]
async fn test_reconnects_after_peer_hangs_up() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let mut session = session_for(&addr);
    let mut queue = OutboundQueue::new();

    assert!(matches!(session.tick(&mut queue).await, TickOutcome::Connected));
    let (first_peer, _) = listener.accept().await.unwrap();
    drop(first_peer);

    // The first write after the hang-up may still be buffered locally; keep
    // ticking until the reset surfaces.
    let mut failed_uid = None;
    for i in 0..50 {
        let uid = format!("m{}", i);
        queue.push(event(&uid));
        match session.tick(&mut queue).await {
            TickOutcome::WriteFailed { remaining, .. } => {
                assert_eq!(remaining, 1);
                failed_uid = Some(uid);
                break;
            }
            TickOutcome::Drained { .. } => tokio::time::sleep(Duration::from_millis(20)).await,
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    let failed_uid = failed_uid.expect("writing to a closed peer should eventually fail");
    assert_eq!(session.state(), ConnectionState::Disconnected);
    assert_eq!(queue.front().map(|m| m.uid.clone()), Some(failed_uid.clone()));
    assert_eq!(session.metrics().write_failures(), 1);

    // Next tick reconnects without draining, the one after resends.
    assert!(matches!(session.tick(&mut queue).await, TickOutcome::Connected));
    assert_eq!(queue.len(), 1);
    let (mut second_peer, _) = listener.accept().await.unwrap();

    let outcome = session.tick(&mut queue).await;
    assert!(matches!(outcome, TickOutcome::Drained { sent: 1 }), "{:?}", outcome);
    session.disconnect().await;

    let mut received = String::new();
    second_peer.read_to_string(&mut received).await.unwrap();
    assert_eq!(received, format!("<event uid=\"{}\"/>", failed_uid));
}
