//! Sender and receiver over a real loopback socket.

use std::{future::pending, sync::Arc};

use gsvc_core::FrameMailbox;
use gsvc_harness::sample_frame;
use gsvc_receiver::{ChannelSink, Receiver, ReceiverConfig, StopReason};
use gsvc_sender::{Sender, SenderConfig};
use tokio::sync::oneshot;

#[tokio::test]
async fn receiver_sees_frames_until_sender_shuts_down() {
    let mailbox = Arc::new(FrameMailbox::new(1));
    let config = SenderConfig { bind: "127.0.0.1:0".to_string(), ..Default::default() };
    let sender = Sender::new(config, Arc::clone(&mailbox));

    let listener = sender.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        sender
            .serve(listener, async {
                let _ = stop_rx.await;
            })
            .await
    });

    mailbox.push(sample_frame(0, 1, 2_000));

    let config = ReceiverConfig { addr: addr.to_string(), ..Default::default() };
    let mut receiver = Receiver::connect(&config).await.unwrap();
    let (mut sink, mut rx) = ChannelSink::channel(8);
    let client = tokio::spawn(async move { receiver.run(&mut sink, pending()).await });

    assert_eq!(rx.recv().await.unwrap(), sample_frame(0, 1, 2_000));
    mailbox.push(sample_frame(0, 2, 2_000));
    assert_eq!(rx.recv().await.unwrap(), sample_frame(0, 2, 2_000));

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
    assert!(mailbox.is_stopped());

    let summary = client.await.unwrap().unwrap();
    assert_eq!(summary.reason, StopReason::PeerClosed);
    assert_eq!(summary.frames, 2);
}

#[tokio::test]
async fn connect_to_closed_port_fails() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ReceiverConfig { addr: addr.to_string(), ..Default::default() };
    assert!(Receiver::connect(&config).await.is_err());
}
