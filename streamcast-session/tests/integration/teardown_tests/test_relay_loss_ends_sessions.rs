use crate::utils::spawn_stream;

#[tokio::test]
async fn test_relay_loss_ends_sessions() {
    let mut stream = spawn_stream().await;
    stream.host.wait_negotiated().await;
    stream.viewer.wait_negotiated().await;

    // Dropping the stream closes every participant's envelope channel; both
    // sessions treat that as relay loss and clean up.
    stream.relay.close_stream(&stream.stream_id);

    stream.host.wait_ended().await;
    stream.viewer.wait_ended().await;
    assert_eq!(stream.host.recording.count(), 1);
    assert_eq!(stream.viewer.recording.count(), 1);
}
