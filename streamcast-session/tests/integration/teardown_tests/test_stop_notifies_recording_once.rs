use crate::utils::spawn_stream;

#[tokio::test]
async fn test_stop_notifies_recording_once() {
    let mut stream = spawn_stream().await;
    stream.host.wait_negotiated().await;

    stream.host.handle.stop().await;
    stream.host.wait_ended().await;
    assert_eq!(stream.host.recording.count(), 1);

    // A second stop lands on a closed loop and must not notify again.
    stream.host.handle.stop().await;
    assert_eq!(stream.host.recording.count(), 1);

    stream.viewer.handle.stop().await;
}
