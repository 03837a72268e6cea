use crate::utils::spawn_stream;

#[tokio::test]
async fn test_ready_drives_offer_answer() {
    let mut stream = spawn_stream().await;

    // The viewer's `ready` makes the host offer; the answer closes the
    // exchange on both sides.
    stream.host.wait_negotiated().await;
    stream.viewer.wait_negotiated().await;

    stream.host.handle.stop().await;
    stream.viewer.handle.stop().await;
}
