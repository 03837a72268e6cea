use crate::utils::spawn_stream;
use streamcast_session::ScreenShareOutcome;

#[tokio::test]
async fn test_screen_share_start_and_stop() {
    let mut stream = spawn_stream().await;
    stream.host.wait_negotiated().await;
    stream.viewer.wait_negotiated().await;

    let outcome = stream.host.handle.start_screen_share().await.unwrap();
    assert_eq!(outcome, ScreenShareOutcome::Started);

    // The announcement precedes the renegotiation offer, so the viewer sees
    // the flag before it answers.
    stream.viewer.wait_screen_share(true).await;
    stream.host.wait_negotiated().await;
    stream.viewer.wait_negotiated().await;

    let outcome = stream.host.handle.stop_screen_share().await.unwrap();
    assert_eq!(outcome, ScreenShareOutcome::Stopped);

    stream.viewer.wait_screen_share(false).await;
    stream.host.wait_negotiated().await;
    stream.viewer.wait_negotiated().await;

    stream.host.handle.stop().await;
    stream.viewer.handle.stop().await;
}
