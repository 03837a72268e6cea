use crate::utils::spawn_stream;
use streamcast_session::ScreenShareOutcome;

#[tokio::test]
async fn test_screen_share_is_idempotent() {
    let mut stream = spawn_stream().await;
    stream.host.wait_negotiated().await;

    // No screen share running yet: stop has nothing to do.
    let outcome = stream.host.handle.stop_screen_share().await.unwrap();
    assert_eq!(outcome, ScreenShareOutcome::NotActive);

    let outcome = stream.host.handle.start_screen_share().await.unwrap();
    assert_eq!(outcome, ScreenShareOutcome::Started);
    stream.host.wait_negotiated().await;

    let outcome = stream.host.handle.start_screen_share().await.unwrap();
    assert_eq!(outcome, ScreenShareOutcome::AlreadyActive);

    // A viewer session refuses the command outright.
    let outcome = stream.viewer.handle.start_screen_share().await.unwrap();
    assert_eq!(outcome, ScreenShareOutcome::NotHost);

    stream.host.handle.stop().await;
    stream.viewer.handle.stop().await;
}
