use crate::utils::{spawn_media_stream, wait_until};
use std::time::Duration;
use streamcast_session::ScreenShareOutcome;

#[tokio::test]
async fn test_remote_tracks_land_in_the_right_sinks() {
    let (mut stream, media) = spawn_media_stream().await;
    stream.host.wait_negotiated().await;
    stream.viewer.wait_negotiated().await;

    // Keep frames flowing so the viewer's inbound tracks fire.
    let pump = tokio::spawn({
        let media = media.clone();
        async move {
            loop {
                media.pump().await;
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        }
    });

    let sinks = stream.viewer_sinks.clone();
    wait_until("both camera tracks reach the primary sink", || {
        sinks.primary_ids().len() == 2
    })
    .await;
    assert!(
        sinks.screen_ids().is_empty(),
        "camera tracks must not spill into the screen sink"
    );

    let outcome = stream.host.handle.start_screen_share().await.unwrap();
    assert_eq!(outcome, ScreenShareOutcome::Started);
    stream.host.wait_negotiated().await;
    stream.viewer.wait_negotiated().await;

    wait_until("the screen track reaches the screen sink", || {
        sinks.screen_ids() == vec!["screen-video".to_owned()]
    })
    .await;

    // The renegotiated track lands in the screen sink only; the primary
    // attachments are untouched.
    let primary = sinks.primary_ids();
    assert_eq!(primary.len(), 2);
    assert!(!primary.contains(&"screen-video".to_owned()));

    let outcome = stream.host.handle.stop_screen_share().await.unwrap();
    assert_eq!(outcome, ScreenShareOutcome::Stopped);
    stream.viewer.wait_screen_share(false).await;
    wait_until("the screen sink is detached", || sinks.detaches() == 1).await;

    pump.abort();
    stream.host.handle.stop().await;
    stream.viewer.handle.stop().await;
}
