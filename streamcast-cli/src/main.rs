use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;
use std::time::Duration;
use streamcast_core::StreamId;
use streamcast_relay::RelayService;
use streamcast_session::{
    MediaSinks, MemoryRelay, NoopRecording, SessionConfig, SessionEvent, StreamSession,
    SyntheticMediaSource,
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use webrtc::track::track_remote::TrackRemote;

#[derive(Parser)]
#[command(name = "streamcast")]
#[command(about = "Broadcast signaling relay and negotiation demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the WebSocket signaling relay.
    Relay {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },
    /// Negotiate an in-process host/viewer pair and walk through a
    /// screen-share renegotiation.
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Relay { addr } => run_relay(addr).await,
        Commands::Demo => run_demo().await,
    }
}

async fn run_relay(addr: String) -> Result<()> {
    let app = streamcast_relay::router(RelayService::new());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Relay listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

struct PrintingSinks;

#[async_trait]
impl MediaSinks for PrintingSinks {
    async fn attach_primary_track(&self, track: Arc<TrackRemote>) {
        println!(
            "{} primary {} track {}",
            "[viewer]".blue(),
            track.kind(),
            track.id()
        );
    }

    async fn attach_screen_share_track(&self, track: Arc<TrackRemote>) {
        println!("{} screen-share track {}", "[viewer]".blue(), track.id());
    }

    async fn detach_screen_share_track(&self) {
        println!("{} screen-share track detached", "[viewer]".blue());
    }
}

async fn run_demo() -> Result<()> {
    println!("{}", "Starting in-process broadcast demo".green().bold());

    let relay = MemoryRelay::new();
    let stream_id = StreamId::random();
    println!("Stream id: {}", stream_id.to_string().cyan());

    let (host_sink, host_rx) = relay.attach(&stream_id);
    let (host_session, host_handle, mut host_events) = StreamSession::host(
        stream_id.clone(),
        SessionConfig::default(),
        host_sink,
        host_rx,
        Arc::new(SyntheticMediaSource),
        Arc::new(NoopRecording),
    );
    tokio::spawn(host_session.run());

    let (viewer_sink, viewer_rx) = relay.attach(&stream_id);
    let (viewer_session, viewer_handle, viewer_events) = StreamSession::viewer(
        stream_id.clone(),
        SessionConfig::default(),
        viewer_sink,
        viewer_rx,
        Arc::new(PrintingSinks),
        Arc::new(NoopRecording),
    );
    tokio::spawn(viewer_session.run());
    tokio::spawn(print_events("[viewer]", viewer_events));

    // Wait for the initial offer/answer exchange before prompting.
    loop {
        match host_events.recv().await {
            Some(SessionEvent::Negotiated) => break,
            Some(SessionEvent::Fatal(e)) => anyhow::bail!("host session failed: {e}"),
            Some(event) => println!("{} {:?}", "[host]".yellow(), event),
            None => anyhow::bail!("host session ended before negotiating"),
        }
    }
    println!("{}", "Link negotiated".green());
    tokio::spawn(print_events("[host]", host_events));

    if confirm("Start screen sharing?").await? {
        let outcome = host_handle.start_screen_share().await?;
        println!("{} screen share: {:?}", "[host]".yellow(), outcome);

        if confirm("Stop screen sharing?").await? {
            let outcome = host_handle.stop_screen_share().await?;
            println!("{} screen share: {:?}", "[host]".yellow(), outcome);
        }
    }

    viewer_handle.stop().await;
    host_handle.stop().await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    println!("{}", "Demo finished".green().bold());
    Ok(())
}

async fn print_events(
    label: &'static str,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
) {
    while let Some(event) = events.recv().await {
        let label = if label == "[host]" {
            label.yellow()
        } else {
            label.blue()
        };
        println!("{} {:?}", label, event);
    }
}

async fn confirm(prompt: &str) -> Result<bool> {
    let prompt = prompt.to_owned();
    let answer = tokio::task::spawn_blocking(move || {
        Confirm::new().with_prompt(prompt).default(true).interact()
    })
    .await??;
    Ok(answer)
}
