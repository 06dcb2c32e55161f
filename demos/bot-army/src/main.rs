//! Headless bots that connect to a Skirmish server and walk in squares.
//!
//! ```text
//! bot-army [COUNT] [HOST:PORT]
//! ```
//!
//! Defaults to 8 bots against `127.0.0.1:6969`. Stops on Ctrl-C.

use std::time::Duration;

use futures_util::future::join_all;
use rand::Rng;
use skirmish::prelude::*;
use skirmish::DEFAULT_SERVER_ADDR;
use tokio::sync::mpsc;

const DEFAULT_BOTS: usize = 8;

/// The square each bot walks.
const ROUTE: [MovementKey; 4] = [
    MovementKey::Up,
    MovementKey::Right,
    MovementKey::Down,
    MovementKey::Left,
];

const STEP_INTERVAL: Duration = Duration::from_secs(1);
const MAX_JITTER_MS: i64 = 300;

/// Presses the next key on the route and releases the previous one,
/// about once a second, until the client stops listening.
async fn steer(bot: usize, keys: mpsc::Sender<KeyEvent>) {
    let mut held: Option<MovementKey> = None;

    for key in ROUTE.iter().copied().cycle() {
        let jitter_ms = rand::rng().random_range(-MAX_JITTER_MS..=MAX_JITTER_MS);
        let nap = STEP_INTERVAL.as_millis() as i64 + jitter_ms;
        tokio::time::sleep(Duration::from_millis(nap.max(0) as u64)).await;

        let mut events = vec![KeyEvent::press(key)];
        if let Some(previous) = held.replace(key) {
            events.push(KeyEvent::release(previous));
        }
        for event in events {
            if keys.send(event).await.is_err() {
                tracing::debug!(bot, "client gone, bot stops steering");
                return;
            }
        }
    }
}

async fn run_bot(bot: usize, addr: String) {
    let client = match SkirmishClient::builder()
        .server_addr(&addr)
        .connect()
        .await
    {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(bot, error = %e, "bot failed to connect");
            return;
        }
    };

    let (keys, input) = input_channel();
    let (result, ()) = tokio::join!(client.run(NullSurface, input), steer(bot, keys));

    match result {
        Ok(summary) => tracing::info!(
            bot,
            player_id = ?summary.local_id,
            sent = summary.sent,
            "bot finished"
        ),
        Err(e) => tracing::warn!(bot, error = %e, "bot stopped with error"),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let count = match args.next().map(|s| s.parse::<usize>()) {
        None => DEFAULT_BOTS,
        Some(Ok(n)) => n,
        Some(Err(e)) => {
            tracing::warn!(error = %e, default = DEFAULT_BOTS, "bad bot count");
            DEFAULT_BOTS
        }
    };
    let addr = args.next().unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string());

    tracing::info!(count, %addr, "starting bot army");

    let bots = join_all((0..count).map(|bot| run_bot(bot, addr.clone())));
    tokio::select! {
        _ = bots => tracing::info!("all bots finished"),
        _ = tokio::signal::ctrl_c() => tracing::info!("interrupted, shutting down"),
    }
}
