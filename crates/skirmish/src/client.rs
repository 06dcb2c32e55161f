//! `SkirmishClient` builder and client loop.
//!
//! This is the entry point for running a Skirmish client. It ties
//! together all the layers: transport → protocol → session → frame/input.

use skirmish_frame::{step, FrameScheduler, WorldConfig};
use skirmish_input::{InputEmitter, KeyEvent};
use skirmish_protocol::{BinaryCodec, Codec, PlayerId};
use skirmish_session::{InboundFraming, Session};
use skirmish_transport::{Connection, TransportError, WebSocketConnection};
use tokio::sync::mpsc;

use crate::handler::{handle_inbound, handle_input};
use crate::{ClientConfig, RenderSurface, SkirmishError};

/// Capacity of the channel returned by [`input_channel`].
pub const INPUT_CHANNEL_CAPACITY: usize = 64;

/// Creates the channel a client reads key events from.
///
/// Keep the sender in whatever produces input (a window event loop, a
/// bot task); hand the receiver to [`SkirmishClient::run`]. Dropping every
/// sender simply stops input; the client keeps running.
pub fn input_channel() -> (mpsc::Sender<KeyEvent>, mpsc::Receiver<KeyEvent>) {
    mpsc::channel(INPUT_CHANNEL_CAPACITY)
}

/// Counters describing a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// The id the server assigned, if the handshake completed.
    pub local_id: Option<PlayerId>,
    /// Frames rendered.
    pub frames: u64,
    /// Buffers received from the server.
    pub received: u64,
    /// Buffers sent to the server (the confirm plus every input event).
    pub sent: u64,
    /// Inbound buffers, or events within a batch, that were dropped.
    pub dropped: u64,
}

/// Builder for configuring and connecting a Skirmish client.
///
/// # Example
///
/// ```rust,no_run
/// use skirmish::prelude::*;
///
/// # async fn demo() -> Result<(), SkirmishError> {
/// let client = SkirmishClient::builder()
///     .server_addr("127.0.0.1:6969")
///     .frame_rate(60)
///     .connect()
///     .await?;
///
/// let (_keys, input) = input_channel();
/// let summary = client.run(TraceSurface, input).await?;
/// println!("rendered {} frames", summary.frames);
/// # Ok(())
/// # }
/// ```
pub struct SkirmishClientBuilder {
    config: ClientConfig,
}

impl SkirmishClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the `host:port` to connect to.
    pub fn server_addr(mut self, addr: &str) -> Self {
        self.config.server_addr = addr.to_string();
        self
    }

    /// Sets the frame rate. 0 runs frames uncapped.
    pub fn frame_rate(mut self, hz: u32) -> Self {
        self.config.frame.frame_rate_hz = hz;
        self
    }

    /// Sets how active-state buffers are framed.
    pub fn inbound_framing(mut self, framing: InboundFraming) -> Self {
        self.config.session.inbound_framing = framing;
        self
    }

    /// Sets the world geometry used for prediction.
    pub fn world(mut self, world: WorldConfig) -> Self {
        self.config.world = world;
        self
    }

    /// Opens a WebSocket to the configured server and builds the client.
    pub async fn connect(
        self,
    ) -> Result<SkirmishClient<WebSocketConnection>, SkirmishError> {
        let config = self.config.validated();
        let conn = WebSocketConnection::connect(&config.url()).await?;
        Ok(SkirmishClient::new(conn, BinaryCodec, config))
    }

    /// Builds the client over an already-open connection.
    pub fn build<C>(self, conn: C) -> SkirmishClient<C>
    where
        C: Connection<Error = TransportError>,
    {
        self.build_with_codec(conn, BinaryCodec)
    }

    /// Builds the client over an already-open connection and a custom codec.
    pub fn build_with_codec<C, K>(self, conn: C, codec: K) -> SkirmishClient<C, K>
    where
        C: Connection<Error = TransportError>,
        K: Codec,
    {
        SkirmishClient::new(conn, codec, self.config.validated())
    }
}

impl Default for SkirmishClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A connected Skirmish client.
///
/// Call [`run()`](Self::run) to drive it until the server goes away.
pub struct SkirmishClient<C, K = BinaryCodec>
where
    C: Connection<Error = TransportError>,
    K: Codec,
{
    conn: C,
    codec: K,
    session: Session,
    scheduler: FrameScheduler,
    world: WorldConfig,
    emitter: InputEmitter,
}

impl SkirmishClient<WebSocketConnection> {
    /// Creates a new builder.
    pub fn builder() -> SkirmishClientBuilder {
        SkirmishClientBuilder::new()
    }
}

impl<C, K> SkirmishClient<C, K>
where
    C: Connection<Error = TransportError>,
    K: Codec,
{
    fn new(conn: C, codec: K, config: ClientConfig) -> Self {
        Self {
            conn,
            codec,
            session: Session::new(config.session),
            scheduler: FrameScheduler::new(config.frame),
            world: config.world,
            emitter: InputEmitter::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    /// Runs the client loop until the server closes the connection.
    ///
    /// Each turn of the loop does exactly one of three things, to
    /// completion, before looking at the others again:
    ///
    /// - an inbound buffer is dispatched into the session, and the
    ///   handshake reply (if any) is sent;
    /// - a frame advances every player and is handed to `surface`;
    /// - a key event updates the local player and its `PlayerMoved` is
    ///   sent.
    ///
    /// The session is closed and the connection shut down whichever way
    /// the loop ends.
    ///
    /// # Errors
    /// A transport failure (receive or send) ends the run with
    /// `SkirmishError::Transport`. Bad individual messages never do.
    pub async fn run<S: RenderSurface>(
        mut self,
        mut surface: S,
        mut input: mpsc::Receiver<KeyEvent>,
    ) -> Result<RunSummary, SkirmishError> {
        let conn_id = self.conn.id();
        self.session.on_open()?;
        tracing::info!(%conn_id, "client running");

        let mut summary = RunSummary::default();
        let result = self.drive(&mut surface, &mut input, &mut summary).await;

        summary.local_id = self.session.local_id();
        self.session.on_close();
        if let Err(e) = self.conn.close().await {
            tracing::debug!(%conn_id, error = %e, "close after run failed");
        }

        match &result {
            Ok(()) => tracing::info!(
                %conn_id,
                frames = summary.frames,
                received = summary.received,
                sent = summary.sent,
                "client stopped"
            ),
            Err(e) => tracing::warn!(%conn_id, error = %e, "client stopped with error"),
        }
        result.map(|()| summary)
    }

    async fn drive<S: RenderSurface>(
        &mut self,
        surface: &mut S,
        input: &mut mpsc::Receiver<KeyEvent>,
        summary: &mut RunSummary,
    ) -> Result<(), SkirmishError> {
        let mut input_open = true;

        loop {
            tokio::select! {
                msg = self.conn.recv() => match msg? {
                    Some(data) => {
                        summary.received += 1;
                        handle_inbound(
                            &self.conn,
                            &self.codec,
                            &mut self.session,
                            &data,
                            summary,
                        )
                        .await?;
                    }
                    None => {
                        tracing::info!(
                            conn_id = %self.conn.id(),
                            "server closed the connection"
                        );
                        return Ok(());
                    }
                },
                frame = self.scheduler.wait_for_frame() => {
                    step(
                        self.session.registry_mut().iter_mut(),
                        frame.elapsed_secs(),
                        &self.world,
                    );
                    surface.draw(&frame, &self.session.registry().snapshot());
                    self.scheduler.record_frame_end();
                    summary.frames += 1;
                }
                event = input.recv(), if input_open => match event {
                    Some(event) => {
                        handle_input(
                            &self.conn,
                            &self.codec,
                            &mut self.session,
                            &mut self.emitter,
                            event,
                            summary,
                        )
                        .await?;
                    }
                    None => {
                        tracing::debug!("input channel closed");
                        input_open = false;
                    }
                },
            }
        }
    }
}
