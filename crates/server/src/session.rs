//! One client's container session: the open window, inbound message handling
//! and per-tick flushing.

use crate::config::SessionConfig;
use anyhow::{anyhow, Context, Result};
use mdcontainer_core::{ItemRegistry, SimTick};
use mdcontainer_net::{
    decode_client_message, encode_server_message, ClickLogger, ClickReplay, ClientMessage,
    ServerMessage,
};
use mdcontainer_window::{
    ClientContainer, ClientPlayer, ContainerIdAllocator, InteractionBehavior, WindowLayout,
    CONTAINER_IDS,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Server side of one connected player's window traffic.
///
/// At most one window is open at a time. Inbound messages are applied as they
/// arrive; outbound updates are batched and produced by [`Self::end_tick`].
pub struct ContainerSession {
    config: SessionConfig,
    registry: Arc<ItemRegistry>,
    ids: &'static ContainerIdAllocator,
    /// Held here only while no window is open.
    player: Option<ClientPlayer>,
    window: Option<ClientContainer>,
    tick: SimTick,
    clicks_this_tick: usize,
    logger: Option<ClickLogger>,
}

impl ContainerSession {
    /// Create a session for `player`. Opens the click log when one is configured.
    pub fn new(config: SessionConfig, player: ClientPlayer) -> Result<Self> {
        Self::with_allocator(config, player, &CONTAINER_IDS)
    }

    /// Like [`Self::new`], taking window ids from `ids`.
    pub fn with_allocator(
        config: SessionConfig,
        player: ClientPlayer,
        ids: &'static ContainerIdAllocator,
    ) -> Result<Self> {
        let registry = Arc::new(config.build_registry());
        let logger = match &config.click_log {
            Some(path) => Some(
                ClickLogger::create(path)
                    .with_context(|| format!("failed to open click log {}", path.display()))?,
            ),
            None => None,
        };

        Ok(Self {
            config,
            registry,
            ids,
            player: Some(player),
            window: None,
            tick: SimTick::ZERO,
            clicks_this_tick: 0,
            logger,
        })
    }

    /// Item rules used by every window of this session.
    pub fn registry(&self) -> &Arc<ItemRegistry> {
        &self.registry
    }

    /// Settings this session was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current tick.
    pub fn current_tick(&self) -> SimTick {
        self.tick
    }

    /// The player, whether or not a window is open.
    pub fn player(&self) -> Option<&ClientPlayer> {
        match &self.window {
            Some(window) => window.player(),
            None => self.player.as_ref(),
        }
    }

    /// Mutable access to the player, e.g. to change game mode.
    pub fn player_mut(&mut self) -> Option<&mut ClientPlayer> {
        match &mut self.window {
            Some(window) => window.player_mut(),
            None => self.player.as_mut(),
        }
    }

    /// The open window, if any.
    pub fn window(&self) -> Option<&ClientContainer> {
        self.window.as_ref()
    }

    /// Mutable access to the open window, e.g. to bind its top part.
    pub fn window_mut(&mut self) -> Option<&mut ClientContainer> {
        self.window.as_mut()
    }

    /// Open a window, closing the current one first.
    ///
    /// `bind` runs before the window is shown so the initial snapshot already
    /// contains the top part's contents.
    #[instrument(skip(self, layout, behavior, bind), fields(kind = %layout.kind))]
    pub fn open(
        &mut self,
        layout: WindowLayout,
        behavior: Box<dyn InteractionBehavior>,
        bind: impl FnOnce(&mut ClientContainer),
    ) -> Result<Vec<ServerMessage>> {
        let mut messages = Vec::new();
        if let Some(close) = self.close() {
            messages.push(close);
        }
        let player = self
            .player
            .take()
            .ok_or_else(|| anyhow!("session has no player"))?;

        let registry = Arc::clone(&self.registry);
        let mut window = match ClientContainer::with_allocator(self.ids, layout, registry, behavior)
        {
            Ok(window) => window,
            Err(err) => {
                self.player = Some(player);
                return Err(err).context("failed to build window");
            }
        };
        bind(&mut window);
        window.attach_player(player);
        messages.extend(window.init_messages());
        info!(container_id = window.id(), "window opened");
        self.window = Some(window);
        Ok(messages)
    }

    /// Close the open window from the server side.
    pub fn close(&mut self) -> Option<ServerMessage> {
        let mut window = self.take_window()?;
        let message = window.close_message();
        window.release();
        Some(message)
    }

    fn take_window(&mut self) -> Option<ClientContainer> {
        let mut window = self.window.take()?;
        if let Some(player) = window.detach_player() {
            self.player = Some(player);
        }
        Some(window)
    }

    /// Decode, verify and apply one inbound frame.
    pub fn handle_frame(&mut self, frame: &[u8]) -> Result<()> {
        let message = decode_client_message(frame).context("failed to decode client frame")?;
        message
            .verify()
            .map_err(|reason| anyhow!("rejected client message: {reason}"))?;
        self.handle_message(message)
    }

    /// Apply one inbound message to the open window.
    #[instrument(skip(self, message), fields(tick = self.tick.0))]
    pub fn handle_message(&mut self, message: ClientMessage) -> Result<()> {
        if let Some(logger) = &mut self.logger {
            logger.log(self.tick.0, &message)?;
        }

        if let ClientMessage::CloseWindow { container_id } = message {
            match self.window.as_ref().map(ClientContainer::wire_id) {
                Some(open) if open == container_id => {
                    if let Some(mut window) = self.take_window() {
                        window.release();
                    }
                    debug!(container_id, "window closed by client");
                }
                _ => warn!(container_id, "close for a window that is not open"),
            }
            return Ok(());
        }

        if self.clicks_this_tick >= self.config.max_clicks_per_tick {
            warn!(
                limit = self.config.max_clicks_per_tick,
                "click rate limit reached, dropping message"
            );
            return Ok(());
        }
        self.clicks_this_tick += 1;

        let Some(window) = &mut self.window else {
            debug!("window input with no window open");
            return Ok(());
        };
        match message {
            ClientMessage::Click(event) => window.handle_click(&event),
            ClientMessage::CreativeClick(event) => window.handle_creative_click(&event),
            ClientMessage::Pick(event) => window.handle_pick(&event),
            ClientMessage::CloseWindow { .. } => {}
        }
        Ok(())
    }

    /// Updates pending for the open window.
    pub fn flush(&mut self) -> Vec<ServerMessage> {
        self.window
            .as_mut()
            .map(ClientContainer::collect_change_messages)
            .unwrap_or_default()
    }

    /// Flush, then advance to the next tick.
    pub fn end_tick(&mut self) -> Result<Vec<ServerMessage>> {
        let messages = self.flush();
        if let Some(logger) = &mut self.logger {
            logger.flush()?;
        }
        self.tick = self.tick.advance(1);
        self.clicks_this_tick = 0;
        Ok(messages)
    }

    /// Feed a recorded click log through the session tick by tick.
    ///
    /// Returns the outbound messages of each tick, starting at the session's
    /// current tick.
    pub fn replay(&mut self, replay: &mut ClickReplay) -> Result<Vec<Vec<ServerMessage>>> {
        let mut ticks = Vec::new();
        let Some(last) = replay.last_tick() else {
            return Ok(ticks);
        };
        while self.tick.0 <= last {
            for message in replay.messages_for_tick(self.tick.0) {
                self.handle_message(message)?;
            }
            ticks.push(self.end_tick()?);
        }
        Ok(ticks)
    }
}

/// Encode outbound messages into wire frames.
pub fn encode_frames(messages: &[ServerMessage]) -> Result<Vec<Vec<u8>>> {
    messages.iter().map(encode_server_message).collect()
}

impl std::fmt::Debug for ContainerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerSession")
            .field("tick", &self.tick)
            .field("window", &self.window)
            .field("clicks_this_tick", &self.clicks_this_tick)
            .finish_non_exhaustive()
    }
}
