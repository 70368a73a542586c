use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::stream::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, broadcast::error::RecvError, watch};
use tracing::{debug, info, warn};

use crate::console::{MatchConsole, MatchSnapshot};
use crate::event::MatchChange;
use crate::shared::{AppError, AppState};
use crate::stats::MatchStats;

/// Frames pushed to live viewers
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum LiveFrame {
    Snapshot(MatchSnapshot),
    Change(MatchChange),
    Stats(MatchStats),
}

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Could not encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The text-frame half of a WebSocket that the live feed needs
#[async_trait]
pub trait FrameSocket: Send {
    async fn send_text(&mut self, text: String) -> Result<(), LiveError>;

    /// Next text frame from the viewer, None once the viewer has gone
    async fn next_inbound(&mut self) -> Result<Option<String>, LiveError>;

    async fn close(&mut self);
}

#[async_trait]
impl FrameSocket for WebSocket {
    async fn send_text(&mut self, text: String) -> Result<(), LiveError> {
        self.send(Message::Text(text))
            .await
            .map_err(|e| LiveError::SendFailed(e.to_string()))
    }

    async fn next_inbound(&mut self) -> Result<Option<String>, LiveError> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // Ignore binary/ping/pong
                Some(Err(e)) => return Err(LiveError::ReceiveFailed(e.to_string())),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.send(Message::Close(None)).await;
    }
}

/// Where a live feed takes the viewer's baseline from
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn baseline(&self) -> MatchSnapshot;

    /// Baseline after the feed dropped changes. Sources that cache state
    /// refresh it before answering.
    async fn rebaseline(&self) -> MatchSnapshot {
        self.baseline().await
    }
}

#[async_trait]
impl SnapshotSource for MatchConsole {
    async fn baseline(&self) -> MatchSnapshot {
        self.snapshot().await
    }

    async fn rebaseline(&self) -> MatchSnapshot {
        if let Err(e) = self.resync().await {
            warn!(match_id = %self.match_id(), error = %e, "Resync for live viewer failed");
        }
        self.snapshot().await
    }
}

/// Streams one match to one viewer: a snapshot, then changes and stats as they happen
pub struct LiveFeed {
    match_id: String,
    socket: Box<dyn FrameSocket>,
    changes: broadcast::Receiver<MatchChange>,
    stats: watch::Receiver<MatchStats>,
    source: Arc<dyn SnapshotSource>,
}

impl LiveFeed {
    pub fn new(
        match_id: String,
        socket: Box<dyn FrameSocket>,
        changes: broadcast::Receiver<MatchChange>,
        stats: watch::Receiver<MatchStats>,
        source: Arc<dyn SnapshotSource>,
    ) -> Self {
        Self {
            match_id,
            socket,
            changes,
            stats,
            source,
        }
    }

    /// Runs until the viewer disconnects or the match stream closes.
    ///
    /// `changes` must be subscribed before this is called, so nothing falls
    /// between the baseline snapshot and the first change.
    pub async fn run(mut self) -> Result<(), LiveError> {
        let snapshot = self.source.baseline().await;
        self.socket
            .send_text(encode(&LiveFrame::Snapshot(snapshot))?)
            .await?;

        loop {
            tokio::select! {
                change = self.changes.recv() => {
                    match change {
                        Ok(change) => {
                            self.socket.send_text(encode(&LiveFrame::Change(change))?).await?
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(
                                match_id = %self.match_id,
                                skipped = skipped,
                                "Live viewer lagged, sending a fresh snapshot"
                            );
                            let snapshot = self.source.rebaseline().await;
                            self.socket
                                .send_text(encode(&LiveFrame::Snapshot(snapshot))?)
                                .await?
                        }
                        Err(RecvError::Closed) => break,
                    }
                }

                changed = self.stats.changed() => {
                    if changed.is_err() {
                        break; // Console gone
                    }
                    let stats = self.stats.borrow_and_update().clone();
                    self.socket.send_text(encode(&LiveFrame::Stats(stats))?).await?
                }

                inbound = self.socket.next_inbound() => {
                    match inbound? {
                        Some(text) => debug!(
                            match_id = %self.match_id,
                            message = %text,
                            "Ignoring message from live viewer"
                        ),
                        None => break,
                    }
                }
            }
        }

        self.socket.close().await;
        Ok(())
    }
}

fn encode(frame: &LiveFrame) -> Result<String, LiveError> {
    Ok(serde_json::to_string(frame)?)
}

/// GET /matches/:match_id/live
pub async fn live_handler(
    ws: WebSocketUpgrade,
    Path(match_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let managed = state.consoles.get_or_load(&match_id).await?;

    // Subscribe before the feed takes its snapshot so no change falls in between
    let changes = state.store.subscribe(&match_id).await;
    let stats = managed.console.watch_stats();
    let source: Arc<dyn SnapshotSource> = managed.console;

    info!(match_id = %match_id, "Live viewer connecting");
    Ok(ws.on_upgrade(move |socket| async move {
        let feed = LiveFeed::new(match_id.clone(), Box::new(socket), changes, stats, source);
        match feed.run().await {
            Ok(()) => info!(match_id = %match_id, "Live viewer disconnected"),
            Err(e) => warn!(match_id = %match_id, error = %e, "Live feed ended with error"),
        }
    }))
}
