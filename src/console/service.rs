use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::errors::ConsoleError;
use super::state::{LiveMatchState, MatchSnapshot};
use super::tickers::{Ticker, TickerKind};
use crate::clock::{ClockTick, ClockToggle, Half, DEFAULT_CLOCK_FLUSH_EVERY};
use crate::event::{MatchSubscription, SubscriptionHandle};
use crate::notify::{Notice, OperatorNotifier, TracingNotifier};
use crate::possession::{PossessionTick, DEFAULT_POSSESSION_FLUSH_EVERY};
use crate::session::{ConsoleSession, Role};
use crate::stats::{score_mismatches, MatchStats, ScoreMismatch, StatsEngine, StatsPublisher};
use crate::store::{MatchPatch, MatchStore, StoreError};
use crate::sync::{LastWriterWins, MatchSyncHandler, ReconciliationStrategy, RemoteClockListener};
use crate::timeline::{EventType, MatchEvent, Team};
use crate::video::{SharedPlayhead, VideoSource};

/// Timer and flush cadence for a console
#[derive(Debug, Clone)]
pub struct ConsoleSettings {
    /// Real time per game second
    pub tick: Duration,
    /// Clock seconds are persisted whenever they reach a multiple of this
    pub clock_flush_every: u32,
    /// A possession bucket is persisted whenever it reaches a multiple of this
    pub possession_flush_every: u32,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            clock_flush_every: DEFAULT_CLOCK_FLUSH_EVERY,
            possession_flush_every: DEFAULT_POSSESSION_FLUSH_EVERY,
        }
    }
}

/// Operator answer for destructive actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Cancelled
        }
    }
}

/// Live tagging console for one match.
///
/// Every mutation is applied to local state first and then written to the
/// store. A failed write reverts the local change and notifies the operator.
/// Clock and possession flushes are best-effort and only logged on failure.
pub struct MatchConsole {
    match_id: String,
    session: ConsoleSession,
    settings: ConsoleSettings,
    store: Arc<dyn MatchStore>,
    video: Arc<dyn VideoSource>,
    notifier: Arc<dyn OperatorNotifier>,
    state: Arc<RwLock<LiveMatchState>>,
    stats: StatsPublisher,
    sync: Arc<MatchSyncHandler>,
    subscription: Mutex<Option<SubscriptionHandle>>,
    clock_ticker: Mutex<Option<Ticker>>,
    possession_ticker: Mutex<Option<Ticker>>,
    // Lets `&self` methods hand tickers a handle back to the console
    this: Weak<MatchConsole>,
}

impl MatchConsole {
    pub fn builder(match_id: impl Into<String>, store: Arc<dyn MatchStore>) -> MatchConsoleBuilder {
        MatchConsoleBuilder::new(match_id.into(), store)
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn session(&self) -> &ConsoleSession {
        &self.session
    }

    pub fn role(&self) -> Role {
        self.session.role()
    }

    // Events

    /// Records an event at the current video position and clock reading.
    ///
    /// A goal also raises the team's stored score. If that score write fails
    /// the stored event is deleted again, so callers see a single operation.
    #[instrument(skip(self), fields(match_id = %self.match_id))]
    pub async fn add_event(
        &self,
        event_type: EventType,
        team: Team,
        player_id: Option<String>,
    ) -> Result<MatchEvent, ConsoleError> {
        self.session.ensure_can_tag()?;
        let video_timestamp = self.video.current_time();

        let (event, score) = {
            let mut state = self.state.write().await;
            if let Some(player_id) = &player_id {
                if !state.roster.contains(player_id) {
                    return Err(ConsoleError::UnknownPlayer(player_id.clone()));
                }
            }

            let event = MatchEvent::record(
                &self.match_id,
                event_type,
                team,
                player_id,
                video_timestamp,
                &state.clock,
            );
            state.timeline.prepend(event.clone());

            let score = event.is_goal().then(|| {
                let previous = state.record.score(team);
                state.record.set_score(team, previous.saturating_add(1));
                (previous, previous.saturating_add(1))
            });

            self.stats.publish(&state.stats_context());
            (event, score)
        };

        if let Err(e) = self.store.insert_event(&event, self.session.origin()).await {
            warn!(event_id = %event.id, error = %e, "Persisting event failed, reverting");
            self.revert_insert(&event, score.map(|(previous, _)| previous))
                .await;
            self.notify_error(format!("Could not save {} event", event.event_type));
            return Err(ConsoleError::PersistFailed(e));
        }

        if let Some((previous, raised)) = score {
            if let Err(e) = self.write_score(team, raised).await {
                warn!(event_id = %event.id, error = %e, "Score update failed, removing goal");
                let compensated = self
                    .store
                    .delete_event(&self.match_id, event.id, self.session.origin())
                    .await;

                match compensated {
                    Ok(()) => self.revert_insert(&event, Some(previous)).await,
                    Err(comp_err) => {
                        error!(
                            event_id = %event.id,
                            error = %comp_err,
                            "Could not remove goal after failed score update"
                        );
                        // The goal stays stored, so it stays local too
                        self.revert_score(team, previous).await;
                    }
                }
                self.notify_error("Could not update the score, goal was not recorded");
                self.check_score().await;
                return Err(ConsoleError::ScoreSyncFailed(e));
            }
            self.check_score().await;
        }

        info!(
            event_id = %event.id,
            event_type = %event.event_type,
            team = %team,
            game_seconds = ?event.game_seconds,
            "Event recorded"
        );
        Ok(event)
    }

    /// Hard-deletes an event. A cancelled confirmation changes nothing and returns None.
    #[instrument(skip(self), fields(match_id = %self.match_id))]
    pub async fn delete_event(
        &self,
        event_id: Uuid,
        confirmation: Confirmation,
    ) -> Result<Option<MatchEvent>, ConsoleError> {
        if confirmation == Confirmation::Cancelled {
            return Ok(None);
        }
        self.session.ensure_can_tag()?;

        let (index, event, score) = {
            let mut state = self.state.write().await;
            let (index, event) = state
                .timeline
                .remove(event_id)
                .ok_or(ConsoleError::UnknownEvent(event_id))?;

            let score = event.is_goal().then(|| {
                let previous = state.record.score(event.team);
                state.record.set_score(event.team, previous.saturating_sub(1));
                (previous, previous.saturating_sub(1))
            });

            self.stats.publish(&state.stats_context());
            (index, event, score)
        };

        if let Err(e) = self
            .store
            .delete_event(&self.match_id, event_id, self.session.origin())
            .await
        {
            warn!(event_id = %event_id, error = %e, "Deleting event failed, restoring");
            self.revert_delete(index, &event, score.map(|(previous, _)| previous))
                .await;
            self.notify_error(format!("Could not delete {} event", event.event_type));
            return Err(ConsoleError::PersistFailed(e));
        }

        if let Some((previous, lowered)) = score {
            if let Err(e) = self.write_score(event.team, lowered).await {
                warn!(event_id = %event_id, error = %e, "Score update failed, restoring goal");
                let compensated = self
                    .store
                    .insert_event(&event, self.session.origin())
                    .await;

                match compensated {
                    Ok(()) => self.revert_delete(index, &event, Some(previous)).await,
                    Err(comp_err) => {
                        error!(
                            event_id = %event_id,
                            error = %comp_err,
                            "Could not restore goal after failed score update"
                        );
                        self.revert_score(event.team, previous).await;
                    }
                }
                self.notify_error("Could not update the score, goal was not deleted");
                self.check_score().await;
                return Err(ConsoleError::ScoreSyncFailed(e));
            }
            self.check_score().await;
        }

        info!(event_id = %event_id, event_type = %event.event_type, "Event deleted");
        Ok(Some(event))
    }

    /// Moves the video to the moment an event was recorded
    pub async fn seek_to_event(&self, event_id: Uuid) -> Result<f64, ConsoleError> {
        let timestamp = self
            .state
            .read()
            .await
            .timeline
            .get(event_id)
            .map(|event| event.video_timestamp)
            .ok_or(ConsoleError::UnknownEvent(event_id))?;

        self.video.seek_to(timestamp);
        Ok(timestamp)
    }

    // Clock

    /// Starts or pauses the clock. Pausing persists the current second.
    #[instrument(skip(self), fields(match_id = %self.match_id))]
    pub async fn toggle_clock(&self) -> Result<ClockToggle, ConsoleError> {
        self.session.ensure_can_tag()?;

        let (toggle, seconds) = {
            let mut state = self.state.write().await;
            let toggle = state.clock.toggle();
            self.stats.publish(&state.stats_context());
            (toggle, state.clock.seconds())
        };

        match toggle {
            ClockToggle::Started => {
                // A display-only follower may still be winding down
                self.stop_ticker(TickerKind::Clock).await;
                self.start_clock_ticker().await;
                self.flush(MatchPatch::clock(seconds, true)).await;
            }
            ClockToggle::Paused { seconds } => {
                self.stop_ticker(TickerKind::Clock).await;
                self.flush(MatchPatch::clock(seconds, false)).await;
            }
        }

        info!(seconds = seconds, toggle = ?toggle, "Clock toggled");
        Ok(toggle)
    }

    /// Advances the clock by one game second if it is running
    pub async fn tick_clock(&self) -> ClockTick {
        let tick = {
            let mut state = self.state.write().await;
            let tick = state.clock.tick(self.settings.clock_flush_every);
            if !tick.is_idle() {
                self.stats.publish(&state.stats_context());
            }
            tick
        };

        if let ClockTick::Flush { seconds } = tick {
            self.flush(MatchPatch::clock_seconds(seconds)).await;
        }
        tick
    }

    /// Advances the clock for display while another client drives it. Never flushes.
    pub async fn follow_clock(&self) -> ClockTick {
        let mut state = self.state.write().await;
        let tick = state.clock.tick(0);
        if !tick.is_idle() {
            self.stats.publish(&state.stats_context());
        }
        tick
    }

    /// Zeroes and pauses the clock. Returns false when the operator cancelled.
    #[instrument(skip(self), fields(match_id = %self.match_id))]
    pub async fn reset_clock(&self, confirmation: Confirmation) -> Result<bool, ConsoleError> {
        if confirmation == Confirmation::Cancelled {
            return Ok(false);
        }
        self.session.ensure_can_tag()?;

        {
            let mut state = self.state.write().await;
            state.clock.reset();
            self.stats.publish(&state.stats_context());
        }
        self.stop_ticker(TickerKind::Clock).await;
        self.flush(MatchPatch::clock(0, false)).await;

        info!("Clock reset");
        Ok(true)
    }

    /// Rewrites the clock's minutes. Input that is not a whole number is ignored.
    #[instrument(skip(self), fields(match_id = %self.match_id))]
    pub async fn edit_minutes(&self, input: &str) -> Result<Option<u32>, ConsoleError> {
        self.session.ensure_can_tag()?;

        let seconds = {
            let mut state = self.state.write().await;
            let seconds = state.clock.edit_minutes(input);
            if seconds.is_some() {
                self.stats.publish(&state.stats_context());
            }
            seconds
        };

        if let Some(seconds) = seconds {
            self.flush(MatchPatch::clock_seconds(seconds)).await;
        }
        Ok(seconds)
    }

    /// Switches half. Entering the second half for the first time records
    /// the half split at the current second; the returned value is that split.
    #[instrument(skip(self), fields(match_id = %self.match_id))]
    pub async fn set_half(&self, half: Half) -> Result<Option<u32>, ConsoleError> {
        self.session.ensure_can_tag()?;

        let split = {
            let mut state = self.state.write().await;
            state.clock.set_half(half);
            let split = match half {
                Half::Second => state.clock.mark_half_split(),
                Half::First => None,
            };
            self.stats.publish(&state.stats_context());
            split
        };

        self.flush(MatchPatch::half(half, split)).await;
        info!(half = half.number(), split = ?split, "Half changed");
        Ok(split)
    }

    // Possession

    /// Credits possession time to one side, or to nobody. Returns whether the side changed.
    #[instrument(skip(self), fields(match_id = %self.match_id))]
    pub async fn set_possession(&self, side: Option<Team>) -> Result<bool, ConsoleError> {
        self.session.ensure_can_tag()?;

        let changed = {
            let mut state = self.state.write().await;
            let changed = state.possession.set_active(side);
            if changed {
                self.stats.publish(&state.stats_context());
            }
            changed
        };

        match side {
            Some(_) => self.start_possession_ticker().await,
            None => self.stop_ticker(TickerKind::Possession).await,
        }
        Ok(changed)
    }

    /// Adds one second to the side in possession, if any
    pub async fn tick_possession(&self) -> PossessionTick {
        let tick = {
            let mut state = self.state.write().await;
            let tick = state.possession.tick(self.settings.possession_flush_every);
            if !tick.is_idle() {
                self.stats.publish(&state.stats_context());
            }
            tick
        };

        if let PossessionTick::Flush { team, seconds } = tick {
            self.flush(MatchPatch::possession(team, seconds)).await;
        }
        tick
    }

    // Views

    pub async fn snapshot(&self) -> MatchSnapshot {
        self.state.read().await.snapshot()
    }

    pub fn stats(&self) -> MatchStats {
        self.stats.current()
    }

    pub fn watch_stats(&self) -> watch::Receiver<MatchStats> {
        self.stats.subscribe()
    }

    pub async fn score_mismatches(&self) -> Vec<ScoreMismatch> {
        let state = self.state.read().await;
        score_mismatches(&state.record, &state.timeline)
    }

    /// Re-reads match, events and roster from the store, as after a lagged subscription
    #[instrument(skip(self), fields(match_id = %self.match_id))]
    pub async fn resync(&self) -> Result<(), ConsoleError> {
        self.sync.resync_from_store(&self.match_id).await?;
        Ok(())
    }

    pub async fn has_active_ticker(&self, kind: TickerKind) -> bool {
        self.ticker_slot(kind)
            .lock()
            .await
            .as_ref()
            .is_some_and(Ticker::is_active)
    }

    /// Stops both timers and releases the change subscription
    #[instrument(skip(self), fields(match_id = %self.match_id))]
    pub async fn teardown(&self) {
        // Subscription first: its handler can still start a follow ticker
        let subscription = self.subscription.lock().await.take();
        if let Some(subscription) = subscription {
            subscription.release().await;
        }
        self.store.unsubscribe(&self.match_id).await;

        self.stop_ticker(TickerKind::Clock).await;
        self.stop_ticker(TickerKind::Possession).await;
        info!("Console torn down");
    }

    // Internals

    async fn write_score(&self, team: Team, score: u32) -> Result<(), StoreError> {
        self.store
            .update_match(
                &self.match_id,
                &MatchPatch::score(team, score),
                self.session.origin(),
            )
            .await
    }

    /// Best-effort write; failures are logged and local state is kept
    async fn flush(&self, patch: MatchPatch) {
        if let Err(e) = self
            .store
            .update_match(&self.match_id, &patch, self.session.origin())
            .await
        {
            warn!(match_id = %self.match_id, patch = ?patch, error = %e, "Flush failed");
        }
    }

    async fn revert_insert(&self, event: &MatchEvent, previous_score: Option<u32>) {
        let mut state = self.state.write().await;
        state.timeline.remove(event.id);
        if let Some(previous) = previous_score {
            state.record.set_score(event.team, previous);
        }
        self.stats.publish(&state.stats_context());
    }

    async fn revert_delete(&self, index: usize, event: &MatchEvent, previous_score: Option<u32>) {
        let mut state = self.state.write().await;
        state.timeline.restore(index, event.clone());
        if let Some(previous) = previous_score {
            state.record.set_score(event.team, previous);
        }
        self.stats.publish(&state.stats_context());
    }

    async fn revert_score(&self, team: Team, previous: u32) {
        let mut state = self.state.write().await;
        state.record.set_score(team, previous);
        self.stats.publish(&state.stats_context());
    }

    async fn check_score(&self) {
        for mismatch in self.score_mismatches().await {
            error!(
                match_id = %self.match_id,
                team = %mismatch.team,
                stored = mismatch.stored,
                live = mismatch.live,
                "Stored score disagrees with goal events"
            );
        }
    }

    fn notify_error(&self, message: impl Into<String>) {
        self.notifier.notify(&self.match_id, Notice::error(message));
    }

    fn ticker_slot(&self, kind: TickerKind) -> &Mutex<Option<Ticker>> {
        match kind {
            TickerKind::Clock => &self.clock_ticker,
            TickerKind::Possession => &self.possession_ticker,
        }
    }

    async fn start_clock_ticker(&self) {
        let console = self.this.clone();
        self.start_ticker(TickerKind::Clock, move || {
            let console = console.clone();
            async move {
                match console.upgrade() {
                    Some(console) => !console.tick_clock().await.is_idle(),
                    None => false,
                }
            }
        })
        .await;
    }

    async fn start_follow_ticker(&self) {
        let console = self.this.clone();
        self.start_ticker(TickerKind::Clock, move || {
            let console = console.clone();
            async move {
                match console.upgrade() {
                    Some(console) => !console.follow_clock().await.is_idle(),
                    None => false,
                }
            }
        })
        .await;
    }

    async fn start_possession_ticker(&self) {
        let console = self.this.clone();
        self.start_ticker(TickerKind::Possession, move || {
            let console = console.clone();
            async move {
                match console.upgrade() {
                    Some(console) => !console.tick_possession().await.is_idle(),
                    None => false,
                }
            }
        })
        .await;
    }

    /// Spawns a ticker unless one of this kind is already running
    async fn start_ticker<F, Fut>(&self, kind: TickerKind, step: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = bool> + Send + 'static,
    {
        let mut slot = self.ticker_slot(kind).lock().await;
        if slot.as_ref().is_some_and(Ticker::is_active) {
            return;
        }
        *slot = Some(Ticker::spawn(kind, &self.match_id, self.settings.tick, step));
    }

    async fn stop_ticker(&self, kind: TickerKind) {
        if let Some(ticker) = self.ticker_slot(kind).lock().await.take() {
            ticker.stop();
        }
    }
}

#[async_trait]
impl RemoteClockListener for MatchConsole {
    /// Keeps the display moving between the driving client's flushes
    async fn remote_clock_started(&self) {
        self.start_follow_ticker().await;
    }
}

pub struct MatchConsoleBuilder {
    match_id: String,
    store: Arc<dyn MatchStore>,
    session: ConsoleSession,
    settings: ConsoleSettings,
    video: Arc<dyn VideoSource>,
    notifier: Arc<dyn OperatorNotifier>,
    strategy: Arc<dyn ReconciliationStrategy>,
    engine: Arc<StatsEngine>,
}

impl MatchConsoleBuilder {
    fn new(match_id: String, store: Arc<dyn MatchStore>) -> Self {
        Self {
            match_id,
            store,
            session: ConsoleSession::new(Role::default()),
            settings: ConsoleSettings::default(),
            video: Arc::new(SharedPlayhead::new()),
            notifier: Arc::new(TracingNotifier),
            strategy: Arc::new(LastWriterWins),
            engine: Arc::new(StatsEngine::default()),
        }
    }

    pub fn with_session(mut self, session: ConsoleSession) -> Self {
        self.session = session;
        self
    }

    pub fn with_settings(mut self, settings: ConsoleSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_video(mut self, video: Arc<dyn VideoSource>) -> Self {
        self.video = video;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn OperatorNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn ReconciliationStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_engine(mut self, engine: Arc<StatsEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Loads the match from the store and starts following its changes
    #[instrument(skip(self), fields(match_id = %self.match_id))]
    pub async fn load(self) -> Result<Arc<MatchConsole>, ConsoleError> {
        // Subscribe first so nothing written during the load is missed
        let receiver = self.store.subscribe(&self.match_id).await;

        let record = self
            .store
            .fetch_match(&self.match_id)
            .await?
            .ok_or_else(|| ConsoleError::UnknownMatch(self.match_id.clone()))?;
        let events = self.store.fetch_events(&self.match_id).await?;
        let players = self.store.fetch_players(&self.match_id).await?;

        let state = LiveMatchState::from_loaded(record, events, players);
        let stats = StatsPublisher::new(self.engine);
        stats.publish(&state.stats_context());
        let event_count = state.timeline.len();
        let running = state.clock.running();
        let state = Arc::new(RwLock::new(state));

        info!(
            events = event_count,
            running = running,
            role = %self.session.role(),
            origin = %self.session.origin(),
            "Console loaded"
        );

        let strategy = self.strategy;
        let console = Arc::new_cyclic(|this: &Weak<MatchConsole>| {
            let listener: Weak<dyn RemoteClockListener> = this.clone();
            let sync = Arc::new(
                MatchSyncHandler::new(
                    state.clone(),
                    strategy,
                    self.session.origin(),
                    stats.clone(),
                    self.store.clone(),
                )
                .with_clock_listener(listener),
            );
            let subscription =
                MatchSubscription::new(self.match_id.clone(), sync.clone(), receiver).start();

            MatchConsole {
                match_id: self.match_id,
                session: self.session,
                settings: self.settings,
                store: self.store,
                video: self.video,
                notifier: self.notifier,
                state,
                stats,
                sync,
                subscription: Mutex::new(Some(subscription)),
                clock_ticker: Mutex::new(None),
                possession_ticker: Mutex::new(None),
                this: this.clone(),
            }
        });

        // Loaded mid-match: show the clock moving until its driver pauses it
        if running {
            console.start_follow_ticker().await;
        }
        Ok(console)
    }
}
