use async_trait::async_trait;
use sqlx::postgres::{PgListener, PgPool, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::{MatchPatch, MatchRecord, MatchStore, StoreError};
use crate::clock::Half;
use crate::event::{EventBus, MatchChange};
use crate::roster::Player;
use crate::timeline::{EventType, MatchEvent, Team};

/// NOTIFY channel carrying serialized MatchChange payloads
pub const CHANGE_CHANNEL: &str = "match_changes";

const MATCH_COLUMNS: &str = "id, home_team, away_team, home_score, away_score, clock_seconds, \
     clock_running, half, half_split_seconds, possession_home, possession_away";

const EVENT_COLUMNS: &str = "id, match_id, type, team, player_id, video_timestamp, match_minute, \
     game_seconds, half, created_at";

/// PostgreSQL implementation of the shared store
///
/// Expected tables:
/// - `matches` (id TEXT PK, home_team, away_team, home_score INT, away_score INT,
///   clock_seconds INT, clock_running BOOL, half SMALLINT, half_split_seconds INT NULL,
///   possession_home INT, possession_away INT)
/// - `players` (id TEXT PK, match_id TEXT, team TEXT, jersey_number SMALLINT, name TEXT, starter BOOL)
/// - `match_events` (id UUID PK, match_id TEXT, type TEXT, team TEXT, player_id TEXT NULL,
///   video_timestamp DOUBLE PRECISION, match_minute INT NULL, game_seconds INT NULL,
///   half SMALLINT NULL, created_at TIMESTAMPTZ)
///
/// Writes publish their change with `pg_notify`; `spawn_listener` forwards
/// notifications from every process into the local bus.
pub struct PostgresMatchStore {
    pool: PgPool,
    bus: EventBus,
}

impl PostgresMatchStore {
    pub fn new(pool: PgPool, bus: EventBus) -> Self {
        Self { pool, bus }
    }

    /// Listens on the change channel and re-emits each change on the local bus
    pub async fn spawn_listener(&self) -> Result<JoinHandle<()>, StoreError> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        info!(channel = CHANGE_CHANNEL, "Listening for match changes");

        let bus = self.bus.clone();
        Ok(tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        match serde_json::from_str::<MatchChange>(notification.payload()) {
                            Ok(change) => bus.emit(change).await,
                            Err(e) => {
                                warn!(error = %e, "Discarding malformed change notification")
                            }
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Change listener failed");
                        break;
                    }
                }
            }
        }))
    }

    /// Best-effort: the write already succeeded, a lost notification only delays viewers
    async fn publish(&self, change: &MatchChange) {
        let payload = match serde_json::to_string(change) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to serialize match change");
                return;
            }
        };

        if let Err(e) = sqlx::query("SELECT pg_notify($1, $2)")
            .bind(CHANGE_CHANNEL)
            .bind(payload)
            .execute(&self.pool)
            .await
        {
            warn!(
                error = %e,
                match_id = %change.match_id(),
                "Failed to publish match change"
            );
        }
    }
}

fn non_negative(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn column(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn half_from_column(value: i16) -> Result<Half, StoreError> {
    Half::from_number(i64::from(value)).map_err(|e| StoreError::Malformed(e.to_string()))
}

fn record_from_row(row: &PgRow) -> Result<MatchRecord, StoreError> {
    Ok(MatchRecord {
        id: row.try_get("id")?,
        home_team: row.try_get("home_team")?,
        away_team: row.try_get("away_team")?,
        home_score: non_negative(row.try_get("home_score")?),
        away_score: non_negative(row.try_get("away_score")?),
        clock_seconds: non_negative(row.try_get("clock_seconds")?),
        clock_running: row.try_get("clock_running")?,
        half: half_from_column(row.try_get("half")?)?,
        half_split_seconds: row
            .try_get::<Option<i32>, _>("half_split_seconds")?
            .map(non_negative),
        possession_home: non_negative(row.try_get("possession_home")?),
        possession_away: non_negative(row.try_get("possession_away")?),
    })
}

fn event_from_row(row: &PgRow) -> Result<MatchEvent, StoreError> {
    let event_type: String = row.try_get("type")?;
    let team: String = row.try_get("team")?;
    let half: Option<i16> = row.try_get("half")?;

    Ok(MatchEvent {
        id: row.try_get("id")?,
        match_id: row.try_get("match_id")?,
        event_type: event_type
            .parse::<EventType>()
            .map_err(|e| StoreError::Malformed(format!("event type {}: {}", event_type, e)))?,
        team: team
            .parse::<Team>()
            .map_err(|e| StoreError::Malformed(format!("team {}: {}", team, e)))?,
        player_id: row.try_get("player_id")?,
        video_timestamp: row.try_get("video_timestamp")?,
        match_minute: row
            .try_get::<Option<i32>, _>("match_minute")?
            .map(non_negative),
        game_seconds: row
            .try_get::<Option<i32>, _>("game_seconds")?
            .map(non_negative),
        half: half.map(half_from_column).transpose()?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl MatchStore for PostgresMatchStore {
    #[instrument(skip(self))]
    async fn fetch_match(&self, match_id: &str) -> Result<Option<MatchRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {} FROM matches WHERE id = $1", MATCH_COLUMNS))
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, match_id = %match_id, "Failed to fetch match");
                StoreError::from(e)
            })?;

        row.as_ref().map(record_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn fetch_events(&self, match_id: &str) -> Result<Vec<MatchEvent>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM match_events WHERE match_id = $1 ORDER BY created_at DESC",
            EVENT_COLUMNS
        ))
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(match_id = %match_id, count = rows.len(), "Fetched match events");
        rows.iter().map(event_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn fetch_players(&self, match_id: &str) -> Result<Vec<Player>, StoreError> {
        let players = sqlx::query_as::<_, Player>(
            "SELECT id, match_id, team, jersey_number, name, starter FROM players \
             WHERE match_id = $1 ORDER BY jersey_number",
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(players)
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn insert_event(&self, event: &MatchEvent, origin: &str) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO match_events ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            EVENT_COLUMNS
        ))
        .bind(event.id)
        .bind(&event.match_id)
        .bind(event.event_type.as_ref())
        .bind(event.team.as_ref())
        .bind(&event.player_id)
        .bind(event.video_timestamp)
        .bind(event.match_minute.map(column))
        .bind(event.game_seconds.map(column))
        .bind(event.half.map(|h| i16::from(h.number())))
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict(format!("Event already exists: {}", event.id))
            }
            other => {
                warn!(error = %other, "Failed to insert match event");
                StoreError::from(other)
            }
        })?;

        self.publish(&MatchChange::EventInserted {
            origin: origin.to_string(),
            event: event.clone(),
        })
        .await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_event(
        &self,
        match_id: &str,
        event_id: Uuid,
        origin: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM match_events WHERE id = $1 AND match_id = $2")
            .bind(event_id)
            .bind(match_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!(match_id = %match_id, event_id = %event_id, "Delete of absent event");
            return Ok(());
        }

        self.publish(&MatchChange::EventDeleted {
            origin: origin.to_string(),
            match_id: match_id.to_string(),
            event_id,
        })
        .await;
        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn update_match(
        &self,
        match_id: &str,
        patch: &MatchPatch,
        origin: &str,
    ) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE matches SET ");
        {
            let mut fields = builder.separated(", ");
            let int_fields = [
                ("home_score = ", patch.home_score),
                ("away_score = ", patch.away_score),
                ("clock_seconds = ", patch.clock_seconds),
                ("half_split_seconds = ", patch.half_split_seconds),
                ("possession_home = ", patch.possession_home),
                ("possession_away = ", patch.possession_away),
            ];
            for (name, value) in int_fields {
                if let Some(value) = value {
                    fields.push(name);
                    fields.push_bind_unseparated(column(value));
                }
            }
            if let Some(running) = patch.clock_running {
                fields.push("clock_running = ");
                fields.push_bind_unseparated(running);
            }
            if let Some(half) = patch.half {
                fields.push("half = ");
                fields.push_bind_unseparated(i16::from(half.number()));
            }
        }
        builder.push(" WHERE id = ");
        builder.push_bind(match_id.to_string());

        let result = builder.build().execute(&self.pool).await.map_err(|e| {
            warn!(error = %e, match_id = %match_id, "Failed to update match");
            StoreError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Match not found: {}", match_id)));
        }

        self.publish(&MatchChange::MatchUpdated {
            origin: origin.to_string(),
            match_id: match_id.to_string(),
            patch: patch.clone(),
        })
        .await;
        Ok(())
    }

    async fn subscribe(&self, match_id: &str) -> broadcast::Receiver<MatchChange> {
        self.bus.subscribe_to_match(match_id).await
    }

    async fn unsubscribe(&self, match_id: &str) {
        self.bus.prune(match_id).await;
    }
}
