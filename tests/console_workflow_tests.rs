use matchtagger::{
    console::TickerKind,
    stats::ScoreMismatch,
    Confirmation, ConsoleError, EventType, GameClock, Half, MatchChange, MatchEvent, MatchPatch,
    MatchRecord, MatchStore, Role, Team,
};
use tokio::time::{sleep, timeout, Duration};

mod utils;

use utils::*;

// ============================================================================
// Event timeline and goal/score pairing
// ============================================================================

#[tokio::test]
async fn test_goal_then_delete_end_to_end() {
    let setup = TestSetupBuilder::new().build().await;
    setup.console.edit_minutes("10").await.unwrap();

    let goal = setup.record(EventType::Goal, Team::Home).await;
    assert_eq!(goal.game_seconds, Some(600));
    assert_eq!(goal.match_minute, Some(11));
    TimelineAssertion::for_console(&setup.console)
        .contains(goal.id)
        .await
        .score(Team::Home, 1);
    assert_eq!(setup.store.stored_match(TEST_MATCH_ID).await.home_score, 1);

    let deleted = setup.delete(&goal).await.unwrap();
    assert_eq!(deleted.map(|e| e.id), Some(goal.id));

    setup.settle().await;
    TimelineAssertion::for_console(&setup.console)
        .lacks(goal.id)
        .await
        .score(Team::Home, 0);
    assert_eq!(setup.store.stored_match(TEST_MATCH_ID).await.home_score, 0);
    assert!(setup.console.score_mismatches().await.is_empty());
}

#[tokio::test]
async fn test_deleting_goal_floors_stored_score_at_zero() {
    let setup = TestSetupBuilder::new().build().await;

    // A goal row whose score increment never landed
    let legacy = MatchEvent::record(
        TEST_MATCH_ID,
        EventType::Goal,
        Team::Away,
        None,
        0.0,
        &GameClock::new(),
    );
    setup.store.inner().insert_event(&legacy, "importer").await.unwrap();
    setup.settle().await;

    TimelineAssertion::for_console(&setup.console).score(Team::Away, 1);
    setup.delete(&legacy).await.unwrap();

    TimelineAssertion::for_console(&setup.console).score(Team::Away, 0);
    assert_eq!(setup.console.snapshot().await.away_score, 0);
    assert_eq!(setup.store.stored_match(TEST_MATCH_ID).await.away_score, 0);
}

#[tokio::test]
async fn test_failed_insert_is_rolled_back_and_reported() {
    let setup = TestSetupBuilder::new().build().await;
    setup.store.fail_inserts(true);

    let result = setup
        .console
        .add_event(EventType::Goal, Team::Home, None)
        .await;

    assert!(matches!(result, Err(ConsoleError::PersistFailed(_))));
    TimelineAssertion::for_console(&setup.console)
        .has_len(0)
        .await
        .score(Team::Home, 0);
    assert_eq!(setup.console.snapshot().await.home_score, 0);
    assert_eq!(setup.notifier.errors().len(), 1);
    assert!(setup.store.stored_event_ids(TEST_MATCH_ID).await.is_empty());
}

#[tokio::test]
async fn test_failed_delete_restores_event_in_place() {
    let setup = TestSetupBuilder::new().build().await;
    let first = setup.record(EventType::Corner, Team::Home).await;
    let second = setup.record(EventType::Offside, Team::Away).await;
    let before: Vec<_> = setup.console.snapshot().await.events;

    setup.store.fail_deletes(true);
    let result = setup.delete(&first).await;

    assert!(matches!(result, Err(ConsoleError::PersistFailed(_))));
    let after = setup.console.snapshot().await.events;
    assert_eq!(after, before);
    assert_eq!(after[0].id, second.id);
    assert_eq!(setup.notifier.errors().len(), 1);
}

#[tokio::test]
async fn test_score_failure_removes_inserted_goal() {
    let setup = TestSetupBuilder::new().build().await;
    setup.store.fail_score_updates(true);

    let result = setup
        .console
        .add_event(EventType::Goal, Team::Away, None)
        .await;
    assert!(matches!(result, Err(ConsoleError::ScoreSyncFailed(_))));

    setup.settle().await;
    TimelineAssertion::for_console(&setup.console)
        .has_len(0)
        .await
        .score(Team::Away, 0);
    assert!(setup.store.stored_event_ids(TEST_MATCH_ID).await.is_empty());
    assert_eq!(setup.store.stored_match(TEST_MATCH_ID).await.away_score, 0);
    assert_eq!(setup.notifier.errors().len(), 1);
}

#[tokio::test]
async fn test_score_failure_on_delete_reinserts_goal() {
    let setup = TestSetupBuilder::new().build().await;
    let goal = setup.record(EventType::Goal, Team::Home).await;

    setup.store.fail_score_updates(true);
    let result = setup.delete(&goal).await;
    assert!(matches!(result, Err(ConsoleError::ScoreSyncFailed(_))));

    setup.settle().await;
    TimelineAssertion::for_console(&setup.console)
        .contains(goal.id)
        .await
        .score(Team::Home, 1);
    assert_eq!(setup.console.snapshot().await.home_score, 1);
    assert_eq!(
        setup.store.stored_event_ids(TEST_MATCH_ID).await,
        vec![goal.id]
    );
    assert_eq!(setup.store.stored_match(TEST_MATCH_ID).await.home_score, 1);
}

#[tokio::test]
async fn test_failed_compensation_leaves_detectable_mismatch() {
    let setup = TestSetupBuilder::new().build().await;
    setup.store.fail_score_updates(true);
    setup.store.fail_deletes(true);

    let result = setup
        .console
        .add_event(EventType::Goal, Team::Home, None)
        .await;
    assert!(matches!(result, Err(ConsoleError::ScoreSyncFailed(_))));

    setup.settle().await;
    // The goal could not be removed from the store, so it stays visible
    assert_eq!(setup.store.stored_event_ids(TEST_MATCH_ID).await.len(), 1);
    assert_eq!(
        setup.console.score_mismatches().await,
        vec![ScoreMismatch {
            team: Team::Home,
            stored: 0,
            live: 1
        }]
    );
}

#[tokio::test]
async fn test_timeline_size_tracks_successful_writes() {
    let setup = TestSetupBuilder::new().build().await;
    let mut kept: Vec<MatchEvent> = Vec::new();
    let mut inserted = 0;
    let mut deleted = 0;

    for step in 0..40 {
        setup.store.fail_inserts(step % 7 == 3);
        setup.store.fail_deletes(step % 6 == 5);

        if step % 3 == 2 && !kept.is_empty() {
            let oldest: MatchEvent = kept[0].clone();
            if setup.delete(&oldest).await.is_ok() {
                kept.remove(0);
                deleted += 1;
            }
        } else {
            let event_type = if step % 2 == 0 {
                EventType::PassSuccess
            } else {
                EventType::BallRecovery
            };
            if let Ok(event) = setup.console.add_event(event_type, Team::Home, None).await {
                kept.push(event);
                inserted += 1;
            }
        }
    }

    setup.settle().await;
    let len = TimelineAssertion::for_console(&setup.console)
        .has_unique_ids()
        .await;
    assert_eq!(len, inserted - deleted);
    assert_eq!(
        setup.store.stored_event_ids(TEST_MATCH_ID).await.len(),
        len
    );
}

#[tokio::test]
async fn test_cancelled_delete_is_a_no_op() {
    let setup = TestSetupBuilder::new().build().await;
    let goal = setup.record(EventType::Goal, Team::Home).await;

    let result = setup
        .console
        .delete_event(goal.id, Confirmation::Cancelled)
        .await
        .unwrap();

    assert!(result.is_none());
    TimelineAssertion::for_console(&setup.console)
        .contains(goal.id)
        .await
        .score(Team::Home, 1);
}

// ============================================================================
// Roster
// ============================================================================

#[tokio::test]
async fn test_substitutions_drive_on_pitch_and_player_lines() {
    let setup = TestSetupBuilder::new().with_home_squad().build().await;

    setup
        .record_for(EventType::SubstitutionOut, Team::Home, "striker")
        .await;
    setup
        .record_for(EventType::SubstitutionIn, Team::Home, "winger")
        .await;
    setup.record_for(EventType::Goal, Team::Home, "winger").await;

    let snapshot = setup.console.snapshot().await;
    let on_pitch = |id: &str| {
        snapshot
            .players
            .iter()
            .find(|p| p.player.id == id)
            .map(|p| p.on_pitch)
    };
    assert_eq!(on_pitch("keeper"), Some(true));
    assert_eq!(on_pitch("striker"), Some(false));
    assert_eq!(on_pitch("winger"), Some(true));

    let stats = setup.console.stats();
    assert_eq!(stats.players["winger"].counts.goals, 1);
    assert_eq!(stats.players["striker"].counts.substitutions_out, 1);
}

#[tokio::test]
async fn test_unknown_player_is_rejected() {
    let setup = TestSetupBuilder::new().with_home_squad().build().await;

    let result = setup
        .console
        .add_event(EventType::YellowCard, Team::Away, Some("nobody".into()))
        .await;

    assert!(matches!(result, Err(ConsoleError::UnknownPlayer(_))));
    assert!(setup.store.stored_event_ids(TEST_MATCH_ID).await.is_empty());
}

// ============================================================================
// Clock, half split and possession timers
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_running_clock_flushes_every_tenth_second() {
    let setup = TestSetupBuilder::new().build().await;
    setup.console.toggle_clock().await.unwrap();

    sleep(Duration::from_millis(9_500)).await;
    assert_eq!(setup.console.snapshot().await.clock.seconds, 9);
    assert_eq!(setup.store.stored_match(TEST_MATCH_ID).await.clock_seconds, 0);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(setup.console.snapshot().await.clock.seconds, 10);
    assert_eq!(setup.store.stored_match(TEST_MATCH_ID).await.clock_seconds, 10);

    sleep(Duration::from_secs(2)).await;
    setup.console.toggle_clock().await.unwrap();
    let stored = setup.store.stored_match(TEST_MATCH_ID).await;
    assert_eq!(stored.clock_seconds, 12);
    assert!(!stored.clock_running);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(setup.console.snapshot().await.clock.seconds, 12);
    assert!(!setup.console.has_active_ticker(TickerKind::Clock).await);
}

#[tokio::test(start_paused = true)]
async fn test_time_since_last_shot_follows_clock() {
    let setup = TestSetupBuilder::new().build().await;
    assert_eq!(setup.console.stats().home.seconds_since_last_shot, 0);

    setup.console.toggle_clock().await.unwrap();
    sleep(Duration::from_millis(30_500)).await;
    setup.record(EventType::ShotOnTarget, Team::Home).await;

    sleep(Duration::from_secs(70)).await;
    let stats = setup.console.stats();
    assert_eq!(stats.clock_seconds, 100);
    assert_eq!(stats.home.seconds_since_last_shot, 70);
    assert_eq!(stats.away.seconds_since_last_shot, 100);
}

#[tokio::test(start_paused = true)]
async fn test_reset_requires_confirmation_and_stops_clock() {
    let setup = TestSetupBuilder::new().build().await;
    setup.console.toggle_clock().await.unwrap();
    sleep(Duration::from_millis(4_500)).await;

    assert!(!setup.console.reset_clock(Confirmation::Cancelled).await.unwrap());
    assert_eq!(setup.console.snapshot().await.clock.seconds, 4);

    assert!(setup.console.reset_clock(Confirmation::Confirmed).await.unwrap());
    sleep(Duration::from_secs(3)).await;
    let clock = setup.console.snapshot().await.clock;
    assert_eq!(clock.seconds, 0);
    assert!(!clock.running);
    assert_eq!(setup.store.stored_match(TEST_MATCH_ID).await.clock_seconds, 0);
}

#[tokio::test]
async fn test_half_split_is_recorded_on_entering_second_half() {
    let setup = TestSetupBuilder::new().build().await;
    setup.console.edit_minutes("45").await.unwrap();

    assert_eq!(setup.console.set_half(Half::Second).await.unwrap(), Some(2700));
    setup.console.edit_minutes("46").await.unwrap();

    let clock = setup.console.snapshot().await.clock;
    assert_eq!(clock.half_display, "01:00");
    assert_eq!(clock.display, "46:00");

    // Going back to the first half caps its display at the split
    setup.console.set_half(Half::First).await.unwrap();
    assert_eq!(setup.console.snapshot().await.clock.half_display, "45:00");

    let stored = setup.store.stored_match(TEST_MATCH_ID).await;
    assert_eq!(stored.half_split_seconds, Some(2700));
}

#[tokio::test(start_paused = true)]
async fn test_possession_buckets_accumulate_exclusively() {
    let setup = TestSetupBuilder::new().build().await;

    setup.console.set_possession(Some(Team::Home)).await.unwrap();
    sleep(Duration::from_millis(5_500)).await;
    setup.console.set_possession(None).await.unwrap();
    sleep(Duration::from_secs(10)).await;
    setup.console.set_possession(Some(Team::Away)).await.unwrap();
    sleep(Duration::from_millis(3_500)).await;
    setup.console.set_possession(None).await.unwrap();

    let possession = setup.console.snapshot().await.possession;
    assert_eq!((possession.home, possession.away), (5, 3));
    assert_eq!(possession.active, None);

    let stored = setup.store.stored_match(TEST_MATCH_ID).await;
    assert_eq!((stored.possession_home, stored.possession_away), (5, 0));

    let stats = setup.console.stats();
    assert_eq!((stats.home.possession_pct, stats.away.possession_pct), (63, 38));
}

#[tokio::test(start_paused = true)]
async fn test_switching_sides_keeps_one_timer() {
    let setup = TestSetupBuilder::new().build().await;

    setup.console.set_possession(Some(Team::Home)).await.unwrap();
    sleep(Duration::from_millis(2_500)).await;
    setup.console.set_possession(Some(Team::Away)).await.unwrap();
    sleep(Duration::from_secs(2)).await;

    let possession = setup.console.snapshot().await.possession;
    assert_eq!((possession.home, possession.away), (2, 2));
    assert!(setup.console.has_active_ticker(TickerKind::Possession).await);
}

#[tokio::test(start_paused = true)]
async fn test_failed_clock_flush_keeps_local_time() {
    let setup = TestSetupBuilder::new().build().await;
    setup.store.fail_clock_updates(true);

    setup.console.toggle_clock().await.unwrap();
    sleep(Duration::from_millis(10_500)).await;

    assert_eq!(setup.console.snapshot().await.clock.seconds, 10);
    assert_eq!(setup.store.stored_match(TEST_MATCH_ID).await.clock_seconds, 0);
    assert!(setup.notifier.errors().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_remote_pause_ends_local_ticker() {
    let setup = TestSetupBuilder::new().build().await;
    setup.console.toggle_clock().await.unwrap();
    sleep(Duration::from_millis(3_500)).await;

    setup
        .store
        .inner()
        .update_match(TEST_MATCH_ID, &MatchPatch::clock(40, false), "other-console")
        .await
        .unwrap();
    sleep(Duration::from_secs(2)).await;

    let clock = setup.console.snapshot().await.clock;
    assert_eq!(clock.seconds, 40);
    assert!(!clock.running);
    assert!(!setup.console.has_active_ticker(TickerKind::Clock).await);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_stops_timers() {
    let setup = TestSetupBuilder::new().build().await;
    setup.console.toggle_clock().await.unwrap();
    setup.console.set_possession(Some(Team::Home)).await.unwrap();

    setup.console.teardown().await;
    sleep(Duration::from_secs(5)).await;

    let snapshot = setup.console.snapshot().await;
    assert_eq!(snapshot.clock.seconds, 0);
    assert_eq!(snapshot.possession.home, 0);
}

#[tokio::test(start_paused = true)]
async fn test_load_resumes_persisted_values() {
    let mut record = MatchRecord::new(TEST_MATCH_ID, "Rovers", "United");
    record.clock_seconds = 2800;
    record.clock_running = true;
    record.half = Half::Second;
    record.half_split_seconds = Some(2700);
    record.possession_home = 30;
    record.possession_away = 20;
    let setup = TestSetupBuilder::new().with_record(record).build().await;

    let snapshot = setup.console.snapshot().await;
    assert_eq!(snapshot.clock.seconds, 2800);
    assert!(snapshot.clock.running);
    assert_eq!(snapshot.clock.half_display, "01:40");
    assert_eq!((snapshot.possession.home, snapshot.possession.away), (30, 20));
    assert_eq!(snapshot.possession.active, None);

    // The clock keeps moving on screen, but only its driver writes it
    sleep(Duration::from_millis(12_500)).await;
    assert_eq!(setup.console.snapshot().await.clock.seconds, 2812);
    assert_eq!(setup.store.stored_match(TEST_MATCH_ID).await.clock_seconds, 2800);
    assert_eq!(setup.store.update_calls(), 0);
}

// ============================================================================
// Replication between consoles
// ============================================================================

#[tokio::test]
async fn test_second_console_follows_changes() {
    let setup = TestSetupBuilder::new().build().await;
    let viewer = setup.second_console(Role::Coach).await;
    let mut viewer_stats = viewer.watch_stats();

    let goal = setup.record(EventType::Goal, Team::Away).await;
    timeout(Duration::from_secs(1), viewer_stats.changed())
        .await
        .expect("viewer stats should update")
        .unwrap();
    setup.settle().await;

    TimelineAssertion::for_console(&viewer)
        .contains(goal.id)
        .await
        .score(Team::Away, 1);
    assert_eq!(viewer.snapshot().await.away_score, 1);

    setup.console.edit_minutes("30").await.unwrap();
    setup.console.set_half(Half::Second).await.unwrap();
    setup.settle().await;
    let clock = viewer.snapshot().await.clock;
    assert_eq!(clock.seconds, 1800);
    assert_eq!(clock.half, Half::Second);
    assert_eq!(clock.half_split_seconds, Some(1800));

    setup.delete(&goal).await.unwrap();
    setup.settle().await;
    TimelineAssertion::for_console(&viewer)
        .lacks(goal.id)
        .await
        .score(Team::Away, 0);
}

#[tokio::test(start_paused = true)]
async fn test_second_console_follows_a_running_clock() {
    let setup = TestSetupBuilder::new().build().await;
    let viewer = setup.second_console(Role::Coach).await;

    setup.console.toggle_clock().await.unwrap();
    sleep(Duration::from_millis(3_500)).await;

    let clock = viewer.snapshot().await.clock;
    assert!(clock.running);
    assert_eq!(clock.seconds, 3);
    assert!(viewer.has_active_ticker(TickerKind::Clock).await);
    assert_eq!(viewer.stats().away.seconds_since_last_shot, 3);

    setup.console.toggle_clock().await.unwrap();
    sleep(Duration::from_secs(2)).await;

    let clock = viewer.snapshot().await.clock;
    assert!(!clock.running);
    assert_eq!(clock.seconds, 3);
    assert!(!viewer.has_active_ticker(TickerKind::Clock).await);
    // One start flush and one pause flush, both from the driver
    assert_eq!(setup.store.update_calls(), 2);
}

#[tokio::test]
async fn test_lagging_console_resyncs_from_store() {
    let setup = TestSetupBuilder::new().with_channel_capacity(2).build().await;
    let viewer = setup.second_console(Role::Coach).await;

    for _ in 0..5 {
        setup.record(EventType::Corner, Team::Home).await;
    }
    setup.record(EventType::Goal, Team::Away).await;
    setup.settle().await;

    let stored = setup.store.stored_event_ids(TEST_MATCH_ID).await;
    assert_eq!(stored.len(), 6);
    for console in [&setup.console, &viewer] {
        let snapshot = console.snapshot().await;
        let ids: Vec<_> = snapshot.events.iter().map(|e| e.id).collect();
        assert_eq!(ids, stored);
        assert_eq!(snapshot.away_score, 1);
        assert!(console.score_mismatches().await.is_empty());
    }
    assert_eq!(viewer.stats().away.score(), 1);
}

#[tokio::test]
async fn test_released_console_drops_match_channel() {
    let setup = TestSetupBuilder::new().build().await;
    let viewer = setup.second_console(Role::Coach).await;
    assert_eq!(setup.store.inner().bus().channel_count().await, 1);

    viewer.teardown().await;
    assert_eq!(setup.store.inner().bus().channel_count().await, 1);

    setup.console.teardown().await;
    assert_eq!(setup.store.inner().bus().channel_count().await, 0);
}

#[tokio::test]
async fn test_viewer_roles_cannot_mutate() {
    let setup = TestSetupBuilder::new().build().await;
    let viewer = setup.second_console(Role::Spectator).await;

    assert!(matches!(
        viewer.add_event(EventType::Corner, Team::Home, None).await,
        Err(ConsoleError::NotPermitted(Role::Spectator))
    ));
    assert!(matches!(
        viewer.toggle_clock().await,
        Err(ConsoleError::NotPermitted(_))
    ));
    assert!(matches!(
        viewer.set_possession(Some(Team::Home)).await,
        Err(ConsoleError::NotPermitted(_))
    ));
    assert_eq!(setup.store.update_calls(), 0);
}

#[tokio::test]
async fn test_duplicate_notifications_are_merged_once() {
    let setup = TestSetupBuilder::new().build().await;
    let viewer = setup.second_console(Role::Coach).await;
    let event = setup.record(EventType::FoulWon, Team::Home).await;
    setup.settle().await;

    // Replay the same insert as a second delivery would
    setup
        .store
        .inner()
        .bus()
        .emit(MatchChange::EventInserted {
            origin: "replay".to_string(),
            event: event.clone(),
        })
        .await;
    setup.settle().await;

    TimelineAssertion::for_console(&viewer)
        .has_len(1)
        .await
        .contains(event.id)
        .await;
}
