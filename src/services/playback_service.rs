use chrono::Utc;
use futures::try_join;
use surrealdb::{engine::any::Any, sql::Datetime, Surreal};

use crate::{
    error::{Error, Result},
    helpers::{
        song_helpers::get_song,
        thing_helpers::{
            create_song_thing, create_user_thing, generate_object_id, thing_key,
            validate_object_id,
        },
    },
    models::{
        database_helpers::DurationTotals,
        playback::{
            PlaybackBucket, PlaybackEvent, PlaybackRecord, PlaybackStats, RecordPlaybackRequest,
        },
    },
    services::stats_tracker::StatsTracker,
};

const LIVE_TABLE: &str = "playback";
const HISTORY_TABLE: &str = "history";

pub struct PlaybackService;

impl PlaybackService {
    /// Persists one play and hands it to the stats tracker.
    ///
    /// Non-positive durations are dropped before anything touches the store
    /// and come back as `None`. The record stays persisted if tracking fails.
    pub async fn create_playback_log(
        db: &Surreal<Any>,
        tracker: &dyn StatsTracker,
        user_id: &str,
        request: RecordPlaybackRequest,
    ) -> Result<Option<PlaybackRecord>> {
        if request.duration.is_nan() || request.duration <= 0.0 {
            tracing::debug!(
                duration = request.duration,
                "Skipping playback log with non-positive duration"
            );
            return Ok(None);
        }

        let user_key = validate_object_id(user_id)?;
        let song_key = validate_object_id(&request.song_id)?;

        let song = get_song(db, song_key).await?;

        let record = PlaybackRecord {
            id: None,
            user: create_user_thing(user_key),
            song: create_song_thing(song_key),
            artist: song.artist.clone(),
            duration: request.duration,
            state: request.state,
            created_at: Datetime::from(Utc::now()),
        };

        let created: Option<PlaybackRecord> = db
            .create((LIVE_TABLE, generate_object_id().as_str()))
            .content(record)
            .await
            .map_err(|e| {
                tracing::error!("Playback insert failed: {}", e);
                Error::PlaybackLogCreateFail
            })?;
        let created = created.ok_or(Error::PlaybackLogCreateFail)?;

        tracing::debug!(
            song = song_key,
            user = user_key,
            duration = created.duration,
            state = created.state.as_ref(),
            "Playback recorded"
        );

        let event = PlaybackEvent {
            user_id: user_key.to_string(),
            song_id: song_key.to_string(),
            artist_id: thing_key(&created.artist),
            duration: created.duration,
            timestamp: created.created_at.0,
        };
        tracker.track_playback(&event).await?;

        Ok(Some(created))
    }

    /// Live and archived plays of a song, folded into count, total and the
    /// duration weighted average. Read only.
    pub async fn aggregate_playback_stats(
        db: &Surreal<Any>,
        song_id: &str,
    ) -> Result<PlaybackStats> {
        let song_key = validate_object_id(song_id)?;

        let (live, history) = try_join!(
            Self::collect_bucket(db, LIVE_TABLE, song_key),
            Self::collect_bucket(db, HISTORY_TABLE, song_key)
        )?;

        Ok(Self::compute_stats(&merge_buckets(live, history)))
    }

    async fn collect_bucket(
        db: &Surreal<Any>,
        table: &str,
        song_key: &str,
    ) -> Result<PlaybackBucket> {
        // `array::group` would dedupe equal durations, so the list is read as is.
        let sql = format!(
            r#"
            SELECT count() AS count, math::sum(duration) AS total_duration
                FROM {table} WHERE song = $song GROUP ALL;
            SELECT VALUE duration FROM {table} WHERE song = $song;
            "#
        );

        let mut response = db
            .query(sql)
            .bind(("song", create_song_thing(song_key)))
            .await?;
        let totals: Option<DurationTotals> = response.take(0)?;
        let durations: Vec<Option<f64>> = response.take(1)?;

        Ok(match totals {
            Some(totals) => PlaybackBucket {
                count: totals.count,
                total_duration: totals.total_duration,
                durations: durations.into_iter().flatten().collect(),
            },
            None => PlaybackBucket::default(),
        })
    }

    pub fn compute_stats(bucket: &PlaybackBucket) -> PlaybackStats {
        PlaybackStats {
            total_count: bucket.count,
            total_duration: bucket.total_duration,
            weighted_avg_duration: weighted_average(&bucket.durations, bucket.total_duration),
        }
    }
}

pub fn merge_buckets(mut left: PlaybackBucket, right: PlaybackBucket) -> PlaybackBucket {
    left.count += right.count;
    left.total_duration += right.total_duration;
    left.durations.extend(right.durations);
    left
}

/// Each play weighted by its own length: `sum(d^2) / sum(d)`, zero when
/// nothing was listened.
pub fn weighted_average(durations: &[f64], total_duration: f64) -> f64 {
    if total_duration == 0.0 {
        return 0.0;
    }
    let squares: f64 = durations.iter().map(|d| d * d).sum();
    squares / total_duration
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::database::testing::{insert_play, insert_song, insert_user, setup_db};
    use crate::helpers::number_helpers::round_to;
    use crate::models::playback::PlaybackState;

    #[derive(Default)]
    struct RecordingTracker {
        events: Mutex<Vec<PlaybackEvent>>,
    }

    #[async_trait]
    impl StatsTracker for RecordingTracker {
        async fn track_playback(&self, event: &PlaybackEvent) -> Result<()> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    struct FailingTracker;

    #[async_trait]
    impl StatsTracker for FailingTracker {
        async fn track_playback(&self, _event: &PlaybackEvent) -> Result<()> {
            Err(Error::DbError("tracker down".to_string()))
        }
    }

    fn bucket(durations: &[f64]) -> PlaybackBucket {
        PlaybackBucket {
            count: durations.len() as u64,
            total_duration: durations.iter().sum(),
            durations: durations.to_vec(),
        }
    }

    fn request(song_id: &str, duration: f64) -> RecordPlaybackRequest {
        RecordPlaybackRequest {
            song_id: song_id.to_string(),
            duration,
            state: PlaybackState::Completed,
        }
    }

    async fn count_rows(db: &Surreal<Any>, table: &str) -> usize {
        let rows: Vec<PlaybackRecord> = db.select(table).await.unwrap();
        rows.len()
    }

    #[test]
    fn test_weighted_average() {
        let bucket = bucket(&[100.0, 200.0]);
        let stats = PlaybackService::compute_stats(&bucket);

        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.total_duration, 300.0);
        assert!((stats.weighted_avg_duration - 50_000.0 / 300.0).abs() < 1e-9);
        assert_eq!(round_to(stats.weighted_avg_duration, 2), 166.67);
    }

    #[test]
    fn test_empty_buckets() {
        let merged = merge_buckets(PlaybackBucket::default(), PlaybackBucket::default());
        let stats = PlaybackService::compute_stats(&merged);

        assert_eq!(
            stats,
            PlaybackStats {
                total_count: 0,
                total_duration: 0.0,
                weighted_avg_duration: 0.0,
            }
        );
    }

    #[test]
    fn test_merge_order_does_not_matter() {
        let a = bucket(&[10.0, 20.0]);
        let b = bucket(&[30.0]);
        let c = bucket(&[5.0, 5.0, 40.0]);

        let ab_c = merge_buckets(merge_buckets(a.clone(), b.clone()), c.clone());
        let c_ba = merge_buckets(c.clone(), merge_buckets(b.clone(), a.clone()));
        let a_bc = merge_buckets(a, merge_buckets(b, c));

        for merged in [&c_ba, &a_bc] {
            assert_eq!(merged.count, ab_c.count);
            assert_eq!(merged.total_duration, ab_c.total_duration);
            let left = PlaybackService::compute_stats(merged).weighted_avg_duration;
            let right = PlaybackService::compute_stats(&ab_c).weighted_avg_duration;
            assert!((left - right).abs() < 1e-9);
        }
        assert_eq!(ab_c.count, 6);
        assert_eq!(ab_c.total_duration, 110.0);
    }

    #[tokio::test]
    async fn test_non_positive_duration_is_a_no_op() {
        let db = setup_db().await;
        let tracker = RecordingTracker::default();

        for duration in [0.0, -1.0, -250.5, f64::NAN] {
            // The ids are not even valid: nothing past the duration check runs.
            let result = PlaybackService::create_playback_log(
                &db,
                &tracker,
                "not-an-id",
                request("not-an-id", duration),
            )
            .await
            .unwrap();
            assert!(result.is_none());
        }

        assert!(tracker.events.lock().unwrap().is_empty());
        assert_eq!(count_rows(&db, "playback").await, 0);
    }

    #[tokio::test]
    async fn test_invalid_ids_rejected() {
        let db = setup_db().await;
        let tracker = RecordingTracker::default();
        let user_id = insert_user(&db).await;

        let result = PlaybackService::create_playback_log(
            &db,
            &tracker,
            &user_id,
            request("abc123", 120.0),
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidObjectId { .. })));

        let result = PlaybackService::aggregate_playback_stats(&db, "65f0a1b2c3d4e5f6a7b8c9").await;
        assert!(matches!(result, Err(Error::InvalidObjectId { .. })));
        assert!(tracker.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prefixed_or_padded_song_id_rejected() {
        let db = setup_db().await;
        let tracker = RecordingTracker::default();
        let user_id = insert_user(&db).await;
        let (song_id, _) = insert_song(&db, 240.0).await;
        insert_play(&db, "playback", &user_id, &song_id, 100.0).await;

        for bad in [
            format!("garbage:{song_id}"),
            format!("playlist:{song_id}"),
            format!("  {song_id}\n"),
        ] {
            let result = PlaybackService::aggregate_playback_stats(&db, &bad).await;
            assert!(matches!(result, Err(Error::InvalidObjectId { .. })), "{bad:?}");

            let result =
                PlaybackService::create_playback_log(&db, &tracker, &user_id, request(&bad, 120.0))
                    .await;
            assert!(matches!(result, Err(Error::InvalidObjectId { .. })), "{bad:?}");
        }

        assert!(tracker.events.lock().unwrap().is_empty());
        assert_eq!(count_rows(&db, "playback").await, 1);
    }

    #[tokio::test]
    async fn test_missing_song() {
        let db = setup_db().await;
        let tracker = RecordingTracker::default();
        let user_id = insert_user(&db).await;

        let result = PlaybackService::create_playback_log(
            &db,
            &tracker,
            &user_id,
            request(&generate_object_id(), 120.0),
        )
        .await;

        assert!(matches!(result, Err(Error::SongNotFound { .. })));
        assert_eq!(count_rows(&db, "playback").await, 0);
    }

    #[tokio::test]
    async fn test_create_playback_log_tracks_once() {
        let db = setup_db().await;
        let tracker = RecordingTracker::default();
        let user_id = insert_user(&db).await;
        let (song_id, artist_id) = insert_song(&db, 240.0).await;

        let record = PlaybackService::create_playback_log(
            &db,
            &tracker,
            &user_id,
            request(&song_id, 95.5),
        )
        .await
        .unwrap()
        .expect("playback log should be created");

        assert_eq!(thing_key(&record.artist), artist_id);
        assert_eq!(record.state, PlaybackState::Completed);

        let events = tracker.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            PlaybackEvent {
                user_id: user_id.clone(),
                song_id: song_id.clone(),
                artist_id,
                duration: 95.5,
                timestamp: record.created_at.0,
            }
        );
        drop(events);

        assert_eq!(count_rows(&db, "playback").await, 1);
    }

    #[tokio::test]
    async fn test_tracker_failure_keeps_log() {
        let db = setup_db().await;
        let user_id = insert_user(&db).await;
        let (song_id, _) = insert_song(&db, 240.0).await;

        let result = PlaybackService::create_playback_log(
            &db,
            &FailingTracker,
            &user_id,
            request(&song_id, 60.0),
        )
        .await;

        assert!(matches!(result, Err(Error::DbError(_))));
        assert_eq!(count_rows(&db, "playback").await, 1);
    }

    #[tokio::test]
    async fn test_aggregate_live_and_history() {
        let db = setup_db().await;
        let user_id = insert_user(&db).await;
        let (song_id, _) = insert_song(&db, 300.0).await;
        let (other_song_id, _) = insert_song(&db, 300.0).await;

        insert_play(&db, "playback", &user_id, &song_id, 100.0).await;
        insert_play(&db, "history", &user_id, &song_id, 200.0).await;
        insert_play(&db, "playback", &user_id, &other_song_id, 999.0).await;

        let stats = PlaybackService::aggregate_playback_stats(&db, &song_id)
            .await
            .unwrap();

        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.total_duration, 300.0);
        assert_eq!(round_to(stats.weighted_avg_duration, 2), 166.67);
    }

    #[tokio::test]
    async fn test_aggregate_keeps_repeated_durations() {
        let db = setup_db().await;
        let user_id = insert_user(&db).await;
        let (song_id, _) = insert_song(&db, 300.0).await;

        insert_play(&db, "playback", &user_id, &song_id, 100.0).await;
        insert_play(&db, "playback", &user_id, &song_id, 100.0).await;
        insert_play(&db, "history", &user_id, &song_id, 100.0).await;
        insert_play(&db, "history", &user_id, &song_id, 200.0).await;

        let stats = PlaybackService::aggregate_playback_stats(&db, &song_id)
            .await
            .unwrap();

        assert_eq!(stats.total_count, 4);
        assert_eq!(stats.total_duration, 500.0);
        // (3 * 100^2 + 200^2) / 500
        assert!((stats.weighted_avg_duration - 140.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_aggregate_with_no_plays() {
        let db = setup_db().await;
        let (song_id, _) = insert_song(&db, 300.0).await;

        let stats = PlaybackService::aggregate_playback_stats(&db, &song_id)
            .await
            .unwrap();

        assert_eq!(stats, PlaybackStats::default());
    }

    #[tokio::test]
    async fn test_aggregate_history_only() {
        let db = setup_db().await;
        let user_id = insert_user(&db).await;
        let (song_id, _) = insert_song(&db, 300.0).await;

        insert_play(&db, "history", &user_id, &song_id, 50.0).await;

        let stats = PlaybackService::aggregate_playback_stats(&db, &song_id)
            .await
            .unwrap();

        assert_eq!(stats.total_count, 1);
        assert_eq!(stats.total_duration, 50.0);
        assert_eq!(stats.weighted_avg_duration, 50.0);
    }
}
