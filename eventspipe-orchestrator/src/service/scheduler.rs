//! Schedule Synchronizer
//!
//! Materializes persisted event schedules into live scheduler entries,
//! independently of event traffic. Each tick recomputes a digest over the
//! enabled rows; only when it differs from the previous run are entries
//! reconciled incrementally (add new, replace changed, remove stale). Due
//! entries then emit their stored event payload back through the dispatcher.

use chrono::{DateTime, Utc};
use eventspipe_core::domain::event::Event;
use eventspipe_core::domain::schedule::{CronSpec, EventSchedule, compute_schedule_digest};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::repository::schedule_repository;
use crate::service::dispatcher::{self, DispatchError};
use crate::service::execution::ExecutionBackend;

/// Live scheduler entry derived from one enabled schedule
#[derive(Debug, Clone)]
pub struct ScheduleEntry {
    pub schedule_id: Uuid,
    pub cron: CronSpec,
    /// Minute-of-epoch of the last firing, so a tick interval shorter than a
    /// minute cannot fire an entry twice.
    last_fired_minute: Option<i64>,
}

/// Entry table plus the digest of the schedule set it was built from
#[derive(Default)]
struct SyncState {
    entries: HashMap<String, ScheduleEntry>,
    last_digest: Option<String>,
}

/// Periodic reconciler between the `event_schedules` table and the live
/// entry table. The state is process-local; the mutex serializes
/// overlapping sync invocations.
pub struct ScheduleSynchronizer {
    pool: PgPool,
    backend: Arc<dyn ExecutionBackend>,
    state: Mutex<SyncState>,
}

impl ScheduleSynchronizer {
    pub fn new(pool: PgPool, backend: Arc<dyn ExecutionBackend>) -> Self {
        Self {
            pool,
            backend,
            state: Mutex::new(SyncState::default()),
        }
    }

    /// Reconcile the live entries against the enabled schedules.
    ///
    /// Idempotent and safe to call redundantly: an unchanged digest makes
    /// this a no-op.
    pub async fn sync(&self) -> Result<(), sqlx::Error> {
        let mut state = self.state.lock().await;

        tracing::debug!("Updating schedule entries from database...");

        let schedules = schedule_repository::find_enabled(&self.pool).await?;
        let digest = compute_schedule_digest(&schedules);

        let (added, updated, removed) = reconcile_entries(&mut state, &schedules, digest);

        if added + updated + removed > 0 {
            tracing::info!(
                "Schedule entries reconciled: {} added, {} updated, {} removed",
                added,
                updated,
                removed
            );
        } else {
            tracing::debug!("No changes detected in schedule");
        }

        Ok(())
    }

    /// Entries due at the given instant. Marks them fired for this minute.
    async fn due_entries(&self, now: DateTime<Utc>) -> Vec<Uuid> {
        let minute = now.timestamp() / 60;
        let mut state = self.state.lock().await;
        let mut due = Vec::new();

        for entry in state.entries.values_mut() {
            if entry.last_fired_minute == Some(minute) {
                continue;
            }
            if entry.cron.matches(&now) {
                entry.last_fired_minute = Some(minute);
                due.push(entry.schedule_id);
            }
        }

        due
    }

    /// Fire one schedule: load it by identity and submit its stored event
    /// payload for its owning principal.
    ///
    /// A schedule deleted or disabled since the last sync is skipped; the
    /// stale entry disappears on the next reconciliation.
    pub async fn trigger(&self, schedule_id: Uuid) -> Result<(), DispatchError> {
        let Some(schedule) = schedule_repository::find_by_id(&self.pool, schedule_id).await? else {
            tracing::warn!("Schedule {} no longer exists, skipping trigger", schedule_id);
            return Ok(());
        };

        if !schedule.enabled {
            tracing::warn!("Schedule {} is disabled, skipping trigger", schedule_id);
            return Ok(());
        }

        let event: Event = match serde_json::from_value(schedule.event.clone()) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!("Schedule {} has an invalid event payload: {}", schedule_id, e);
                return Ok(());
            }
        };

        let pipelines =
            dispatcher::submit(&self.pool, &self.backend, &schedule.principal, &event).await?;

        tracing::info!(
            "Schedule {} fired, created {} pipeline(s)",
            schedule_id,
            pipelines.len()
        );

        Ok(())
    }

    /// Tick loop driving sync and entry firing
    pub async fn run(self: Arc<Self>, interval: Duration) {
        tracing::info!("Starting schedule synchronizer (interval: {:?})", interval);

        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;

            if let Err(e) = self.sync().await {
                tracing::error!("Schedule sync failed: {:?}", e);
                continue;
            }

            let now = Utc::now();
            for schedule_id in self.due_entries(now).await {
                if let Err(e) = self.trigger(schedule_id).await {
                    tracing::error!("Failed to trigger schedule {}: {:?}", schedule_id, e);
                }
            }
        }
    }
}

/// Apply one reconciliation pass to the entry table.
///
/// Returns (added, updated, removed) counts; all zero when the digest is
/// unchanged. The digest is stored only after reconciliation completes.
fn reconcile_entries(
    state: &mut SyncState,
    schedules: &[EventSchedule],
    digest: String,
) -> (usize, usize, usize) {
    if state.last_digest.as_deref() == Some(digest.as_str()) {
        return (0, 0, 0);
    }

    let mut added = 0;
    let mut updated = 0;

    for schedule in schedules {
        let key = schedule.entry_key();
        let cron = schedule.cron.normalized();

        match state.entries.get_mut(&key) {
            None => {
                state.entries.insert(
                    key.clone(),
                    ScheduleEntry {
                        schedule_id: schedule.id,
                        cron,
                        last_fired_minute: None,
                    },
                );
                tracing::info!("Added schedule entry: {}", key);
                added += 1;
            }
            Some(entry) if entry.cron != cron => {
                // Replace the cron spec in place; the firing marker survives
                // so an update cannot re-fire within the same minute.
                entry.cron = cron;
                tracing::info!("Updated schedule entry: {}", key);
                updated += 1;
            }
            Some(_) => {}
        }
    }

    let current_keys: HashSet<String> = schedules.iter().map(|s| s.entry_key()).collect();
    let before = state.entries.len();
    state.entries.retain(|key, _| {
        let keep = current_keys.contains(key);
        if !keep {
            tracing::info!("Removed schedule entry: {}", key);
        }
        keep
    });
    let removed = before - state.entries.len();

    state.last_digest = Some(digest);

    (added, updated, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(minute: &str) -> EventSchedule {
        EventSchedule {
            id: Uuid::new_v4(),
            event: serde_json::json!({"name": "nightly"}),
            principal: "ops".to_string(),
            enabled: true,
            cron: CronSpec {
                minute: minute.to_string(),
                ..CronSpec::default()
            },
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_new_entries_are_added() {
        let mut state = SyncState::default();
        let schedules = vec![schedule("0"), schedule("30")];
        let digest = compute_schedule_digest(&schedules);

        let counts = reconcile_entries(&mut state, &schedules, digest.clone());

        assert_eq!(counts, (2, 0, 0));
        assert_eq!(state.entries.len(), 2);
        assert_eq!(state.last_digest, Some(digest));
    }

    #[test]
    fn test_unchanged_digest_is_a_no_op() {
        let mut state = SyncState::default();
        let schedules = vec![schedule("0")];
        let digest = compute_schedule_digest(&schedules);

        reconcile_entries(&mut state, &schedules, digest.clone());

        // Second pass with identical data performs zero entry mutations.
        let counts = reconcile_entries(&mut state, &schedules, digest);

        assert_eq!(counts, (0, 0, 0));
        assert_eq!(state.entries.len(), 1);
    }

    #[test]
    fn test_changed_cron_replaces_entry() {
        let mut state = SyncState::default();
        let mut schedules = vec![schedule("0")];
        let digest = compute_schedule_digest(&schedules);
        reconcile_entries(&mut state, &schedules, digest);

        // Simulate a firing, then a cron edit.
        let key = schedules[0].entry_key();
        state
            .entries
            .get_mut(&key)
            .expect("entry exists")
            .last_fired_minute = Some(42);
        schedules[0].cron.minute = "30".to_string();
        let digest = compute_schedule_digest(&schedules);

        let counts = reconcile_entries(&mut state, &schedules, digest);

        assert_eq!(counts, (0, 1, 0));
        let entry = &state.entries[&key];
        assert_eq!(entry.cron.minute, "30");
        // The firing marker survives the replacement.
        assert_eq!(entry.last_fired_minute, Some(42));
    }

    #[test]
    fn test_stale_entries_are_removed() {
        let mut state = SyncState::default();
        let schedules = vec![schedule("0"), schedule("30")];
        let digest = compute_schedule_digest(&schedules);
        reconcile_entries(&mut state, &schedules, digest);

        let remaining = vec![schedules[0].clone()];
        let digest = compute_schedule_digest(&remaining);

        let counts = reconcile_entries(&mut state, &remaining, digest);

        assert_eq!(counts, (0, 0, 1));
        assert_eq!(state.entries.len(), 1);
        assert!(state.entries.contains_key(&remaining[0].entry_key()));
    }
}
