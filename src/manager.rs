//! Revenue manager: fans out to every configured source, merges the results
//! into a single [`AggregateState`] and keeps it fresh on a timer.
//!
//! All state mutation goes through one `watch` channel, so readers only ever
//! observe whole snapshots. At most one refresh cycle runs at a time and at
//! most one auto-refresh timer exists per manager.

use crate::core::revenue::{Credentials, RevenueSource, SourceId};
use crate::core::state::AggregateState;
use crate::core::store::{KeyValueStore, Settings};
use anyhow::Result;
use chrono::Utc;
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

/// How a call to [`RevenueManager::refresh_now`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No source has a credential; nothing was fetched.
    NoCredentials,
    /// Another cycle was already loading; this request was dropped.
    AlreadyRunning,
    Success,
    PartialFailure,
    TotalFailure,
}

/// Values entered together in a settings form.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub stripe_secret_key: String,
    pub polar_access_token: String,
    pub organization_id: String,
}

#[derive(Clone)]
pub struct RevenueManager {
    inner: Arc<Inner>,
}

struct Inner {
    sources: Vec<Arc<dyn RevenueSource>>,
    secrets: Arc<dyn KeyValueStore>,
    settings: Settings,
    state: watch::Sender<AggregateState>,
    in_flight: AtomicBool,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl RevenueManager {
    /// `sources` are merged in the given order; when several fail in the
    /// same cycle the last one's message is kept.
    pub fn new(
        sources: Vec<Arc<dyn RevenueSource>>,
        secrets: Arc<dyn KeyValueStore>,
        settings: Arc<dyn KeyValueStore>,
    ) -> Self {
        let (state, _) = watch::channel(AggregateState::default());
        Self {
            inner: Arc::new(Inner {
                sources,
                secrets,
                settings: Settings::new(settings),
                state,
                in_flight: AtomicBool::new(false),
                timer: Mutex::new(None),
            }),
        }
    }

    pub fn snapshot(&self) -> AggregateState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified once when a cycle starts loading and once per
    /// completed merge.
    pub fn subscribe(&self) -> watch::Receiver<AggregateState> {
        self.inner.state.subscribe()
    }

    pub fn has_credentials(&self) -> bool {
        !self.configured_sources().is_empty()
    }

    /// Sources that currently hold a non-empty credential.
    pub fn configured_sources(&self) -> Vec<SourceId> {
        self.inner
            .sources
            .iter()
            .map(|s| s.id())
            .filter(|id| !self.inner.secret(*id).is_empty())
            .collect()
    }

    pub fn credential(&self, source: SourceId) -> String {
        self.inner.secret(source)
    }

    /// Persists a credential. Does not refresh.
    pub fn set_credential(&self, source: SourceId, value: &str) -> Result<()> {
        self.inner.secrets.set(source.credential_name(), value)?;
        debug!(%source, "Stored credential");
        Ok(())
    }

    pub fn organization_id(&self) -> String {
        self.inner.settings.organization_id()
    }

    pub fn set_organization_id(&self, id: &str) -> Result<()> {
        self.inner.settings.set_organization_id(id)
    }

    pub fn refresh_interval_secs(&self) -> u64 {
        self.inner.settings.refresh_interval_secs()
    }

    /// Persists a new interval and, if auto-refresh is running, restarts the
    /// timer with it. An in-flight cycle is left to finish.
    pub fn set_refresh_interval(&self, secs: u64) -> Result<()> {
        self.inner.settings.set_refresh_interval_secs(secs)?;
        if self.is_auto_refreshing() {
            self.start_auto_refresh(secs);
        }
        Ok(())
    }

    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.inner.refresh().await
    }

    /// Initial refresh followed by auto-refresh at the persisted interval.
    pub async fn start(&self) -> RefreshOutcome {
        let outcome = self.refresh_now().await;
        self.start_auto_refresh(self.refresh_interval_secs());
        outcome
    }

    /// Writes a batch of settings, restarts the timer and refreshes once.
    pub async fn apply_settings(&self, update: &SettingsUpdate) -> Result<RefreshOutcome> {
        self.set_credential(SourceId::Stripe, &update.stripe_secret_key)?;
        self.set_credential(SourceId::Polar, &update.polar_access_token)?;
        self.set_organization_id(&update.organization_id)?;
        self.start_auto_refresh(self.refresh_interval_secs());
        Ok(self.refresh_now().await)
    }

    /// (Re)starts the recurring refresh. Any previous timer is cancelled
    /// first. The first firing happens one interval from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_auto_refresh(&self, interval_secs: u64) {
        let period = Duration::from_secs(interval_secs.max(1));
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);

        let mut timer = self.inner.lock_timer();
        if let Some(previous) = timer.take() {
            previous.abort();
            debug!("Cancelled previous refresh timer");
        }

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                // Run the cycle in its own task so aborting the timer never
                // drops a half-merged refresh.
                let cycle = tokio::spawn(async move { inner.refresh().await });
                if let Err(e) = cycle.await {
                    error!(error = %e, "Scheduled refresh task failed");
                }
            }
        });
        *timer = Some(handle);
        info!(interval_secs = period.as_secs(), "Auto-refresh started");
    }

    pub fn stop_auto_refresh(&self) {
        if let Some(handle) = self.inner.lock_timer().take() {
            handle.abort();
            info!("Auto-refresh stopped");
        }
    }

    pub fn is_auto_refreshing(&self) -> bool {
        self.inner
            .lock_timer()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Inner {
    fn secret(&self, source: SourceId) -> String {
        self.secrets
            .get(source.credential_name())
            .unwrap_or_default()
    }

    fn lock_timer(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn refresh(&self) -> RefreshOutcome {
        let organization_id = self.settings.organization_id();
        let jobs: Vec<(Arc<dyn RevenueSource>, Credentials)> = self
            .sources
            .iter()
            .filter_map(|source| {
                let secret = self.secret(source.id());
                (!secret.is_empty()).then(|| {
                    (
                        Arc::clone(source),
                        Credentials {
                            secret,
                            organization_id: organization_id.clone(),
                        },
                    )
                })
            })
            .collect();

        if jobs.is_empty() {
            debug!("No credentials configured, skipping refresh");
            return RefreshOutcome::NoCredentials;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Refresh already in flight, skipping");
            return RefreshOutcome::AlreadyRunning;
        }
        let mut guard = InFlightGuard {
            inner: self,
            completed: false,
        };

        self.state.send_modify(|s| {
            s.is_loading = true;
            s.last_error = None;
        });

        let fetches = jobs.iter().map(|(source, credentials)| async move {
            (source.id(), source.fetch_stats(credentials).await)
        });
        let results = join_all(fetches).await;
        drop(jobs);

        let launched = results.len();
        let mut failed = 0;
        self.state.send_modify(|s| {
            for (source, result) in results {
                match result {
                    Ok(stats) => {
                        debug!(%source, orders = stats.order_count, revenue = %stats.revenue, "Source refreshed");
                        s.per_source.insert(source, stats);
                    }
                    Err(e) => {
                        failed += 1;
                        warn!(%source, error = %e, "Source refresh failed");
                        s.last_error = Some(format!("{source}: {e}"));
                    }
                }
            }
            s.last_updated = Some(Utc::now());
            s.is_loading = false;
            info!(
                total_revenue = %s.total_revenue(),
                total_orders = s.total_orders(),
                failed,
                "Refresh cycle complete"
            );
        });
        guard.completed = true;

        match failed {
            0 => RefreshOutcome::Success,
            n if n == launched => RefreshOutcome::TotalFailure,
            _ => RefreshOutcome::PartialFailure,
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.get_mut().ok().and_then(Option::take) {
            handle.abort();
        }
    }
}

/// Releases the in-flight flag, and clears the loading flag if the cycle was
/// dropped before it could merge.
struct InFlightGuard<'a> {
    inner: &'a Inner,
    completed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.inner.state.send_modify(|s| s.is_loading = false);
        }
        self.inner.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::revenue::{RevenueStats, SourceError};
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::atomic::AtomicUsize;

    #[derive(Clone, Copy)]
    enum Behavior {
        Cents(&'static [i64]),
        Unauthorized,
        ServerError,
    }

    struct FakeSource {
        id: SourceId,
        behavior: Mutex<Behavior>,
        delay: Duration,
        calls: AtomicUsize,
        seen_org: Mutex<Option<String>>,
    }

    impl FakeSource {
        fn new(id: SourceId, behavior: Behavior) -> Arc<Self> {
            Self::with_delay(id, behavior, Duration::ZERO)
        }

        fn with_delay(id: SourceId, behavior: Behavior, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                id,
                behavior: Mutex::new(behavior),
                delay,
                calls: AtomicUsize::new(0),
                seen_org: Mutex::new(None),
            })
        }

        fn set_behavior(&self, behavior: Behavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RevenueSource for FakeSource {
        fn id(&self) -> SourceId {
            self.id
        }

        async fn fetch_stats(
            &self,
            credentials: &Credentials,
        ) -> Result<RevenueStats, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_org.lock().unwrap() = Some(credentials.organization_id.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let behavior = *self.behavior.lock().unwrap();
            match behavior {
                Behavior::Cents(amounts) => {
                    Ok(RevenueStats::from_minor_units(amounts.iter().copied()))
                }
                Behavior::Unauthorized => {
                    Err(SourceError::Unauthorized("Invalid API key".to_string()))
                }
                Behavior::ServerError => Err(SourceError::Http {
                    status: 500,
                    body: "boom".to_string(),
                }),
            }
        }
    }

    struct Fixture {
        manager: RevenueManager,
        stripe: Arc<FakeSource>,
        polar: Arc<FakeSource>,
    }

    fn fixture(stripe: Arc<FakeSource>, polar: Arc<FakeSource>, keys: &[(&str, &str)]) -> Fixture {
        let secrets = Arc::new(MemoryStore::with_entries(keys.iter().copied()));
        let sources = vec![
            stripe.clone() as Arc<dyn RevenueSource>,
            polar.clone() as Arc<dyn RevenueSource>,
        ];
        let manager = RevenueManager::new(sources, secrets, Arc::new(MemoryStore::new()));
        Fixture {
            manager,
            stripe,
            polar,
        }
    }

    const BOTH_KEYS: &[(&str, &str)] = &[
        ("stripe_secret_key", "sk_test"),
        ("polar_access_token", "polar_oat"),
    ];

    #[tokio::test]
    async fn test_no_credentials_is_a_silent_no_op() {
        let f = fixture(
            FakeSource::new(SourceId::Stripe, Behavior::Cents(&[100])),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[100])),
            &[],
        );

        assert!(!f.manager.has_credentials());
        assert_eq!(f.manager.refresh_now().await, RefreshOutcome::NoCredentials);
        assert_eq!(f.stripe.calls() + f.polar.calls(), 0);

        let state = f.manager.snapshot();
        assert_eq!(state, AggregateState::default());
        assert!(state.total_revenue().is_zero());
        assert!(state.last_error.is_none());
    }

    #[tokio::test]
    async fn test_successful_refresh_merges_all_sources() {
        let f = fixture(
            FakeSource::new(SourceId::Stripe, Behavior::Cents(&[2500])),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[500, 1500])),
            BOTH_KEYS,
        );

        assert_eq!(f.manager.refresh_now().await, RefreshOutcome::Success);

        let state = f.manager.snapshot();
        assert_eq!(state.stats(SourceId::Stripe).revenue, Decimal::new(2500, 2));
        assert_eq!(state.stats(SourceId::Polar).order_count, 2);
        assert_eq!(state.total_revenue(), Decimal::new(4500, 2));
        assert_eq!(state.total_orders(), 3);
        assert!(state.last_updated.is_some());
        assert!(state.last_error.is_none());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_sources_without_credentials_are_skipped() {
        let f = fixture(
            FakeSource::new(SourceId::Stripe, Behavior::Cents(&[2500])),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[500])),
            &[("polar_access_token", "polar_oat")],
        );

        assert_eq!(f.manager.configured_sources(), vec![SourceId::Polar]);
        assert_eq!(f.manager.refresh_now().await, RefreshOutcome::Success);
        assert_eq!(f.stripe.calls(), 0);
        assert_eq!(f.polar.calls(), 1);

        let state = f.manager.snapshot();
        assert!(!state.per_source.contains_key(&SourceId::Stripe));
        assert!(state.last_error.is_none());
        assert_eq!(state.total_orders(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_other_source() {
        let f = fixture(
            FakeSource::new(SourceId::Stripe, Behavior::Cents(&[2500])),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[500, 1500])),
            BOTH_KEYS,
        );
        f.manager.refresh_now().await;

        f.stripe.set_behavior(Behavior::Unauthorized);
        f.polar.set_behavior(Behavior::Cents(&[700]));
        assert_eq!(
            f.manager.refresh_now().await,
            RefreshOutcome::PartialFailure
        );

        let state = f.manager.snapshot();
        // Stripe keeps its previous stats, Polar is replaced
        assert_eq!(state.stats(SourceId::Stripe).revenue, Decimal::new(2500, 2));
        assert_eq!(state.stats(SourceId::Polar).revenue, Decimal::new(700, 2));
        assert_eq!(
            state.last_error.as_deref(),
            Some("Stripe: Invalid API key")
        );
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_last_failure_message_wins() {
        let f = fixture(
            FakeSource::new(SourceId::Stripe, Behavior::Unauthorized),
            FakeSource::new(SourceId::Polar, Behavior::ServerError),
            BOTH_KEYS,
        );

        assert_eq!(f.manager.refresh_now().await, RefreshOutcome::TotalFailure);

        let state = f.manager.snapshot();
        assert_eq!(state.last_error.as_deref(), Some("Polar: HTTP 500: boom"));
        assert!(state.total_revenue().is_zero());
        assert!(state.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_error_cleared_on_next_cycle() {
        let f = fixture(
            FakeSource::new(SourceId::Stripe, Behavior::ServerError),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[100])),
            BOTH_KEYS,
        );
        f.manager.refresh_now().await;
        assert!(f.manager.snapshot().last_error.is_some());

        f.stripe.set_behavior(Behavior::Cents(&[100]));
        assert_eq!(f.manager.refresh_now().await, RefreshOutcome::Success);
        assert!(f.manager.snapshot().last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_run_concurrently() {
        let f = fixture(
            FakeSource::with_delay(
                SourceId::Stripe,
                Behavior::Cents(&[100]),
                Duration::from_secs(5),
            ),
            FakeSource::with_delay(
                SourceId::Polar,
                Behavior::Cents(&[100]),
                Duration::from_secs(5),
            ),
            BOTH_KEYS,
        );

        let started = Instant::now();
        f.manager.refresh_now().await;
        assert!(started.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_refresh_is_coalesced() {
        let f = fixture(
            FakeSource::with_delay(
                SourceId::Stripe,
                Behavior::Cents(&[100]),
                Duration::from_secs(1),
            ),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[100])),
            BOTH_KEYS,
        );

        let (first, second) = tokio::join!(f.manager.refresh_now(), f.manager.refresh_now());
        assert_eq!(first, RefreshOutcome::Success);
        assert_eq!(second, RefreshOutcome::AlreadyRunning);
        assert_eq!(f.stripe.calls(), 1);

        // Flag is released once the cycle completes
        assert_eq!(f.manager.refresh_now().await, RefreshOutcome::Success);
        assert_eq!(f.stripe.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_cycle_clears_loading() {
        let f = fixture(
            FakeSource::with_delay(
                SourceId::Stripe,
                Behavior::Cents(&[100]),
                Duration::from_secs(10),
            ),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[100])),
            BOTH_KEYS,
        );

        let timed_out =
            tokio::time::timeout(Duration::from_secs(1), f.manager.refresh_now()).await;
        assert!(timed_out.is_err());

        let state = f.manager.snapshot();
        assert!(!state.is_loading);
        assert_eq!(f.manager.refresh_now().await, RefreshOutcome::Success);
    }

    #[tokio::test]
    async fn test_subscribers_see_whole_snapshots() {
        let f = fixture(
            FakeSource::new(SourceId::Stripe, Behavior::Cents(&[2500])),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[500])),
            BOTH_KEYS,
        );
        let mut rx = f.manager.subscribe();

        f.manager.refresh_now().await;

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert!(!state.is_loading);
        assert_eq!(state.total_orders(), 2);
    }

    #[tokio::test]
    async fn test_organization_id_reaches_sources() {
        let f = fixture(
            FakeSource::new(SourceId::Stripe, Behavior::Cents(&[])),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[])),
            BOTH_KEYS,
        );
        f.manager.set_organization_id("org_9").unwrap();

        f.manager.refresh_now().await;
        assert_eq!(f.polar.seen_org.lock().unwrap().as_deref(), Some("org_9"));
    }

    #[tokio::test]
    async fn test_set_credential_writes_through_without_refresh() {
        let f = fixture(
            FakeSource::new(SourceId::Stripe, Behavior::Cents(&[100])),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[100])),
            &[],
        );

        f.manager.set_credential(SourceId::Stripe, "sk_new").unwrap();

        assert!(f.manager.has_credentials());
        assert_eq!(f.manager.credential(SourceId::Stripe), "sk_new");
        assert_eq!(f.stripe.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_fires_each_interval() {
        let f = fixture(
            FakeSource::new(SourceId::Stripe, Behavior::Cents(&[100])),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[100])),
            BOTH_KEYS,
        );

        f.manager.start_auto_refresh(60);
        assert!(f.manager.is_auto_refreshing());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(f.stripe.calls(), 0);

        tokio::time::sleep(Duration::from_secs(91)).await;
        assert_eq!(f.stripe.calls(), 2);

        f.manager.stop_auto_refresh();
        assert!(!f.manager.is_auto_refreshing());
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(f.stripe.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restarting_auto_refresh_keeps_one_timer() {
        let f = fixture(
            FakeSource::new(SourceId::Stripe, Behavior::Cents(&[100])),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[100])),
            BOTH_KEYS,
        );

        f.manager.start_auto_refresh(60);
        f.manager.start_auto_refresh(60);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(f.stripe.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_change_restarts_running_timer() {
        let f = fixture(
            FakeSource::new(SourceId::Stripe, Behavior::Cents(&[100])),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[100])),
            BOTH_KEYS,
        );

        assert_eq!(f.manager.start().await, RefreshOutcome::Success);
        assert_eq!(f.stripe.calls(), 1);
        assert_eq!(f.manager.refresh_interval_secs(), 300);

        f.manager.set_refresh_interval(60).unwrap();
        assert_eq!(f.manager.refresh_interval_secs(), 60);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(f.stripe.calls(), 2);

        assert!(f.manager.set_refresh_interval(0).is_err());
        assert_eq!(f.manager.refresh_interval_secs(), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_change_does_not_start_timer() {
        let f = fixture(
            FakeSource::new(SourceId::Stripe, Behavior::Cents(&[100])),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[100])),
            BOTH_KEYS,
        );

        f.manager.set_refresh_interval(60).unwrap();
        assert!(!f.manager.is_auto_refreshing());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(f.stripe.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_settings_saves_and_refreshes() {
        let f = fixture(
            FakeSource::new(SourceId::Stripe, Behavior::Cents(&[2500])),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[500])),
            &[],
        );

        let outcome = f
            .manager
            .apply_settings(&SettingsUpdate {
                stripe_secret_key: "sk_test".to_string(),
                polar_access_token: String::new(),
                organization_id: "org_1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(outcome, RefreshOutcome::Success);
        assert_eq!(f.manager.configured_sources(), vec![SourceId::Stripe]);
        assert_eq!(f.manager.organization_id(), "org_1");
        assert!(f.manager.is_auto_refreshing());
        assert_eq!(f.polar.calls(), 0);
        assert_eq!(f.manager.snapshot().total_revenue(), Decimal::new(2500, 2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_manager_stops_timer() {
        let f = fixture(
            FakeSource::new(SourceId::Stripe, Behavior::Cents(&[100])),
            FakeSource::new(SourceId::Polar, Behavior::Cents(&[100])),
            BOTH_KEYS,
        );
        let stripe = Arc::clone(&f.stripe);

        f.manager.start_auto_refresh(60);
        drop(f);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(stripe.calls(), 0);
    }
}
