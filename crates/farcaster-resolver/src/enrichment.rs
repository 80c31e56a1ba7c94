//! Power-user enrichment
//!
//! Answers "is this FID a power user?" from an in-memory snapshot that is
//! refreshed in the background at most once per interval. Callers never wait
//! on the network: a stale snapshot is served while the refresh runs.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use neynar_client::NeynarClient;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Outcome of the most recent finished refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStatus {
    /// Number of refreshes that have finished, successfully or not
    pub completed: u64,
    pub last_succeeded: bool,
}

struct Snapshot {
    fids: HashSet<u64>,
    /// `None` until the first successful refresh
    refreshed_at: Option<Instant>,
}

struct Inner {
    client: NeynarClient,
    refresh_interval: Duration,
    snapshot: RwLock<Snapshot>,
    refresh_in_flight: AtomicBool,
    status_tx: watch::Sender<RefreshStatus>,
}

/// Periodically refreshed set of power-user FIDs
#[derive(Clone)]
pub struct NotableMembers {
    inner: Arc<Inner>,
}

impl NotableMembers {
    /// Create a service refreshing once an hour
    pub fn new(client: NeynarClient) -> Self {
        Self::with_refresh_interval(client, DEFAULT_REFRESH_INTERVAL)
    }

    pub fn with_refresh_interval(client: NeynarClient, refresh_interval: Duration) -> Self {
        let (status_tx, _) = watch::channel(RefreshStatus::default());
        Self {
            inner: Arc::new(Inner {
                client,
                refresh_interval,
                snapshot: RwLock::new(Snapshot {
                    fids: HashSet::new(),
                    refreshed_at: None,
                }),
                refresh_in_flight: AtomicBool::new(false),
                status_tx,
            }),
        }
    }

    /// Whether `fid` is in the current snapshot.
    ///
    /// Starts a background refresh first if the snapshot is older than the
    /// refresh interval; the answer always comes from the pre-refresh set.
    pub fn is_notable(&self, fid: u64) -> bool {
        if self.is_stale() {
            self.spawn_refresh();
        }
        self.inner
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .fids
            .contains(&fid)
    }

    /// Run one refresh inline.
    ///
    /// Returns `false` without a request if another refresh is in flight.
    pub async fn refresh(&self) -> bool {
        if !self.try_begin_refresh() {
            return false;
        }
        self.run_refresh().await
    }

    /// Receiver that observes every finished refresh
    pub fn subscribe(&self) -> watch::Receiver<RefreshStatus> {
        self.inner.status_tx.subscribe()
    }

    pub fn snapshot_len(&self) -> usize {
        self.inner
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .fids
            .len()
    }

    pub fn refresh_in_flight(&self) -> bool {
        self.inner.refresh_in_flight.load(Ordering::Acquire)
    }

    fn is_stale(&self) -> bool {
        let snapshot = self
            .inner
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match snapshot.refreshed_at {
            Some(at) => at.elapsed() > self.inner.refresh_interval,
            None => true,
        }
    }

    fn try_begin_refresh(&self) -> bool {
        self.inner
            .refresh_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn spawn_refresh(&self) {
        if !self.try_begin_refresh() {
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("No Tokio runtime available, skipping power-user refresh");
                self.inner.refresh_in_flight.store(false, Ordering::Release);
                return;
            }
        };

        debug!("Starting background power-user refresh");
        let this = self.clone();
        runtime.spawn(async move { this.run_refresh().await });
    }

    /// Fetch and swap in a new snapshot; the caller must hold the in-flight guard
    async fn run_refresh(&self) -> bool {
        let succeeded = match self.inner.client.fetch_power_user_fids().await {
            Ok(fids) => {
                let fids: HashSet<u64> = fids.into_iter().collect();
                info!(count = fids.len(), "Refreshed power users");
                let mut snapshot = self
                    .inner
                    .snapshot
                    .write()
                    .unwrap_or_else(PoisonError::into_inner);
                *snapshot = Snapshot {
                    fids,
                    refreshed_at: Some(Instant::now()),
                };
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to refresh power users, keeping previous set");
                false
            }
        };

        self.inner.refresh_in_flight.store(false, Ordering::Release);
        self.inner.status_tx.send_modify(|status| {
            status.completed += 1;
            status.last_succeeded = succeeded;
        });
        succeeded
    }
}
