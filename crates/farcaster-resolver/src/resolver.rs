//! Batch-coalescing address resolver
//!
//! `resolve` calls that miss the cache join a pending batch. The first
//! address to join arms a debounce timer; when it fires the batch is
//! snapshotted and cleared, sent to Neynar as one bulk lookup, and the
//! results are written to the cache. Every caller that joined the batch
//! then reads its answer from the cache.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use neynar_client::NeynarClient;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::config::{Config, ResolverConfig, MAX_CACHE_DURATION};
use crate::enrichment::NotableMembers;
use crate::types::{CacheMetadata, ResolvedIdentity};

/// Addresses waiting for the next lookup
#[derive(Default)]
struct PendingBatch {
    addresses: Vec<String>,
    queued: HashSet<String>,
    /// Completion signal for the open batch; `Some` iff a timer is armed
    done: Option<watch::Sender<bool>>,
}

struct Inner {
    client: NeynarClient,
    notable: NotableMembers,
    config: ResolverConfig,
    cache: Cache<String, ResolvedIdentity>,
    misses: Option<Cache<String, ()>>,
    pending: Mutex<PendingBatch>,
    metadata_tx: watch::Sender<CacheMetadata>,
}

/// Resolves wallet addresses to Farcaster identities
///
/// Cheap to clone; clones share one cache and one pending batch.
#[derive(Clone)]
pub struct NameResolver {
    inner: Arc<Inner>,
}

impl NameResolver {
    pub fn new(client: NeynarClient, notable: NotableMembers, config: ResolverConfig) -> Self {
        let cache = Cache::builder()
            .time_to_live(config.cache_duration.min(MAX_CACHE_DURATION))
            .build();

        let misses = config.negative_ttl.map(|ttl| {
            Cache::builder()
                .time_to_live(ttl.min(MAX_CACHE_DURATION))
                .build()
        });

        let (metadata_tx, _) = watch::channel(CacheMetadata::default());

        info!(
            cache_duration_ms = config.cache_duration.as_millis() as u64,
            debounce_ms = config.debounce_window.as_millis() as u64,
            "Resolver initialized"
        );

        Self {
            inner: Arc::new(Inner {
                client,
                notable,
                config,
                cache,
                misses,
                pending: Mutex::new(PendingBatch::default()),
                metadata_tx,
            }),
        }
    }

    /// Build a resolver and its Neynar client from process configuration
    pub fn from_config(config: &Config) -> Self {
        let client = NeynarClient::with_base_url(&config.api_url, &config.api_key);
        let notable = NotableMembers::new(client.clone());
        Self::new(client, notable, config.resolver_config())
    }

    /// Resolve an address to an identity, or `None` if it has none.
    ///
    /// Fresh cache hits return immediately. Misses wait for the batch they
    /// joined; lookup failures surface as `None`.
    pub async fn resolve(&self, address: &str) -> Option<ResolvedIdentity> {
        let address = normalize_address(address)?;

        if let Some(hit) = self.inner.cache.get(&address).await {
            debug!(%address, "Cache hit");
            return Some(hit);
        }

        if let Some(misses) = &self.inner.misses {
            if misses.contains_key(&address) {
                debug!(%address, "Recent miss, skipping lookup");
                return None;
            }
        }

        let done = self.enqueue(address.clone()).await;
        self.wait_for_batch(done).await;

        let result = self.inner.cache.get(&address).await;
        if result.is_none() {
            debug!(%address, "No identity found");
        }
        result
    }

    /// Fresh cached identity for an address, without queueing a lookup
    pub async fn cached(&self, address: &str) -> Option<ResolvedIdentity> {
        let address = normalize_address(address)?;
        self.inner.cache.get(&address).await
    }

    /// Drop every cached identity and remembered miss
    pub async fn clear_cache(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
        if let Some(misses) = &self.inner.misses {
            misses.invalidate_all();
            misses.run_pending_tasks().await;
        }
        self.inner.metadata_tx.send_replace(CacheMetadata::default());
        info!("Cache cleared");
    }

    /// Receiver for cache size and last batch time, updated after every batch
    pub fn metadata(&self) -> watch::Receiver<CacheMetadata> {
        self.inner.metadata_tx.subscribe()
    }

    pub fn notable_members(&self) -> &NotableMembers {
        &self.inner.notable
    }

    /// Add an address to the open batch, arming the timer if none is armed
    async fn enqueue(&self, address: String) -> watch::Receiver<bool> {
        let mut pending = self.inner.pending.lock().await;

        if pending.queued.insert(address.clone()) {
            debug!(%address, "Added to pending batch");
            pending.addresses.push(address);
        }

        if let Some(done) = &pending.done {
            return done.subscribe();
        }

        let (done_tx, done_rx) = watch::channel(false);
        pending.done = Some(done_tx);

        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(this.inner.config.debounce_window).await;
            this.run_batch().await;
        });

        done_rx
    }

    async fn wait_for_batch(&self, mut done: watch::Receiver<bool>) {
        match self.inner.config.poll_delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => {
                if done.wait_for(|finished| *finished).await.is_err() {
                    warn!("Batch ended without signalling completion");
                }
            }
        }
    }

    async fn run_batch(&self) {
        let (addresses, done) = {
            let mut pending = self.inner.pending.lock().await;
            pending.queued.clear();
            (std::mem::take(&mut pending.addresses), pending.done.take())
        };

        info!(count = addresses.len(), "Processing batch");
        let users = self.inner.client.lookup(&addresses).await;
        let resolved_at = Utc::now();

        // One enrichment query per identity, even if it is linked to many addresses
        let mut notable_by_fid: HashMap<u64, bool> = HashMap::new();
        for (address, user) in &users {
            let is_notable = *notable_by_fid
                .entry(user.fid)
                .or_insert_with(|| self.inner.notable.is_notable(user.fid));
            let identity = ResolvedIdentity::from_farcaster_user(user, is_notable, resolved_at);
            debug!(%address, name = %identity.primary_name, "Cached identity");
            self.inner.cache.insert(address.clone(), identity).await;
        }

        if let Some(misses) = &self.inner.misses {
            for address in addresses.iter().filter(|a| !users.contains_key(*a)) {
                misses.insert(address.clone(), ()).await;
            }
        }

        self.publish_metadata(resolved_at).await;

        if let Some(done) = done {
            done.send_replace(true);
        }
    }

    async fn publish_metadata(&self, last_update: DateTime<Utc>) {
        self.inner.cache.run_pending_tasks().await;
        let metadata = CacheMetadata {
            cache_size: self.inner.cache.entry_count(),
            last_update: Some(last_update),
        };
        debug!(cache_size = metadata.cache_size, "Publishing cache metadata");
        self.inner.metadata_tx.send_replace(metadata);
    }
}

/// Lowercase and trim an address; blank input has no identity
fn normalize_address(address: &str) -> Option<String> {
    let address = address.trim();
    if address.is_empty() {
        return None;
    }
    Some(address.to_lowercase())
}
