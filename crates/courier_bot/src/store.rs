//! Shared, lock-guarded state keyed by user: sessions, cancellation flags,
//! and running demo loops. Handlers and workers receive these stores
//! explicitly instead of reaching for globals.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use courier_core::Session;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::UserId;

struct SessionEntry {
    session: Session,
    last_touched: Instant,
}

/// All live conversation state. Every access goes through the inner lock,
/// and `apply` is the one critical section in which a session may change.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<UserId, SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) a conversation for the user.
    pub async fn insert(&self, user: UserId, session: Session) {
        let mut map = self.inner.lock().await;
        map.insert(
            user,
            SessionEntry {
                session,
                last_touched: Instant::now(),
            },
        );
    }

    pub async fn get(&self, user: UserId) -> Option<Session> {
        let map = self.inner.lock().await;
        map.get(&user).map(|entry| entry.session.clone())
    }

    /// Runs one state transition under the lock. Returns `None` when the
    /// user has no session, otherwise the extra value `f` produced.
    pub async fn apply<R, F>(&self, user: UserId, f: F) -> Option<R>
    where
        F: FnOnce(Session) -> (Session, R) + Send,
        R: Send,
    {
        let mut map = self.inner.lock().await;
        let entry = map.get_mut(&user)?;
        let (session, out) = f(entry.session.clone());
        entry.session = session;
        entry.last_touched = Instant::now();
        Some(out)
    }

    pub async fn remove(&self, user: UserId) {
        let mut map = self.inner.lock().await;
        map.remove(&user);
    }

    pub async fn live_count(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Drops every session idle for longer than `max_idle` and reports the
    /// affected users so callers can release related resources.
    pub async fn sweep_expired(&self, max_idle: Duration) -> Vec<UserId> {
        let mut map = self.inner.lock().await;
        let now = Instant::now();
        let expired: Vec<UserId> = map
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.last_touched) >= max_idle)
            .map(|(user, _)| *user)
            .collect();
        for user in &expired {
            map.remove(user);
        }
        expired
    }

    /// Evicts the least recently touched sessions until at most
    /// `keep_at_most` remain.
    pub async fn evict_oldest(&self, keep_at_most: usize) -> Vec<UserId> {
        let mut map = self.inner.lock().await;
        if map.len() <= keep_at_most {
            return Vec::new();
        }
        let mut by_age: Vec<(UserId, Instant)> = map
            .iter()
            .map(|(user, entry)| (*user, entry.last_touched))
            .collect();
        by_age.sort_by_key(|(_, touched)| *touched);
        let surplus = map.len() - keep_at_most;
        let evicted: Vec<UserId> = by_age.iter().take(surplus).map(|(user, _)| *user).collect();
        for user in &evicted {
            map.remove(user);
        }
        evicted
    }
}

/// One cancellation token per user. A download observes the token that was
/// current when it started; `begin` installs a fresh one, so an earlier
/// cancel request never bleeds into the next download.
#[derive(Clone, Default)]
pub struct CancelStore {
    inner: Arc<Mutex<HashMap<UserId, CancellationToken>>>,
}

impl CancelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh token at download initiation and returns it.
    pub async fn begin(&self, user: UserId) -> CancellationToken {
        let token = CancellationToken::new();
        let mut map = self.inner.lock().await;
        map.insert(user, token.clone());
        token
    }

    /// Flags the user's current download for cancellation. Returns `false`
    /// when no token is registered.
    pub async fn request_cancel(&self, user: UserId) -> bool {
        let map = self.inner.lock().await;
        match map.get(&user) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, user: UserId) {
        let mut map = self.inner.lock().await;
        map.remove(&user);
    }
}

/// A running auto-demo loop and the token that stops it.
pub struct DemoHandle {
    pub stop: CancellationToken,
    pub task: JoinHandle<()>,
}

/// At most one auto-demo per user.
#[derive(Clone, Default)]
pub struct DemoRegistry {
    inner: Arc<Mutex<HashMap<UserId, DemoHandle>>>,
}

impl DemoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_active(&self, user: UserId) -> bool {
        let map = self.inner.lock().await;
        map.get(&user)
            .map(|handle| !handle.stop.is_cancelled())
            .unwrap_or(false)
    }

    /// Registers a demo loop. Returns `false` and keeps the existing entry
    /// when one is already active for this user.
    pub async fn register(&self, user: UserId, handle: DemoHandle) -> bool {
        let mut map = self.inner.lock().await;
        match map.get(&user) {
            Some(existing) if !existing.stop.is_cancelled() => false,
            _ => {
                map.insert(user, handle);
                true
            }
        }
    }

    /// Signals the user's demo loop to stop. Returns `false` when none was
    /// active.
    pub async fn stop(&self, user: UserId) -> bool {
        let mut map = self.inner.lock().await;
        match map.remove(&user) {
            Some(handle) => {
                let was_active = !handle.stop.is_cancelled();
                handle.stop.cancel();
                was_active
            }
            None => false,
        }
    }
}
