use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::exchange::TokenRefresher;
use crate::error::{GatewayError, RefreshError};
use crate::store::{clear_credentials, CredentialKey, CredentialStore};

/// New access token, or the reason the exchange failed.
pub type RefreshOutcome = Result<String, RefreshError>;

enum EpisodeState {
    Idle,
    InFlight {
        waiters: Vec<oneshot::Sender<RefreshOutcome>>,
    },
}

/// Owns the single in-flight refresh episode and the callers parked on it.
///
/// The state lock is only ever held for bookkeeping, never across an
/// `.await`, so it is a plain `std` mutex.
pub struct RefreshCoordinator {
    state: Mutex<EpisodeState>,
    episodes: AtomicU64,
}

/// What a caller gets when it needs a fresh credential.
pub enum Ticket<'a> {
    /// No episode was running; this caller performs the exchange.
    Leader(Episode<'a>),
    /// An episode is running; wait for its outcome.
    Follower(Waiter),
    /// No refresh token in storage. No episode was started.
    Unavailable,
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EpisodeState::Idle),
            episodes: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EpisodeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Join the running episode, or start one if none is running.
    pub fn enter(&self, store: &dyn CredentialStore) -> Ticket<'_> {
        let mut state = self.lock();

        if let EpisodeState::InFlight { waiters } = &mut *state {
            let (tx, rx) = oneshot::channel();
            waiters.push(tx);
            debug!(waiting = waiters.len(), "Queued behind in-flight refresh");
            return Ticket::Follower(Waiter { rx });
        }

        let Some(refresh_token) = store.get(CredentialKey::RefreshToken) else {
            return Ticket::Unavailable;
        };

        *state = EpisodeState::InFlight {
            waiters: Vec::new(),
        };
        let episode = self.episodes.fetch_add(1, Ordering::Relaxed) + 1;
        info!(episode, "Starting credential refresh");

        Ticket::Leader(Episode {
            coordinator: self,
            refresh_token,
            settled: false,
        })
    }

    /// Obtain a fresh access token, performing or awaiting the one exchange
    /// of the current episode.
    ///
    /// `rejected` is the body of the 401 that made the refresh necessary; it
    /// is handed back when there is no refresh token to try.
    pub async fn refresh(
        &self,
        store: &dyn CredentialStore,
        refresher: &dyn TokenRefresher,
        rejected: String,
    ) -> Result<String, GatewayError> {
        let outcome = match self.enter(store) {
            Ticket::Unavailable => {
                return Err(GatewayError::RefreshUnavailable { body: rejected });
            }
            Ticket::Follower(waiter) => waiter.wait().await,
            Ticket::Leader(episode) => {
                let outcome = refresher.refresh(episode.refresh_token()).await;
                episode.finish(outcome, store)
            }
        };
        outcome.map_err(|e| match e {
            RefreshError::Abandoned => GatewayError::RefreshAbandoned,
            e => GatewayError::RefreshFailed(e),
        })
    }

    /// Whether an episode is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock(), EpisodeState::InFlight { .. })
    }

    /// Number of callers parked on the running episode.
    pub fn waiting(&self) -> usize {
        match &*self.lock() {
            EpisodeState::InFlight { waiters } => waiters.len(),
            EpisodeState::Idle => 0,
        }
    }

    /// Total episodes started over the coordinator's lifetime.
    pub fn episodes_started(&self) -> u64 {
        self.episodes.load(Ordering::Relaxed)
    }

    /// Close the running episode and hand `outcome` to every parked caller.
    fn settle(&self, outcome: &RefreshOutcome) -> usize {
        let waiters = match std::mem::replace(&mut *self.lock(), EpisodeState::Idle) {
            EpisodeState::InFlight { waiters } => waiters,
            EpisodeState::Idle => Vec::new(),
        };

        let released = waiters.len();
        for waiter in waiters {
            // A receiver can only be gone if its caller's future was dropped.
            let _ = waiter.send(outcome.clone());
        }
        released
    }
}

/// The leader's handle on a running episode.
///
/// Dropping it without calling [`Episode::finish`] releases every waiter
/// with [`RefreshError::Abandoned`] and leaves the credentials untouched;
/// [`RefreshCoordinator::refresh`] reports that as `RefreshAbandoned`.
pub struct Episode<'a> {
    coordinator: &'a RefreshCoordinator,
    refresh_token: String,
    settled: bool,
}

impl Episode<'_> {
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Record the exchange result in storage, then resolve all waiters with it.
    pub fn finish(mut self, outcome: RefreshOutcome, store: &dyn CredentialStore) -> RefreshOutcome {
        match &outcome {
            Ok(access) => store.set(CredentialKey::AccessToken, access),
            Err(e) => {
                warn!("Credential refresh failed, clearing stored credentials: {e}");
                clear_credentials(store);
            }
        }

        let released = self.coordinator.settle(&outcome);
        self.settled = true;
        info!(released, success = outcome.is_ok(), "Credential refresh finished");

        outcome
    }
}

impl Drop for Episode<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Refresh episode dropped before completion; releasing waiters");
            self.coordinator.settle(&Err(RefreshError::Abandoned));
        }
    }
}

/// A caller parked on someone else's episode.
pub struct Waiter {
    rx: oneshot::Receiver<RefreshOutcome>,
}

impl Waiter {
    pub async fn wait(self) -> RefreshOutcome {
        self.rx.await.unwrap_or(Err(RefreshError::Abandoned))
    }
}
