//! The watchlist state container
//!
//! `WatchlistStore` is the single source of truth for "what is on my watchlist". It
//! hydrates from the local durable store at construction, switches to the remote
//! service after the first successful authenticated fetch, and applies every change
//! optimistically before the service has confirmed it.
//!
//! State lives in a `tokio::sync::watch` channel. It is only ever mutated inside
//! synchronous `send_modify` closures, so no lock is held across a network call and
//! every change reaches subscribers.
use std::sync::Arc;

use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::instrument;

use crate::{
    auth::AuthContext,
    error::WatchlistError,
    models::{unique_by_movie_id, MovieId, NewEntry, SyncMode, WatchlistEntry, WatchlistState},
    remote::RemoteWatchlistService,
    storage::LocalDurableStore,
};

mod command;
mod sequencer;

pub use command::Command;
use sequencer::{Sequencer, Ticket};

/// How a store operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Applied and written to the local durable store
    Persisted,
    /// Confirmed by the remote service; items now mirror its list
    Confirmed,
    /// Nothing to do, e.g. adding a movie that is already listed
    Unchanged,
    /// The service rejected an add and the optimistic entry was taken back out
    RolledBack,
    /// The service rejected the change and nothing was restored
    Unconfirmed,
    /// A newer command for the same movie was issued before this one settled
    Superseded,
    /// No authenticated session to fetch for
    Skipped,
    /// The fetch failed, the confirmation task died, or there was no runtime to
    /// confirm on
    Failed,
}

/// Handle to the confirmation step of an add or remove.
///
/// The optimistic change is already visible when this is returned. Dropping the
/// handle does not cancel the confirmation.
#[derive(Debug)]
pub struct Pending {
    inner: PendingInner,
}

#[derive(Debug)]
enum PendingInner {
    Settled(Outcome),
    InFlight(JoinHandle<Outcome>),
}

impl Pending {
    fn settled_with(outcome: Outcome) -> Self {
        Self {
            inner: PendingInner::Settled(outcome),
        }
    }

    fn in_flight(handle: JoinHandle<Outcome>) -> Self {
        Self {
            inner: PendingInner::InFlight(handle),
        }
    }

    /// True while the remote confirmation has not finished
    pub fn is_in_flight(&self) -> bool {
        match &self.inner {
            PendingInner::Settled(_) => false,
            PendingInner::InFlight(handle) => !handle.is_finished(),
        }
    }

    /// Waits for the confirmation step and returns its outcome
    pub async fn settled(self) -> Outcome {
        match self.inner {
            PendingInner::Settled(outcome) => outcome,
            PendingInner::InFlight(handle) => handle.await.unwrap_or_else(|e| {
                tracing::error!(error = %e, "Watchlist confirmation task failed");
                Outcome::Failed
            }),
        }
    }
}

/// Observable watchlist state with local and remote persistence
#[derive(Clone)]
pub struct WatchlistStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: watch::Sender<WatchlistState>,
    remote: Arc<dyn RemoteWatchlistService>,
    local: Arc<dyn LocalDurableStore>,
    auth: Arc<dyn AuthContext>,
    sequencer: Sequencer,
}

impl WatchlistStore {
    /// Creates a store and hydrates it from the local durable store
    pub fn new(
        remote: Arc<dyn RemoteWatchlistService>,
        local: Arc<dyn LocalDurableStore>,
        auth: Arc<dyn AuthContext>,
    ) -> Self {
        let (state, _) = watch::channel(WatchlistState::default());

        let store = Self {
            inner: Arc::new(StoreInner {
                state,
                remote,
                local,
                auth,
                sequencer: Sequencer::new(),
            }),
        };

        store.hydrate();
        store
    }

    /// Loads items from the local durable store.
    ///
    /// Absent or unreadable data yields an empty list. Once the remote service is
    /// authoritative the local copy is ignored.
    pub fn hydrate(&self) {
        if self.sync_mode() == SyncMode::Backend {
            tracing::debug!("Watchlist is synced with the service, not hydrating");
            return;
        }

        let items = unique_by_movie_id(self.inner.local.load().unwrap_or_default());
        let count = items.len();

        self.inner.state.send_if_modified(|state| {
            if state.items == items {
                return false;
            }
            state.items = items;
            true
        });

        tracing::debug!(count, "Watchlist hydrated from local storage");
    }

    /// Replaces the items with the service's list for the current user.
    ///
    /// On success the store switches to backend sync. On failure the items and the
    /// sync mode are kept and `error` is set. Without an authenticated session this
    /// does nothing.
    #[instrument(skip(self))]
    pub async fn fetch_remote(&self) -> Outcome {
        let session = self.inner.auth.session();
        let Some(user_id) = session.user_id() else {
            tracing::debug!("No authenticated session, skipping watchlist fetch");
            return Outcome::Skipped;
        };

        self.set_loading();
        let seq = self.inner.sequencer.begin_fetch();

        match self.inner.remote.fetch(user_id).await {
            Ok(items) => {
                let items = unique_by_movie_id(items);
                let count = items.len();
                let sequencer = &self.inner.sequencer;

                self.inner.state.send_modify(|state| {
                    if sequencer.mark_applied(seq) {
                        state.items = items;
                        for command in sequencer.pending() {
                            command.apply(&mut state.items);
                        }
                    }
                    state.sync_mode = SyncMode::Backend;
                    state.error = None;
                    state.is_loading = sequencer.in_flight() > 0;
                });

                tracing::info!(user_id = %user_id, count, "Watchlist synced from service");
                Outcome::Confirmed
            }
            Err(e) => {
                self.record_failure("fetch", &e);
                Outcome::Failed
            }
        }
    }

    /// Fetches from the service unless this session is already synced with it
    pub async fn ensure_synced(&self) -> Outcome {
        if self.sync_mode() == SyncMode::Backend {
            return Outcome::Unchanged;
        }
        self.fetch_remote().await
    }

    /// Adds a movie to the watchlist.
    ///
    /// The entry is visible as soon as this returns. In local mode it is also
    /// persisted before returning. In backend mode the service is asked to confirm it
    /// on a spawned task; if that fails the entry is taken back out. Adding a movie
    /// that is already listed does nothing.
    ///
    /// Every entry goes through [`NewEntry`], so the poster URL and year are resolved
    /// the same way whatever the caller passes in. Backend mode spawns onto the
    /// current tokio runtime and settles as [`Outcome::Failed`] without one.
    pub fn add(&self, entry: impl Into<NewEntry>) -> Pending {
        let entry = WatchlistEntry::from(entry.into());
        if entry.movie_id.is_empty() {
            tracing::warn!(title = %entry.title, "Ignoring watchlist entry without a movie id");
            return Pending::settled_with(Outcome::Unchanged);
        }
        self.dispatch(Command::Add(entry))
    }

    /// Removes a movie from the watchlist.
    ///
    /// The removal is visible as soon as this returns. In backend mode a failed
    /// confirmation sets `error` but does not restore the entry; the next
    /// `fetch_remote` brings back whatever the service still holds.
    pub fn remove(&self, movie_id: impl Into<MovieId>) -> Pending {
        self.dispatch(Command::Remove(movie_id.into()))
    }

    fn dispatch(&self, command: Command) -> Pending {
        let local = &self.inner.local;
        let sequencer = &self.inner.sequencer;
        let runtime = Handle::try_current().ok();
        let mut no_runtime = false;
        let mut changed = false;
        let mut ticket = None;

        self.inner.state.send_if_modified(|state| {
            if state.sync_mode == SyncMode::Backend && runtime.is_none() {
                no_runtime = true;
                return false;
            }
            changed = command.apply(&mut state.items);

            match state.sync_mode {
                SyncMode::Local => {
                    if changed {
                        local.save(&state.items);
                    }
                    changed
                }
                SyncMode::Backend => {
                    // Removals are confirmed even for entries this copy no longer holds
                    let confirm = changed || matches!(command, Command::Remove(_));
                    if confirm {
                        ticket = Some(sequencer.issue(&command));
                        state.is_loading = true;
                    }
                    confirm
                }
            }
        });

        let (Some(ticket), Some(runtime)) = (ticket, runtime) else {
            if no_runtime {
                tracing::error!(
                    op = command.name(),
                    movie_id = %command.movie_id(),
                    "No tokio runtime to confirm the watchlist change on"
                );
                return Pending::settled_with(Outcome::Failed);
            }
            if changed {
                tracing::debug!(
                    op = command.name(),
                    movie_id = %command.movie_id(),
                    "Watchlist updated locally"
                );
                return Pending::settled_with(Outcome::Persisted);
            }
            return Pending::settled_with(Outcome::Unchanged);
        };

        let user_id = self.inner.auth.session().user_id().map(str::to_owned);
        let store = self.clone();
        Pending::in_flight(runtime.spawn(async move {
            store.confirm(command, ticket, user_id).await
        }))
    }

    async fn confirm(self, command: Command, ticket: Ticket, user_id: Option<String>) -> Outcome {
        let result = match user_id.as_deref() {
            None => Err(WatchlistError::NotAuthenticated),
            Some(user_id) => match &command {
                Command::Add(entry) => self.inner.remote.add(user_id, entry).await,
                Command::Remove(movie_id) => self.inner.remote.remove(user_id, movie_id).await,
            },
        };

        let sequencer = &self.inner.sequencer;
        let mut outcome = Outcome::Superseded;
        let mut fresh = false;

        self.inner.state.send_if_modified(|state| {
            if !sequencer.settle(&ticket) {
                return false;
            }

            match &result {
                Ok(items) => {
                    // An older list must not undo what a newer one already showed
                    fresh = sequencer.mark_applied(ticket.seq);
                    if fresh {
                        state.items = unique_by_movie_id(items.clone());
                        for pending in sequencer.pending() {
                            pending.apply(&mut state.items);
                        }
                    } else {
                        command.reconcile(&mut state.items, items);
                    }
                    state.error = None;
                    outcome = Outcome::Confirmed;
                }
                Err(e) => {
                    outcome = if command.compensate(&mut state.items) {
                        Outcome::RolledBack
                    } else {
                        Outcome::Unconfirmed
                    };
                    state.error = Some(e.to_string());
                }
            }

            state.is_loading = sequencer.in_flight() > 0;
            true
        });

        match (&result, outcome) {
            (_, Outcome::Superseded) => {
                tracing::debug!(
                    op = command.name(),
                    movie_id = %ticket.movie_id,
                    "Discarding superseded watchlist confirmation"
                );
            }
            (Ok(items), _) => {
                tracing::info!(
                    op = command.name(),
                    movie_id = %ticket.movie_id,
                    count = items.len(),
                    fresh,
                    "Watchlist change confirmed"
                );
            }
            (Err(e), _) => {
                tracing::warn!(
                    op = command.name(),
                    movie_id = %ticket.movie_id,
                    error = %e,
                    auth_failure = e.is_auth_failure(),
                    reverted = outcome == Outcome::RolledBack,
                    "Watchlist change not confirmed"
                );
            }
        }

        outcome
    }

    fn set_loading(&self) {
        self.inner.state.send_modify(|state| state.is_loading = true);
    }

    fn record_failure(&self, op: &'static str, err: &WatchlistError) {
        let message = err.to_string();
        let sequencer = &self.inner.sequencer;
        self.inner.state.send_modify(|state| {
            state.error = Some(message);
            state.is_loading = sequencer.in_flight() > 0;
        });

        tracing::warn!(
            op,
            error = %err,
            auth_failure = err.is_auth_failure(),
            "Watchlist operation failed"
        );
    }

    /// True iff a listed entry has this movie id (compared in string form)
    pub fn contains(&self, movie_id: impl Into<MovieId>) -> bool {
        self.inner.state.borrow().contains(&movie_id.into())
    }

    pub fn snapshot(&self) -> WatchlistState {
        self.inner.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<WatchlistEntry> {
        self.inner.state.borrow().items.clone()
    }

    pub fn sync_mode(&self) -> SyncMode {
        self.inner.state.borrow().sync_mode
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error.clone()
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<WatchlistState> {
        self.inner.state.subscribe()
    }

    pub fn clear_error(&self) {
        self.inner
            .state
            .send_if_modified(|state| state.error.take().is_some());
    }

    /// Drops everything on logout or account deletion.
    ///
    /// Confirmations still in flight are discarded when they settle, and the local
    /// copy is overwritten with an empty list.
    pub fn reset(&self) {
        self.inner.sequencer.clear();
        self.inner
            .state
            .send_modify(|state| *state = WatchlistState::default());
        self.inner.local.save(&[]);
        tracing::info!("Watchlist reset");
    }
}
