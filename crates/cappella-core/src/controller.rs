//! Profile sync controller
//!
//! Owns the published [`SyncState`] and mediates every transport call.
//! At most one fetch or update runs at a time; an operation started while
//! another is in flight is rejected with [`ControllerError::Busy`] and
//! leaves the published state alone.

use crate::config::ClientConfig;
use crate::error::{ControllerError, Operation, TransportError, TransportResult};
use crate::profile::{Profile, ProfileUpdate, SyncState};
use crate::transport::{HttpTransport, ProfileTransport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Controller behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Append the transport error detail to published error messages
    pub detailed_errors: bool,
}

impl From<&ClientConfig> for ControllerOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            detailed_errors: config.detailed_errors,
        }
    }
}

/// Per-session data guarded by the operation lock
#[derive(Debug, Default)]
struct Session {
    /// Id from the last successful fetch or update
    profile_id: Option<String>,
}

struct Inner {
    transport: Arc<dyn ProfileTransport>,
    state: watch::Sender<SyncState>,
    session: Arc<Mutex<Session>>,
    closed: AtomicBool,
    options: ControllerOptions,
}

impl Inner {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn lock(&self) -> Result<OwnedMutexGuard<Session>, ControllerError> {
        if self.is_closed() {
            return Err(ControllerError::Closed);
        }
        Arc::clone(&self.session)
            .try_lock_owned()
            .map_err(|_| ControllerError::Busy)
    }

    /// Publish unless the controller was shut down in the meantime
    fn publish(&self, state: SyncState) {
        if self.is_closed() {
            debug!(%state, "Controller closed, discarding state");
            return;
        }
        debug!(%state, "Publishing sync state");
        self.state.send_replace(state);
    }

    fn error_message(&self, err: &TransportError, op: Operation) -> String {
        let message = err.user_message(op);
        if self.options.detailed_errors {
            format!("{message}: {err}")
        } else {
            message
        }
    }

    fn resolve(
        &self,
        session: &mut Session,
        op: Operation,
        result: TransportResult<Profile>,
    ) -> SyncState {
        let state = match result {
            Ok(profile) => {
                session.profile_id = Some(profile.id.clone());
                SyncState::Success(profile)
            }
            Err(err) => {
                warn!(operation = ?op, code = err.code(), error = %err, "Profile operation failed");
                SyncState::Error(self.error_message(&err, op))
            }
        };
        self.publish(state.clone());
        state
    }

    async fn fetch(&self, session: &mut Session) -> SyncState {
        self.publish(SyncState::Loading);
        let result = self.transport.fetch_profile().await;
        self.resolve(session, Operation::Fetch, result)
    }

    async fn update(&self, session: &mut Session, id: &str, update: &ProfileUpdate) -> SyncState {
        let result = self.transport.update_profile(id, update).await;
        self.resolve(session, Operation::Update, result)
    }
}

/// Wait for an operation task, surfacing its panic if it had one
async fn join_operation(handle: JoinHandle<SyncState>) -> Result<SyncState, ControllerError> {
    match handle.await {
        Ok(state) => Ok(state),
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => {
            warn!(error = %err, "Profile operation task cancelled");
            Err(ControllerError::Interrupted)
        }
    }
}

/// Stateful mediator between a presentation layer and the transport
///
/// Dropping the controller shuts it down: operations still in flight run
/// to completion but publish nothing.
pub struct ProfileSyncController {
    inner: Arc<Inner>,
}

impl ProfileSyncController {
    /// Create an idle controller in the `Loading` state without fetching
    pub fn new<T>(transport: T, options: ControllerOptions) -> Self
    where
        T: ProfileTransport + 'static,
    {
        let (state, _) = watch::channel(SyncState::Loading);
        Self {
            inner: Arc::new(Inner {
                transport: Arc::new(transport),
                state,
                session: Arc::new(Mutex::new(Session::default())),
                closed: AtomicBool::new(false),
                options,
            }),
        }
    }

    /// Create a controller and start the initial fetch on the current runtime
    ///
    /// The fetch holds the operation lock from the moment this returns, so
    /// an immediate `refresh` or `request_update` sees `Busy`.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime
    pub fn spawn<T>(transport: T, options: ControllerOptions) -> Self
    where
        T: ProfileTransport + 'static,
    {
        let controller = Self::new(transport, options);
        let inner = Arc::clone(&controller.inner);
        match inner.lock() {
            Ok(mut session) => {
                tokio::spawn(async move {
                    inner.fetch(&mut session).await;
                });
            }
            Err(err) => warn!(error = %err, "Initial profile fetch not started"),
        }
        controller
    }

    /// Build an HTTP-backed controller from configuration and start fetching
    ///
    /// # Errors
    /// Returns an error if the HTTP transport cannot be built
    pub fn connect(config: &ClientConfig) -> TransportResult<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::spawn(transport, ControllerOptions::from(config)))
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.inner.state.borrow().clone()
    }

    /// Receive every published state from now on
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    /// Whether a fetch or update is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.inner.session.try_lock().is_err()
    }

    /// Id that the next update will target, if a profile has been loaded.
    /// `None` while an operation holds the session.
    #[must_use]
    pub fn profile_id(&self) -> Option<String> {
        self.inner
            .session
            .try_lock()
            .ok()
            .and_then(|session| session.profile_id.clone())
    }

    /// Wait until the state is no longer `Loading` and return it
    pub async fn settled(&self) -> SyncState {
        let mut receiver = self.subscribe();
        let settled = receiver
            .wait_for(|state| !state.is_loading())
            .await
            .map(|state| (*state).clone());
        match settled {
            Ok(state) => state,
            // The sender lives as long as `self`, so this is unreachable in practice
            Err(_) => self.state(),
        }
    }

    /// Re-issue the profile fetch
    ///
    /// The fetch runs on its own task: dropping the returned future does not
    /// cancel it, and its result is still published.
    ///
    /// # Errors
    /// Returns `Busy` if an operation is in flight, `Closed` after shutdown
    pub async fn refresh(&self) -> Result<SyncState, ControllerError> {
        let mut session = self.inner.lock()?;
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move { inner.fetch(&mut session).await });
        join_operation(handle).await
    }

    /// Submit edited values for the loaded profile
    ///
    /// The state becomes `Loading` immediately, then `Success` with the
    /// server's version of the profile or `Error`. Like `refresh`, the
    /// update runs on its own task and survives the caller going away.
    ///
    /// # Errors
    /// Returns `Busy` if an operation is in flight, `NoProfileLoaded` if no
    /// fetch has succeeded yet, `Closed` after shutdown
    pub async fn request_update(&self, update: ProfileUpdate) -> Result<SyncState, ControllerError> {
        let mut session = self.inner.lock()?;
        let id = session
            .profile_id
            .clone()
            .ok_or(ControllerError::NoProfileLoaded)?;

        self.inner.publish(SyncState::Loading);
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move { inner.update(&mut session, &id, &update).await });
        join_operation(handle).await
    }

    /// Stop publishing; later operations are refused with `Closed`
    pub fn shutdown(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            debug!("Profile controller shut down");
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl Drop for ProfileSyncController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ProfileSyncController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileSyncController")
            .field("state", &*self.inner.state.borrow())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
