//! Session-scoped wallet binding.
//!
//! The binding is the only writer of the session's wallet address. Explicit
//! `connect`/`disconnect` calls and provider events both pass through the same
//! private writer, so every consumer observes one value. Writes are applied in
//! arrival order and the last write wins.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::address::WalletAddress;
use super::provider::{WalletConnection, WalletProvider};
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

struct BindingState {
    sender: watch::Sender<Option<WalletAddress>>,
    projection: Mutex<Projection>,
    telemetry: Arc<dyn TelemetrySink>,
}

/// The attached provider's task. Projected writes carry the generation they
/// were spawned with and are dropped once it is stale.
#[derive(Default)]
struct Projection {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl Projection {
    fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl BindingState {
    fn write(&self, next: Option<WalletAddress>) -> bool {
        let changed = self.sender.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                current.clone_from(&next);
                true
            }
        });

        if changed {
            match &next {
                Some(address) => tracing::info!("wallet bound to {address}"),
                None => tracing::info!("wallet binding cleared"),
            }
            self.telemetry.record(TelemetryEvent::WalletBindingChanged {
                connected: next.is_some(),
            });
        }
        changed
    }

    fn lock_projection(&self) -> MutexGuard<'_, Projection> {
        self.projection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies a provider event unless its projection has been replaced or
    /// ended. Returns whether the projection is still current.
    fn write_projected(&self, generation: u64, next: Option<WalletAddress>) -> bool {
        let projection = self.lock_projection();
        if projection.generation != generation {
            return false;
        }
        self.write(next);
        true
    }
}

impl Drop for BindingState {
    fn drop(&mut self) {
        self.projection
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}

/// Shared handle to the session's wallet binding.
///
/// Clones refer to the same binding; inject a clone into every consumer that
/// needs to read or observe it.
#[derive(Clone)]
pub struct WalletBinding {
    state: Arc<BindingState>,
}

impl std::fmt::Debug for WalletBinding {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("WalletBinding")
            .field("address", &self.current())
            .finish_non_exhaustive()
    }
}

impl Default for WalletBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletBinding {
    /// Creates a disconnected binding.
    #[must_use]
    pub fn new() -> Self {
        Self::with_telemetry(Arc::new(NoopTelemetrySink))
    }

    /// Creates a disconnected binding that reports changes to `telemetry`.
    #[must_use]
    pub fn with_telemetry(telemetry: Arc<dyn TelemetrySink>) -> Self {
        let (sender, _receiver) = watch::channel(None);
        Self {
            state: Arc::new(BindingState {
                sender,
                projection: Mutex::new(Projection::default()),
                telemetry,
            }),
        }
    }

    /// Binds `address`. Blank input clears the binding instead.
    pub fn connect(&self, address: &str) {
        self.state.write(WalletAddress::new(address));
    }

    /// Clears the binding. Clearing an empty binding does nothing.
    pub fn disconnect(&self) {
        self.state.write(None);
    }

    /// Returns the bound address, if any.
    #[must_use]
    pub fn current(&self) -> Option<WalletAddress> {
        self.state.sender.borrow().clone()
    }

    /// Whether an address is bound.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.sender.borrow().is_some()
    }

    /// Observes binding changes. Only writes that change the value notify.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<WalletAddress>> {
        self.state.sender.subscribe()
    }

    /// Mirrors `provider`'s connection state into this binding until the
    /// session ends, the provider closes, or another provider is attached.
    ///
    /// The provider's current state is applied before this returns. When the
    /// provider closes its channel the binding is cleared. Events from a
    /// replaced provider are never applied, even if already in flight.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn attach_provider(&self, provider: &dyn WalletProvider) {
        let mut connection = provider.connection();
        let mut projection = self.state.lock_projection();
        projection.cancel();

        let generation = projection.generation;
        self.state.write(connection.borrow_and_update().bound_address());
        projection.task = Some(tokio::spawn(project(
            Arc::downgrade(&self.state),
            generation,
            connection,
        )));
    }

    /// Stops mirroring any provider and clears the binding.
    ///
    /// No provider event is applied after this returns.
    pub fn end_session(&self) {
        let mut projection = self.state.lock_projection();
        projection.cancel();
        self.state.write(None);
    }
}

async fn project(
    state: Weak<BindingState>,
    generation: u64,
    mut connection: watch::Receiver<WalletConnection>,
) {
    loop {
        let closed = connection.changed().await.is_err();
        let next = if closed {
            tracing::debug!("wallet provider closed; clearing binding");
            None
        } else {
            connection.borrow_and_update().bound_address()
        };

        let Some(binding) = state.upgrade() else {
            return;
        };
        if !binding.write_projected(generation, next) || closed {
            return;
        }
    }
}
