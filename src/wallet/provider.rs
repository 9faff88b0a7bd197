//! External wallet-connect provider surface mirrored by the wallet binding.

use tokio::sync::watch;

use super::address::WalletAddress;

/// Connection state reported by a wallet provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletConnection {
    /// Account address reported by the provider, if any.
    pub address: Option<String>,
    /// Whether the provider reports an active connection.
    pub is_connected: bool,
}

impl WalletConnection {
    /// A connected state for `address`.
    #[must_use]
    pub fn connected(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            is_connected: true,
        }
    }

    /// The disconnected state.
    #[must_use]
    pub const fn disconnected() -> Self {
        Self {
            address: None,
            is_connected: false,
        }
    }

    /// Address the binding should hold for this state.
    ///
    /// A connected state without a usable address counts as disconnected.
    #[must_use]
    pub fn bound_address(&self) -> Option<WalletAddress> {
        if !self.is_connected {
            return None;
        }
        self.address.as_deref().and_then(WalletAddress::new)
    }
}

/// A wallet-connect provider exposing an observable connection state.
pub trait WalletProvider: Send + Sync {
    /// Returns a receiver that observes the provider's connection state.
    fn connection(&self) -> watch::Receiver<WalletConnection>;
}

/// In-process provider driven by explicit calls.
///
/// Used to seed a configured wallet address and to simulate provider events.
#[derive(Debug)]
pub struct ChannelWalletProvider {
    sender: watch::Sender<WalletConnection>,
}

impl Default for ChannelWalletProvider {
    fn default() -> Self {
        Self::new(WalletConnection::disconnected())
    }
}

impl ChannelWalletProvider {
    /// Creates a provider with the given initial state.
    #[must_use]
    pub fn new(initial: WalletConnection) -> Self {
        let (sender, _receiver) = watch::channel(initial);
        Self { sender }
    }

    /// Publishes a new connection state to all observers.
    pub fn publish(&self, connection: WalletConnection) {
        self.sender.send_replace(connection);
    }

    /// Reports a connection to `address`.
    pub fn connect(&self, address: impl Into<String>) {
        self.publish(WalletConnection::connected(address));
    }

    /// Reports a disconnection.
    pub fn disconnect(&self) {
        self.publish(WalletConnection::disconnected());
    }
}

impl WalletProvider for ChannelWalletProvider {
    fn connection(&self) -> watch::Receiver<WalletConnection> {
        self.sender.subscribe()
    }
}
