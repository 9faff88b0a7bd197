//! Wallet binding for the active session.
//!
//! A session holds at most one bound wallet address. The binding can be driven
//! directly (`connect`/`disconnect`) or projected from an external
//! wallet-connect provider's observable connection state.

mod address;
mod binding;
mod provider;

pub use address::WalletAddress;
pub use binding::WalletBinding;
pub use provider::{ChannelWalletProvider, WalletConnection, WalletProvider};
