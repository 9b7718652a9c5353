//! # Provider Gateway
//!
//! Abstraction over the injected wallet provider (EIP-1193 `window.ethereum` in
//! the browser, a scripted mock in tests).
//!
//! The session runs on a single-threaded event loop, so the trait is declared
//! with `#[async_trait(?Send)]` and listeners are `Rc` closures.
//!
//! ## Listener lifetime
//!
//! [`ProviderGateway::add_listener`] returns a [`ListenerId`] naming the exact
//! registration. [`ListenerGuard`] keeps those ids and hands them back to
//! [`ProviderGateway::remove_listener`] when dropped, so tearing a view down always
//! releases the listeners it registered and nothing else.

use std::fmt;
use std::rc::Rc;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::Serialize;

use crate::error::ProviderError;

/// Events emitted by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The selected accounts changed; the first entry is the primary account.
    AccountsChanged(Vec<String>),
    /// The wallet switched networks.
    ChainChanged,
}

impl ProviderEvent {
    pub fn kind(&self) -> ProviderEventKind {
        match self {
            ProviderEvent::AccountsChanged(_) => ProviderEventKind::AccountsChanged,
            ProviderEvent::ChainChanged => ProviderEventKind::ChainChanged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderEventKind {
    AccountsChanged,
    ChainChanged,
}

impl ProviderEventKind {
    /// EIP-1193 event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderEventKind::AccountsChanged => "accountsChanged",
            ProviderEventKind::ChainChanged => "chainChanged",
        }
    }
}

/// Callback invoked for provider events.
pub type EventListener = Rc<dyn Fn(ProviderEvent)>;

/// Identifies one listener registration on a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// A state-changing call signed by the active account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
}

/// Mined result of a sent transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    /// `true` when the transaction executed without reverting.
    pub status: bool,
}

/// Connection to the user's wallet.
#[async_trait(?Send)]
pub trait ProviderGateway {
    /// Ask the wallet for account access. May wait on the user.
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// Identifier of the network the wallet is connected to.
    async fn network_id(&self) -> Result<u64, ProviderError>;

    /// Native balance of `address` in wei.
    async fn get_balance(&self, address: Address) -> Result<U256, ProviderError>;

    /// Read-only contract call; returns the ABI-encoded result.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError>;

    /// Submit a transaction and wait until it is mined.
    async fn send(&self, request: TransactionRequest) -> Result<TransactionReceipt, ProviderError>;

    fn add_listener(
        &self,
        kind: ProviderEventKind,
        listener: EventListener,
    ) -> Result<ListenerId, ProviderError>;

    fn remove_listener(&self, kind: ProviderEventKind, id: ListenerId);
}

/// Releases listener registrations when dropped.
pub struct ListenerGuard<P: ProviderGateway + ?Sized> {
    provider: Rc<P>,
    registrations: Vec<(ProviderEventKind, ListenerId)>,
}

impl<P: ProviderGateway + ?Sized> ListenerGuard<P> {
    pub fn new(provider: Rc<P>) -> Self {
        Self {
            provider,
            registrations: Vec::new(),
        }
    }

    /// Register `listener` and remember the registration for release.
    pub fn listen(
        &mut self,
        kind: ProviderEventKind,
        listener: EventListener,
    ) -> Result<(), ProviderError> {
        let id = self.provider.add_listener(kind, listener)?;
        self.registrations.push((kind, id));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Release every registration now.
    pub fn release(&mut self) {
        for (kind, id) in self.registrations.drain(..) {
            self.provider.remove_listener(kind, id);
        }
    }
}

impl<P: ProviderGateway + ?Sized> Drop for ListenerGuard<P> {
    fn drop(&mut self) {
        if !self.registrations.is_empty() {
            tracing::debug!("Releasing {} provider listener(s)", self.registrations.len());
            self.release();
        }
    }
}

impl<P: ProviderGateway + ?Sized> fmt::Debug for ListenerGuard<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("registrations", &self.registrations)
            .finish()
    }
}
