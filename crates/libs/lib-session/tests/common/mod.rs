//! # Test Support
//!
//! Scripted in-memory wallet provider and fixtures shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use alloy_primitives::{address, Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use lib_session::contracts::{IDquake, IPiyoCoin};
use lib_session::provider::{EventListener, ListenerId, TransactionReceipt, TransactionRequest};
use lib_session::{
    ContractDirectory, ContractKind, ProviderError, ProviderEvent, ProviderEventKind, ProviderGateway,
    SessionConfig, WalletSessionController,
};

pub const NETWORK_ID: u64 = 5777;
pub const ACCOUNT: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
pub const OTHER_ACCOUNT: Address = address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");
pub const COIN: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const BANK: Address = address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512");
pub const INSURANCE: Address = address!("9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0");

pub type Selector = [u8; 4];

/// Hook run whenever a transaction is sent.
pub type SendHook = Rc<dyn Fn(&TransactionRequest)>;

/// In-memory provider that records every request and answers from a script.
pub struct MockProvider {
    accounts: RefCell<Result<Vec<String>, ProviderError>>,
    network_id: Cell<u64>,
    native_balance: Cell<U256>,
    call_responses: RefCell<HashMap<Selector, Vec<u8>>>,
    exact_responses: RefCell<HashMap<Vec<u8>, Vec<u8>>>,
    failures: RefCell<HashMap<Selector, ProviderError>>,
    reverts: RefCell<Vec<Selector>>,
    on_send: RefCell<Option<SendHook>>,
    listeners: RefCell<Vec<(ProviderEventKind, ListenerId, EventListener)>>,
    next_listener_id: Cell<u64>,
    pub balance_queries: RefCell<Vec<Address>>,
    pub calls: RefCell<Vec<(Address, Bytes)>>,
    pub sends: RefCell<Vec<TransactionRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            accounts: RefCell::new(Ok(vec![ACCOUNT.to_string().to_lowercase()])),
            network_id: Cell::new(NETWORK_ID),
            native_balance: Cell::new(ether(2)),
            call_responses: RefCell::new(HashMap::new()),
            exact_responses: RefCell::new(HashMap::new()),
            failures: RefCell::new(HashMap::new()),
            reverts: RefCell::new(Vec::new()),
            on_send: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            next_listener_id: Cell::new(1),
            balance_queries: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
            sends: RefCell::new(Vec::new()),
        }
    }

    /// Provider answering every balance getter and the insurance owner.
    pub fn with_balances() -> Self {
        let provider = Self::new();
        provider.respond(IPiyoCoin::balanceOfCall::SELECTOR, ether(100).abi_encode());
        provider.respond(
            lib_session::contracts::IPiyoBank::ethBalanceCall::SELECTOR,
            U256::from(1_500_000_000_000_000_000u64).abi_encode(),
        );
        provider.respond(
            lib_session::contracts::IPiyoBank::collateralEthCall::SELECTOR,
            ether(1).abi_encode(),
        );
        provider.respond(IDquake::premium_balanceCall::SELECTOR, U256::ZERO.abi_encode());
        provider.respond(IDquake::contractOwnerCall::SELECTOR, ACCOUNT.abi_encode());
        provider.respond(IDquake::getAgreementsLengthCall::SELECTOR, U256::ZERO.abi_encode());
        provider
    }

    pub fn set_network_id(&self, network_id: u64) {
        self.network_id.set(network_id);
    }

    pub fn reject_accounts(&self, error: ProviderError) {
        *self.accounts.borrow_mut() = Err(error);
    }

    /// Answer calls with this selector.
    pub fn respond(&self, selector: Selector, encoded: Vec<u8>) {
        self.call_responses.borrow_mut().insert(selector, encoded);
    }

    /// Answer calls with exactly this calldata.
    pub fn respond_exact(&self, calldata: Vec<u8>, encoded: Vec<u8>) {
        self.exact_responses.borrow_mut().insert(calldata, encoded);
    }

    /// Fail calls and sends with this selector.
    pub fn fail(&self, selector: Selector, error: ProviderError) {
        self.failures.borrow_mut().insert(selector, error);
    }

    /// Mine sends with this selector with a failed status.
    pub fn revert(&self, selector: Selector) {
        self.reverts.borrow_mut().push(selector);
    }

    pub fn on_send(&self, hook: SendHook) {
        *self.on_send.borrow_mut() = Some(hook);
    }

    /// Deliver `event` to every listener registered for its kind.
    pub fn emit(&self, event: ProviderEvent) {
        let kind = event.kind();
        let listeners: Vec<EventListener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .map(|(_, _, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(event.clone());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn sent_selectors(&self) -> Vec<Selector> {
        self.sends.borrow().iter().map(|tx| selector_of(&tx.data)).collect()
    }
}

#[async_trait(?Send)]
impl ProviderGateway for MockProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.accounts.borrow().clone()
    }

    async fn network_id(&self) -> Result<u64, ProviderError> {
        Ok(self.network_id.get())
    }

    async fn get_balance(&self, address: Address) -> Result<U256, ProviderError> {
        self.balance_queries.borrow_mut().push(address);
        Ok(self.native_balance.get())
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        self.calls.borrow_mut().push((to, data.clone()));
        let selector = selector_of(&data);
        if let Some(error) = self.failures.borrow().get(&selector) {
            return Err(error.clone());
        }
        if let Some(encoded) = self.exact_responses.borrow().get(&data[..]) {
            return Ok(encoded.clone().into());
        }
        self.call_responses
            .borrow()
            .get(&selector)
            .map(|encoded| encoded.clone().into())
            .ok_or_else(|| ProviderError::with_code(-32000, "execution reverted"))
    }

    async fn send(&self, request: TransactionRequest) -> Result<TransactionReceipt, ProviderError> {
        self.sends.borrow_mut().push(request.clone());
        let hook = self.on_send.borrow().clone();
        if let Some(hook) = hook {
            hook(&request);
        }

        let selector = selector_of(&request.data);
        if let Some(error) = self.failures.borrow().get(&selector) {
            return Err(error.clone());
        }
        let nonce = self.sends.borrow().len() as u8;
        Ok(TransactionReceipt {
            transaction_hash: B256::with_last_byte(nonce),
            status: !self.reverts.borrow().contains(&selector),
        })
    }

    fn add_listener(&self, kind: ProviderEventKind, listener: EventListener) -> Result<ListenerId, ProviderError> {
        let id = ListenerId(self.next_listener_id.get());
        self.next_listener_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((kind, id, listener));
        Ok(id)
    }

    fn remove_listener(&self, kind: ProviderEventKind, id: ListenerId) {
        self.listeners
            .borrow_mut()
            .retain(|(k, registered, _)| !(*k == kind && *registered == id));
    }
}

pub fn selector_of(data: &[u8]) -> Selector {
    let mut selector = [0u8; 4];
    let len = data.len().min(4);
    selector[..len].copy_from_slice(&data[..len]);
    selector
}

pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(1_000_000_000_000_000_000u64)
}

/// Every contract deployed on [`NETWORK_ID`].
pub fn test_directory() -> ContractDirectory {
    ContractDirectory::new()
        .with_deployment(ContractKind::Coin, NETWORK_ID, COIN)
        .with_deployment(ContractKind::Bank, NETWORK_ID, BANK)
        .with_deployment(ContractKind::Insurance, NETWORK_ID, INSURANCE)
}

pub fn test_controller(provider: Rc<MockProvider>) -> Rc<WalletSessionController<MockProvider>> {
    Rc::new(WalletSessionController::new(
        Some(provider),
        test_directory(),
        SessionConfig::default(),
    ))
}

/// Controller that has already completed `connect()`.
pub async fn connected_controller(provider: Rc<MockProvider>) -> Rc<WalletSessionController<MockProvider>> {
    let controller = test_controller(provider);
    controller
        .connect()
        .await
        .expect("Connecting to the mock provider should succeed in test");
    controller
}
