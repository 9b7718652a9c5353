//! # Wallet Session Controller
//!
//! Owns the provider connection, the active account and network, the resolved
//! contract handles, and dispatches every read and transaction the panels make.
//!
//! ## State machine
//!
//! ```text
//! Disconnected ──connect()──▶ Connecting ──▶ Connected
//!      ▲                          │
//!      └── no provider / rejected ┘
//!
//! any state ──chainChanged──▶ Disconnected (session reset, page reloads)
//! ```
//!
//! A network change drops the session and bumps a generation counter. Any
//! transaction still in flight checks that counter before each send, so handles
//! resolved for the previous network are never used again.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolValue};
use futures_util::future::join_all;
use tokio::sync::watch;

use crate::config::SessionConfig;
use crate::contracts::{ContractDirectory, ContractHandle, ContractHandles, IDquake, IPiyoBank, IPiyoCoin};
use crate::error::{Result, SessionError};
use crate::provider::{
    EventListener, ListenerGuard, ProviderEvent, ProviderEventKind, ProviderGateway, TransactionReceipt,
    TransactionRequest,
};
use crate::region::RegionCode;
use crate::surface::{AmountSemantics, BalanceField, BalanceSource, OperationKind, OperationSpec, Sequencing};
use crate::units::{format_ether, parse_ether, scale_wei};

/// Connection state shared by every panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected {
        account: Option<Address>,
        network_id: u64,
    },
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected { .. })
    }
}

#[derive(Debug, Clone)]
struct Session {
    account: Option<Address>,
    network_id: u64,
    handles: ContractHandles,
}

/// Decimal ether strings per balance field, as of the last refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceSnapshot {
    fields: BTreeMap<BalanceField, String>,
}

impl BalanceSnapshot {
    pub fn get(&self, field: BalanceField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: BalanceField, wei: U256) {
        self.fields.insert(field, format_ether(wei));
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BalanceField, &str)> {
        self.fields.iter().map(|(field, value)| (*field, value.as_str()))
    }
}

/// One row of `Dquake.agreements`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agreement {
    pub owner: Address,
    pub town_code: U256,
    pub live: bool,
}

/// Insurance contract owner and every agreement it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsuranceBoard {
    pub owner: Option<Address>,
    pub agreements: Vec<Agreement>,
}

/// User input accompanying a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionInput {
    /// Decimal ether amount, for operations that take one.
    pub amount: Option<String>,
    /// Civic code, for operations that need a region.
    pub civic_code: Option<String>,
}

/// Outcome of a submitted operation, shown once in the message dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResult {
    pub operation: OperationKind,
    pub success: bool,
    pub message: String,
}

pub struct WalletSessionController<P: ProviderGateway + ?Sized> {
    provider: Option<Rc<P>>,
    directory: ContractDirectory,
    config: SessionConfig,
    session: RefCell<Option<Session>>,
    generation: Cell<u64>,
    state_tx: watch::Sender<SessionState>,
    account_tx: watch::Sender<Option<Address>>,
}

impl<P: ProviderGateway + ?Sized> WalletSessionController<P> {
    /// `provider` is `None` when no wallet is injected.
    pub fn new(provider: Option<Rc<P>>, directory: ContractDirectory, config: SessionConfig) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Disconnected);
        let (account_tx, _) = watch::channel(None);
        Self {
            provider,
            directory,
            config,
            session: RefCell::new(None),
            generation: Cell::new(0),
            state_tx,
            account_tx,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Receiver notified whenever the active account changes.
    pub fn subscribe_account(&self) -> watch::Receiver<Option<Address>> {
        self.account_tx.subscribe()
    }

    pub fn account(&self) -> Option<Address> {
        self.session.borrow().as_ref().and_then(|s| s.account)
    }

    pub fn network_id(&self) -> Option<u64> {
        self.session.borrow().as_ref().map(|s| s.network_id)
    }

    pub fn handles(&self) -> Option<ContractHandles> {
        self.session.borrow().as_ref().map(|s| s.handles.clone())
    }

    /// Incremented on every session reset.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    fn provider(&self) -> Result<Rc<P>> {
        self.provider.clone().ok_or(SessionError::ProviderUnavailable)
    }

    /// Request account access, read the network id and resolve every contract handle.
    pub async fn connect(&self) -> Result<()> {
        if self.session.borrow().is_some() {
            tracing::debug!("Session already connected");
            return Ok(());
        }

        let provider = match self.provider() {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!("No wallet provider injected");
                return Err(e);
            }
        };

        self.state_tx.send_replace(SessionState::Connecting);
        let generation = self.generation.get();

        let connected = async {
            let accounts = provider.request_accounts().await?;
            let network_id = provider.network_id().await?;
            Ok::<_, SessionError>((accounts, network_id))
        }
        .await;

        // A chainChanged during the prompt invalidates the network id just read.
        if generation != self.generation.get() {
            return Err(SessionError::NotConnected);
        }

        let (accounts, network_id) = match connected {
            Ok(connected) => connected,
            Err(e) => {
                tracing::warn!("Wallet connection failed: {}", e);
                self.state_tx.send_replace(SessionState::Disconnected);
                return Err(e);
            }
        };

        let account = primary_account(&accounts);
        let handles = self.directory.resolve_all(network_id);
        tracing::info!(
            "Connected to network {} as {}",
            network_id,
            account.map(|a| a.to_string()).unwrap_or_else(|| "<no account>".to_string())
        );

        *self.session.borrow_mut() = Some(Session {
            account,
            network_id,
            handles,
        });
        self.state_tx.send_replace(SessionState::Connected { account, network_id });
        self.account_tx.send_replace(account);
        Ok(())
    }

    /// Apply an `accountsChanged` event. The first entry becomes the active account.
    pub fn on_accounts_changed(&self, accounts: &[String]) {
        let account = primary_account(accounts);
        let network_id = {
            let mut session = self.session.borrow_mut();
            let Some(session) = session.as_mut() else {
                tracing::debug!("Ignoring account change while disconnected");
                return;
            };
            session.account = account;
            session.network_id
        };

        tracing::info!(
            "Active account changed to {}",
            account.map(|a| a.to_string()).unwrap_or_else(|| "<none>".to_string())
        );
        self.state_tx.send_replace(SessionState::Connected { account, network_id });
        self.account_tx.send_replace(account);
    }

    /// Drop the session and every handle resolved for it.
    pub fn reset_session(&self) {
        self.session.borrow_mut().take();
        self.generation.set(self.generation.get() + 1);
        tracing::info!("Wallet session reset (generation {})", self.generation.get());
        self.state_tx.send_replace(SessionState::Disconnected);
        self.account_tx.send_replace(None);
    }

    /// Read `fields` for `account` concurrently and store each result in `snapshot`.
    ///
    /// Fields whose contract has no deployment are left untouched. Successful reads
    /// are applied even when another field fails; the first failure is returned.
    pub async fn refresh_balances(
        &self,
        account: Address,
        fields: &[BalanceField],
        snapshot: &mut BalanceSnapshot,
    ) -> Result<()> {
        let provider = self.provider()?;
        let handles = self.handles().ok_or(SessionError::NotConnected)?;

        let reads = fields
            .iter()
            .map(|field| read_balance(provider.as_ref(), &handles, account, *field));
        let results = join_all(reads).await;

        let mut first_error = None;
        for (field, result) in fields.iter().zip(results) {
            match result {
                Ok(Some(wei)) => snapshot.set(*field, wei),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to read {:?} balance: {}", field, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Insurance owner and agreements, or `None` when the contract is not deployed.
    pub async fn read_insurance_board(&self) -> Result<Option<InsuranceBoard>> {
        let provider = self.provider()?;
        let handles = self.handles().ok_or(SessionError::NotConnected)?;
        let Some(address) = handles.insurance.address else {
            return Ok(None);
        };

        let owner = read_owner(provider.as_ref(), address).await?;

        let raw_length = provider
            .call(address, IDquake::getAgreementsLengthCall {}.abi_encode().into())
            .await?;
        let length = U256::abi_decode(&raw_length)?;
        let length = u64::try_from(length)
            .map_err(|_| SessionError::Decoding(format!("agreement count out of range: {}", length)))?;

        let reads = (0..length).map(|index| {
            let data: Bytes = IDquake::agreementsCall {
                index: U256::from(index),
            }
            .abi_encode()
            .into();
            let provider = provider.clone();
            async move {
                let raw = provider.call(address, data).await?;
                let (owner, town_code, live) = <(Address, U256, bool)>::abi_decode_params(&raw)?;
                Ok::<_, SessionError>(Agreement { owner, town_code, live })
            }
        });
        let agreements = join_all(reads).await.into_iter().collect::<Result<Vec<_>>>()?;

        Ok(Some(InsuranceBoard {
            owner: Some(owner),
            agreements,
        }))
    }

    /// Whether the active account owns the insurance contract.
    ///
    /// Read fresh on every call so an account change is always reflected.
    pub async fn is_owner(&self) -> Result<bool> {
        let provider = self.provider()?;
        let (account, handles) = {
            let session = self.session.borrow();
            let session = session.as_ref().ok_or(SessionError::NotConnected)?;
            (session.account, session.handles.clone())
        };
        let Some(account) = account else {
            return Ok(false);
        };
        let address = handles.insurance.dispatch_address()?;
        let owner = read_owner(provider.as_ref(), address).await?;
        Ok(owner == account)
    }

    /// Run one operation and turn its outcome into a message for the user.
    pub async fn submit_transaction(&self, op: &OperationSpec, input: &TransactionInput) -> TransactionResult {
        let outcome = self.execute(op, input).await;

        match outcome {
            Ok(message) => {
                tracing::info!("{} succeeded: {}", op.kind, message);
                TransactionResult {
                    operation: op.kind,
                    success: true,
                    message,
                }
            }
            Err(e) => {
                tracing::warn!("{} failed: {}", op.kind, e);
                TransactionResult {
                    operation: op.kind,
                    success: false,
                    message: e.user_message(),
                }
            }
        }
    }

    async fn execute(&self, op: &OperationSpec, input: &TransactionInput) -> Result<String> {
        let provider = self.provider()?;
        let generation = self.generation.get();
        let (from, handles) = {
            let session = self.session.borrow();
            let session = session.as_ref().ok_or(SessionError::NotConnected)?;
            (session.account.ok_or(SessionError::NotConnected)?, session.handles.clone())
        };

        // Inputs are validated before anything reaches the provider.
        let amount = match op.amount {
            AmountSemantics::None => None,
            AmountSemantics::Entered => Some(parse_ether(input.amount.as_deref().unwrap_or_default())?),
            AmountSemantics::Fixed => Some(self.config.coin_purchase_wei()?),
        };
        let region = if op.needs_region {
            Some(RegionCode::from_civic_code(
                input.civic_code.as_deref().unwrap_or_default(),
            )?)
        } else {
            None
        };

        if op.owner_only && !self.is_owner().await? {
            return Err(SessionError::NotOwner);
        }

        let target = handles.get(op.contract);
        let data = calldata(op.kind, region.as_ref());
        let value = if op.payable { amount } else { None };

        if op.sequencing == Sequencing::AllowanceThenCall {
            let loan = amount.unwrap_or_default();
            let allowance = scale_wei(loan, self.config.repay_allowance_multiplier)?;
            let approve = IPiyoCoin::approveCall {
                spender: target.dispatch_address()?,
                amount: allowance,
            }
            .abi_encode();
            tracing::debug!("Granting allowance of {} PYC before {}", format_ether(allowance), op.method);
            self.ensure_generation(generation)?;
            self.send(provider.as_ref(), from, &handles.coin, approve, None).await?;
        }

        self.ensure_generation(generation)?;
        let receipt = self.send(provider.as_ref(), from, target, data, value).await?;

        let shown = amount.map(format_ether);
        Ok(op.success_message(shown.as_deref(), region.as_ref(), receipt.status))
    }

    fn ensure_generation(&self, generation: u64) -> Result<()> {
        if self.generation.get() == generation {
            Ok(())
        } else {
            Err(SessionError::NotConnected)
        }
    }

    async fn send(
        &self,
        provider: &P,
        from: Address,
        handle: &ContractHandle,
        data: Vec<u8>,
        value: Option<U256>,
    ) -> Result<TransactionReceipt> {
        let request = TransactionRequest {
            from,
            to: handle.dispatch_address()?,
            data: data.into(),
            value,
        };
        let receipt = provider.send(request).await?;
        if !receipt.status {
            return Err(SessionError::ContractCall(format!(
                "Transaction {} reverted",
                receipt.transaction_hash
            )));
        }
        Ok(receipt)
    }
}

impl<P: ProviderGateway + ?Sized + 'static> WalletSessionController<P> {
    /// Subscribe to `accountsChanged` and `chainChanged`.
    ///
    /// `on_network_change` runs after the session has been reset. Dropping the
    /// returned guard removes exactly these two listeners.
    pub fn register_session_listeners(
        self: &Rc<Self>,
        on_network_change: impl Fn() + 'static,
    ) -> Result<ListenerGuard<P>> {
        let provider = self.provider()?;
        let mut guard = ListenerGuard::new(provider);

        let weak = Rc::downgrade(self);
        let on_accounts: EventListener = Rc::new(move |event| {
            if let (Some(controller), ProviderEvent::AccountsChanged(accounts)) = (weak.upgrade(), event) {
                controller.on_accounts_changed(&accounts);
            }
        });
        guard.listen(ProviderEventKind::AccountsChanged, on_accounts)?;

        let weak = Rc::downgrade(self);
        let on_chain: EventListener = Rc::new(move |_event| {
            if let Some(controller) = weak.upgrade() {
                controller.reset_session();
                on_network_change();
            }
        });
        guard.listen(ProviderEventKind::ChainChanged, on_chain)?;

        Ok(guard)
    }
}

fn primary_account(accounts: &[String]) -> Option<Address> {
    let first = accounts.first()?;
    match first.parse::<Address>() {
        Ok(address) => Some(address),
        Err(e) => {
            tracing::warn!("Ignoring malformed account {:?}: {}", first, e);
            None
        }
    }
}

fn calldata(kind: OperationKind, region: Option<&RegionCode>) -> Vec<u8> {
    match kind {
        OperationKind::Deposit => IPiyoBank::depositCall {}.abi_encode(),
        OperationKind::Withdraw => IPiyoBank::withdrawCall {}.abi_encode(),
        OperationKind::Borrow => IPiyoBank::loanCall {}.abi_encode(),
        OperationKind::Repay => IPiyoBank::payCall {}.abi_encode(),
        OperationKind::ExchangeToCoin => IPiyoBank::change2piyoCall {}.abi_encode(),
        OperationKind::CreateInsurance => IDquake::createContractCall {
            town_code: U256::from(region.map(RegionCode::value).unwrap_or_default()),
        }
        .abi_encode(),
        OperationKind::CancelInsurance => IDquake::withdrawContractCall {}.abi_encode(),
        OperationKind::ForceCancelAll => IDquake::exodusContractCall {}.abi_encode(),
    }
}

/// Getter calldata for a contract-backed balance field.
fn balance_calldata(field: BalanceField, account: Address) -> Option<Vec<u8>> {
    let data = match field {
        BalanceField::Native => return None,
        BalanceField::Coin => IPiyoCoin::balanceOfCall { account }.abi_encode(),
        BalanceField::Deposit => IPiyoBank::ethBalanceCall { account }.abi_encode(),
        BalanceField::Loan => IPiyoBank::collateralEthCall { account }.abi_encode(),
        BalanceField::Premium => IDquake::premium_balanceCall { account }.abi_encode(),
    };
    Some(data)
}

async fn read_balance<P: ProviderGateway + ?Sized>(
    provider: &P,
    handles: &ContractHandles,
    account: Address,
    field: BalanceField,
) -> Result<Option<U256>> {
    let kind = match field.source() {
        BalanceSource::Native => return Ok(Some(provider.get_balance(account).await?)),
        BalanceSource::Contract(kind) => kind,
    };
    let Some(address) = handles.get(kind).address else {
        tracing::debug!("Skipping {:?}: {} not deployed", field, kind);
        return Ok(None);
    };
    let Some(data) = balance_calldata(field, account) else {
        return Ok(None);
    };
    let raw = provider.call(address, data.into()).await?;
    Ok(Some(U256::abi_decode(&raw)?))
}

async fn read_owner<P: ProviderGateway + ?Sized>(provider: &P, insurance: Address) -> Result<Address> {
    let raw = provider
        .call(insurance, IDquake::contractOwnerCall {}.abi_encode().into())
        .await?;
    Ok(Address::abi_decode(&raw)?)
}
