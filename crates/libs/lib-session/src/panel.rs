//! Per-surface view model.
//!
//! A [`Panel`] holds what one product panel shows: the staged confirmation dialog,
//! the amount field, the last outcome message and the balance snapshot. Views
//! render from [`Panel::subscribe`] and call the async operations on user input.

use std::rc::Rc;

use tokio::sync::watch;

use crate::controller::{
    BalanceSnapshot, InsuranceBoard, TransactionInput, TransactionResult, WalletSessionController,
};
use crate::error::{Result, SessionError};
use crate::provider::ProviderGateway;
use crate::surface::{OperationKind, OperationSpec, SurfaceKind, SurfaceSpec};

/// Initial content of the amount field.
pub const DEFAULT_AMOUNT: &str = "0.0";

/// An operation waiting in the confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAction {
    pub operation: OperationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub surface: SurfaceKind,
    pub pending: Option<PendingAction>,
    /// Persists between dialog openings.
    pub amount: String,
    pub civic_code: Option<String>,
    pub message: Option<TransactionResult>,
    pub balances: BalanceSnapshot,
    pub board: Option<InsuranceBoard>,
    pub is_owner: bool,
    pub submitting: bool,
}

impl PanelState {
    fn new(surface: SurfaceKind) -> Self {
        Self {
            surface,
            pending: None,
            amount: DEFAULT_AMOUNT.to_string(),
            civic_code: None,
            message: None,
            balances: BalanceSnapshot::default(),
            board: None,
            is_owner: false,
            submitting: false,
        }
    }
}

pub struct Panel<P: ProviderGateway + ?Sized> {
    controller: Rc<WalletSessionController<P>>,
    spec: &'static SurfaceSpec,
    state_tx: watch::Sender<PanelState>,
}

impl<P: ProviderGateway + ?Sized> Panel<P> {
    pub fn new(controller: Rc<WalletSessionController<P>>, surface: SurfaceKind) -> Self {
        let (state_tx, _) = watch::channel(PanelState::new(surface));
        Self {
            controller,
            spec: surface.spec(),
            state_tx,
        }
    }

    pub fn spec(&self) -> &'static SurfaceSpec {
        self.spec
    }

    pub fn state(&self) -> PanelState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PanelState> {
        self.state_tx.subscribe()
    }

    /// Re-read every balance of this surface for the active account.
    ///
    /// Fetched fields are applied even when the refresh fails part way.
    pub async fn refresh(&self) -> Result<()> {
        let account = self.controller.account().ok_or(SessionError::NotConnected)?;

        let mut balances = self.state_tx.borrow().balances.clone();
        let balances_result = self
            .controller
            .refresh_balances(account, self.spec.balances, &mut balances)
            .await;
        self.state_tx.send_modify(|state| state.balances = balances);

        if self.spec.shows_insurance_board {
            let board = match self.controller.read_insurance_board().await {
                Ok(board) => board,
                Err(e) => {
                    // Ownership is unknown until the board reads again
                    self.state_tx.send_modify(|state| {
                        state.board = None;
                        state.is_owner = false;
                    });
                    return Err(e);
                }
            };
            let is_owner = board
                .as_ref()
                .and_then(|board| board.owner)
                .is_some_and(|owner| self.controller.account() == Some(owner));
            self.state_tx.send_modify(|state| {
                state.board = board;
                state.is_owner = is_owner;
            });
        }

        balances_result
    }

    /// Stage `operation` in the confirmation dialog.
    pub fn open_dialog(&self, operation: OperationKind) -> Result<()> {
        let op = self.operation(operation)?;
        if !op.confirm {
            return Err(SessionError::UnsupportedOperation(operation.to_string()));
        }
        self.state_tx.send_modify(|state| state.pending = Some(PendingAction { operation }));
        Ok(())
    }

    pub fn set_amount(&self, amount: impl Into<String>) {
        let amount = amount.into();
        self.state_tx.send_modify(|state| state.amount = amount);
    }

    pub fn set_civic_code(&self, civic_code: Option<String>) {
        self.state_tx.send_modify(|state| state.civic_code = civic_code);
    }

    /// Discard the staged action and refresh.
    pub async fn cancel_dialog(&self) -> Result<()> {
        self.state_tx.send_modify(|state| state.pending = None);
        self.refresh().await
    }

    /// Submit the staged action. Returns `None` when nothing was staged.
    pub async fn confirm(&self) -> Option<TransactionResult> {
        let pending = self.state_tx.borrow().pending?;
        Some(self.submit(pending.operation).await)
    }

    /// Run `operation` with the current inputs and publish its outcome.
    pub async fn submit(&self, operation: OperationKind) -> TransactionResult {
        let (op, input) = match self.operation(operation) {
            Ok(op) => {
                let state = self.state_tx.borrow();
                let input = TransactionInput {
                    amount: Some(state.amount.clone()),
                    civic_code: state.civic_code.clone(),
                };
                (*op, input)
            }
            Err(e) => {
                let result = TransactionResult {
                    operation,
                    success: false,
                    message: e.user_message(),
                };
                self.publish(result.clone());
                return result;
            }
        };

        self.state_tx.send_modify(|state| {
            state.pending = None;
            state.submitting = true;
        });

        let result = self.controller.submit_transaction(&op, &input).await;
        self.publish(result.clone());
        result
    }

    /// Dismiss the outcome message. Always refreshes.
    pub async fn close_message(&self) -> Result<()> {
        self.state_tx.send_modify(|state| state.message = None);
        self.refresh().await
    }

    /// Refresh every time the active account changes. Runs until the controller is dropped.
    pub async fn follow_account_changes(&self) {
        let mut account_rx = self.controller.subscribe_account();
        while account_rx.changed().await.is_ok() {
            let account = *account_rx.borrow_and_update();
            if account.is_none() {
                continue;
            }
            if let Err(e) = self.refresh().await {
                tracing::warn!("Refresh after account change failed: {}", e);
            }
        }
    }

    fn operation(&self, operation: OperationKind) -> Result<&'static OperationSpec> {
        self.spec
            .operation(operation)
            .ok_or_else(|| SessionError::UnsupportedOperation(operation.to_string()))
    }

    fn publish(&self, result: TransactionResult) {
        self.state_tx.send_modify(|state| {
            state.pending = None;
            state.submitting = false;
            state.message = Some(result);
        });
    }
}
