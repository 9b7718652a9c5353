//! Session state management

use std::rc::Rc;

use leptos::prelude::*;
use lib_session::{ContractDirectory, ContractKind, SessionConfig, SessionState, WalletSessionController};

use crate::services::ethereum::BrowserProvider;

pub type Controller = WalletSessionController<BrowserProvider>;

const COIN_ARTIFACT: &str = include_str!("../../contracts/PiyoCoin.json");
const BANK_ARTIFACT: &str = include_str!("../../contracts/PiyoBank.json");
const INSURANCE_ARTIFACT: &str = include_str!("../../contracts/Dquake.json");

/// Global session context
#[derive(Clone, Copy)]
pub struct SessionContext {
    controller: StoredValue<Rc<Controller>, LocalStorage>,
    pub state: RwSignal<SessionState>,
    /// Connection failure shown instead of the panels.
    pub error: RwSignal<Option<String>>,
}

impl SessionContext {
    fn new(config: SessionConfig) -> Self {
        let directory = ContractDirectory::from_artifacts([
            (ContractKind::Coin, COIN_ARTIFACT),
            (ContractKind::Bank, BANK_ARTIFACT),
            (ContractKind::Insurance, INSURANCE_ARTIFACT),
        ])
        .unwrap_or_else(|e| {
            log::error!("Invalid contract artifacts: {}", e);
            ContractDirectory::new()
        });

        let provider = BrowserProvider::detect(config.receipt_poll_interval_ms).map(Rc::new);
        let controller = Rc::new(WalletSessionController::new(provider, directory, config));

        Self {
            controller: StoredValue::new_local(controller),
            state: RwSignal::new(SessionState::Disconnected),
            error: RwSignal::new(None),
        }
    }

    pub fn controller(&self) -> Rc<Controller> {
        self.controller.get_value()
    }

    pub fn is_connected(&self) -> bool {
        self.state.with(|state| state.is_connected())
    }

    pub fn account(&self) -> Option<String> {
        self.state.with(|state| match state {
            SessionState::Connected { account, .. } => account.map(|a| a.to_string()),
            _ => None,
        })
    }

    pub fn set_error(&self, error: String) {
        self.error.set(Some(error));
    }
}

/// Create the session and mirror controller state into a signal.
pub fn provide_session_context(config: SessionConfig) -> SessionContext {
    let context = SessionContext::new(config);
    provide_context(context);

    let mut state_rx = context.controller().subscribe_state();
    leptos::task::spawn_local(async move {
        while state_rx.changed().await.is_ok() {
            let state = state_rx.borrow_and_update().clone();
            context.state.set(state);
        }
    });

    context
}

pub fn use_session_context() -> SessionContext {
    expect_context::<SessionContext>()
}
