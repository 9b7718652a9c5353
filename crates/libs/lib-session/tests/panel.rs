//! # Panel Tests
//!
//! Dialog flow, message dismissal and reactive refresh of a single panel.

mod common;

use std::rc::Rc;

use alloy_primitives::U256;
use alloy_sol_types::{SolCall, SolValue};
use common::*;
use lib_session::contracts::{IDquake, IPiyoBank};
use lib_session::panel::DEFAULT_AMOUNT;
use lib_session::{BalanceField, OperationKind, Panel, ProviderError, ProviderEvent, SessionError, SurfaceKind};
use tokio::task::LocalSet;

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_refresh_fills_surface_balances() {
    // Arrange
    let provider = Rc::new(MockProvider::with_balances());
    let controller = connected_controller(provider.clone()).await;
    let panel = Panel::new(controller, SurfaceKind::Loan);

    // Act
    panel.refresh().await.expect("Refresh should succeed in test");

    // Assert
    let state = panel.state();
    assert_eq!(state.balances.get(BalanceField::Native), Some("2"));
    assert_eq!(state.balances.get(BalanceField::Coin), Some("100"));
    assert_eq!(state.balances.get(BalanceField::Loan), Some("1"));
    assert_eq!(state.balances.get(BalanceField::Deposit), None);
    assert_eq!(state.amount, DEFAULT_AMOUNT);
}

#[tokio::test]
async fn test_refresh_requires_connection() {
    // Arrange
    let provider = Rc::new(MockProvider::with_balances());
    let controller = test_controller(provider.clone());
    let panel = Panel::new(controller, SurfaceKind::Deposit);

    // Act
    let result = panel.refresh().await;

    // Assert
    assert_eq!(result, Err(SessionError::NotConnected));
    assert!(provider.balance_queries.borrow().is_empty());
}

#[tokio::test]
async fn test_confirmed_deposit_reports_amount_once() {
    // Arrange
    let provider = Rc::new(MockProvider::with_balances());
    let controller = connected_controller(provider.clone()).await;
    let panel = Panel::new(controller, SurfaceKind::Deposit);
    panel.set_amount("1.5");
    panel.open_dialog(OperationKind::Deposit).unwrap();

    // Act
    let result = panel.confirm().await.expect("A deposit was staged");

    // Assert
    assert!(result.success);
    assert_eq!(result.message, "Deposited 1.5 ether.");
    let state = panel.state();
    assert!(state.pending.is_none());
    assert!(!state.submitting);
    assert_eq!(state.message, Some(result));
    assert_eq!(
        provider.sends.borrow()[0].value,
        Some(U256::from(1_500_000_000_000_000_000u64))
    );
}

#[tokio::test]
async fn test_confirm_without_staged_action_does_nothing() {
    // Arrange
    let provider = Rc::new(MockProvider::with_balances());
    let controller = connected_controller(provider.clone()).await;
    let panel = Panel::new(controller, SurfaceKind::Deposit);

    // Act
    let result = panel.confirm().await;

    // Assert
    assert!(result.is_none());
    assert!(provider.sends.borrow().is_empty());
}

#[tokio::test]
async fn test_close_message_refreshes_after_failure() {
    // Arrange
    let provider = Rc::new(MockProvider::with_balances());
    provider.fail(IPiyoBank::withdrawCall::SELECTOR, ProviderError::new("execution reverted"));
    let controller = connected_controller(provider.clone()).await;
    let panel = Panel::new(controller, SurfaceKind::Deposit);
    let result = panel.submit(OperationKind::Withdraw).await;
    assert_eq!(result.message, "Error: execution reverted");
    let queries_before = provider.balance_queries.borrow().len();

    // Act
    panel.close_message().await.expect("Refresh should succeed in test");

    // Assert
    assert!(panel.state().message.is_none());
    assert_eq!(provider.balance_queries.borrow().len(), queries_before + 1);
}

#[tokio::test]
async fn test_close_message_refreshes_after_success() {
    // Arrange
    let provider = Rc::new(MockProvider::with_balances());
    let controller = connected_controller(provider.clone()).await;
    let panel = Panel::new(controller, SurfaceKind::Deposit);
    panel.submit(OperationKind::Withdraw).await;

    // Act
    panel.close_message().await.expect("Refresh should succeed in test");

    // Assert
    assert!(panel.state().message.is_none());
    assert_eq!(panel.state().balances.get(BalanceField::Deposit), Some("1.5"));
}

#[tokio::test]
async fn test_cancel_dialog_discards_action_and_keeps_amount() {
    // Arrange
    let provider = Rc::new(MockProvider::with_balances());
    let controller = connected_controller(provider.clone()).await;
    let panel = Panel::new(controller, SurfaceKind::Loan);
    panel.open_dialog(OperationKind::Borrow).unwrap();
    panel.set_amount("2.5");

    // Act
    panel.cancel_dialog().await.expect("Refresh should succeed in test");

    // Assert
    let state = panel.state();
    assert!(state.pending.is_none());
    assert_eq!(state.amount, "2.5");
    assert_eq!(provider.balance_queries.borrow().len(), 1);
    assert!(provider.sends.borrow().is_empty());
}

#[tokio::test]
async fn test_open_dialog_rejects_operations_without_confirmation() {
    // Arrange
    let provider = Rc::new(MockProvider::with_balances());
    let controller = connected_controller(provider).await;
    let panel = Panel::new(controller, SurfaceKind::Deposit);

    // Act
    let withdraw = panel.open_dialog(OperationKind::Withdraw);
    let foreign = panel.open_dialog(OperationKind::Borrow);

    // Assert
    assert!(matches!(withdraw, Err(SessionError::UnsupportedOperation(_))));
    assert!(matches!(foreign, Err(SessionError::UnsupportedOperation(_))));
    assert!(panel.state().pending.is_none());
}

#[tokio::test]
async fn test_coin_purchase_sends_fixed_amount() {
    // Arrange
    let provider = Rc::new(MockProvider::with_balances());
    let controller = connected_controller(provider.clone()).await;
    let panel = Panel::new(controller, SurfaceKind::CoinPurchase);
    panel.set_amount("5");

    // Act
    let result = panel.submit(OperationKind::ExchangeToCoin).await;

    // Assert
    assert!(result.success, "{}", result.message);
    assert!(result.message.contains("0.1"));
    let sends = provider.sends.borrow();
    assert_eq!(sends[0].value, Some(U256::from(100_000_000_000_000_000u64)));
    assert_eq!(selector_of(&sends[0].data), IPiyoBank::change2piyoCall::SELECTOR);
}

#[tokio::test]
async fn test_insurance_refresh_computes_ownership() {
    // Arrange
    let provider = Rc::new(MockProvider::with_balances());
    let controller = connected_controller(provider.clone()).await;
    let panel = Panel::new(controller.clone(), SurfaceKind::Insurance);
    panel.refresh().await.expect("Refresh should succeed in test");
    assert!(panel.state().is_owner);

    // Act
    controller.on_accounts_changed(&[OTHER_ACCOUNT.to_string()]);
    panel.refresh().await.expect("Refresh should succeed in test");

    // Assert
    let state = panel.state();
    assert!(!state.is_owner);
    assert_eq!(state.board.unwrap().owner, Some(ACCOUNT));
    assert_eq!(state.balances.get(BalanceField::Premium), Some("0"));
}

#[tokio::test]
async fn test_insurance_refresh_surfaces_board_errors() {
    // Arrange
    let provider = Rc::new(MockProvider::with_balances());
    provider.fail(IDquake::contractOwnerCall::SELECTOR, ProviderError::new("owner lookup failed"));
    let controller = connected_controller(provider.clone()).await;
    let panel = Panel::new(controller, SurfaceKind::Insurance);

    // Act
    let result = panel.refresh().await;

    // Assert
    assert_eq!(result, Err(SessionError::ContractCall("owner lookup failed".to_string())));
    assert_eq!(panel.state().balances.get(BalanceField::Native), Some("2"));
}

#[tokio::test]
async fn test_failed_board_read_clears_ownership() {
    // Arrange
    let provider = Rc::new(MockProvider::with_balances());
    let controller = connected_controller(provider.clone()).await;
    let panel = Panel::new(controller.clone(), SurfaceKind::Insurance);
    panel.refresh().await.expect("Refresh should succeed in test");
    assert!(panel.state().is_owner);

    // Act
    controller.on_accounts_changed(&[OTHER_ACCOUNT.to_string()]);
    provider.fail(IDquake::contractOwnerCall::SELECTOR, ProviderError::new("rpc down"));
    let result = panel.refresh().await;

    // Assert
    assert_eq!(result, Err(SessionError::ContractCall("rpc down".to_string())));
    let state = panel.state();
    assert!(!state.is_owner);
    assert!(state.board.is_none());
}

#[tokio::test]
async fn test_account_change_triggers_refresh() {
    // Arrange
    let provider = Rc::new(MockProvider::with_balances());
    let controller = connected_controller(provider.clone()).await;
    let _guard = controller
        .register_session_listeners(|| {})
        .expect("Registering listeners should succeed in test");
    let panel = Rc::new(Panel::new(controller.clone(), SurfaceKind::Deposit));
    let local = LocalSet::new();

    local
        .run_until(async {
            let follower = panel.clone();
            tokio::task::spawn_local(async move { follower.follow_account_changes().await });
            settle().await;

            // Act
            provider.emit(ProviderEvent::AccountsChanged(vec![OTHER_ACCOUNT.to_string()]));
            settle().await;

            // Assert
            assert_eq!(provider.balance_queries.borrow().as_slice(), &[OTHER_ACCOUNT]);
            assert_eq!(panel.state().balances.get(BalanceField::Coin), Some("100"));
        })
        .await;
}

#[tokio::test]
async fn test_owner_lookup_encodes_getter() {
    // Arrange
    let provider = Rc::new(MockProvider::with_balances());
    provider.respond(IDquake::contractOwnerCall::SELECTOR, OTHER_ACCOUNT.abi_encode());
    let controller = connected_controller(provider.clone()).await;
    let panel = Panel::new(controller, SurfaceKind::Insurance);

    // Act
    let result = panel.submit(OperationKind::ForceCancelAll).await;

    // Assert
    assert!(!result.success);
    let calls = provider.calls.borrow();
    assert_eq!(calls[0].0, INSURANCE);
    assert_eq!(selector_of(&calls[0].1), IDquake::contractOwnerCall::SELECTOR);
}
