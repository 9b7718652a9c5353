//! Generic product panel
//!
//! Renders one [`SurfaceKind`]: balance table, operation buttons, the amount
//! dialog and the outcome dialog. All behaviour lives in [`Panel`]; this view
//! mirrors its state into a signal and forwards user input.

use std::future::Future;
use std::rc::Rc;

use futures_util::future::abortable;
use leptos::prelude::*;
use lib_session::surface::OperationSpec;
use lib_session::{BalanceField, OperationKind, Panel, PanelState, SurfaceKind};

use crate::components::{AmountDialog, Loading, MessageDialog};
use crate::services::ethereum::BrowserProvider;
use crate::state::session::use_session_context;
use crate::utils::constants::{COIN_UNIT, NATIVE_UNIT};
use crate::utils::format::{format_balance, format_town_code, truncate_address};

type SurfaceModel = Panel<BrowserProvider>;
type PanelHandle = StoredValue<Rc<SurfaceModel>, LocalStorage>;

fn unit(field: BalanceField) -> &'static str {
    match field {
        BalanceField::Coin => COIN_UNIT,
        _ => NATIVE_UNIT,
    }
}

/// Run an async panel operation on the local executor.
fn run<F, Fut>(panel: PanelHandle, task: F)
where
    F: FnOnce(Rc<SurfaceModel>) -> Fut,
    Fut: Future<Output = ()> + 'static,
{
    leptos::task::spawn_local(task(panel.get_value()));
}

fn refresh(panel: PanelHandle, refresh_error: RwSignal<Option<String>>) {
    run(panel, move |p| async move {
        match p.refresh().await {
            Ok(()) => refresh_error.try_set(None),
            Err(e) => {
                log::warn!("Balance refresh failed: {}", e);
                refresh_error.try_set(Some(e.user_message()))
            }
        };
    });
}

#[component]
pub fn SurfacePanel(surface: SurfaceKind) -> impl IntoView {
    let session = use_session_context();
    let model = Rc::new(Panel::new(session.controller(), surface));
    let spec = model.spec();
    let state = RwSignal::new(model.state());
    let refresh_error = RwSignal::new(None::<String>);

    let mut state_rx = model.subscribe();
    let (mirror, mirror_handle) = abortable(async move {
        while state_rx.changed().await.is_ok() {
            let next = state_rx.borrow_and_update().clone();
            state.set(next);
        }
    });
    leptos::task::spawn_local(async move {
        let _ = mirror.await;
    });

    let follower = model.clone();
    let (follow, follow_handle) = abortable(async move { follower.follow_account_changes().await });
    leptos::task::spawn_local(async move {
        let _ = follow.await;
    });

    on_cleanup(move || {
        mirror_handle.abort();
        follow_handle.abort();
    });

    let panel = StoredValue::new_local(model);
    if session.controller().account().is_some() {
        refresh(panel, refresh_error);
    }

    let submit = move |kind: OperationKind| {
        run(panel, move |p| async move {
            let result = p.submit(kind).await;
            log::info!("{}: {}", kind, result.message);
        });
    };

    let trigger = move |op: OperationSpec| {
        if op.confirm {
            if let Err(e) = panel.with_value(|p| p.open_dialog(op.kind)) {
                log::warn!("{}", e);
            }
        } else {
            submit(op.kind);
        }
    };

    let on_amount = Callback::new(move |value: String| panel.with_value(|p| p.set_amount(value)));
    let on_region = Callback::new(move |code: Option<String>| panel.with_value(|p| p.set_civic_code(code)));
    let on_cancel = Callback::new(move |_: ()| {
        run(panel, |p| async move {
            if let Err(e) = p.cancel_dialog().await {
                log::warn!("Balance refresh failed: {}", e);
            }
        })
    });
    let on_confirm = Callback::new(move |_: ()| {
        run(panel, |p| async move {
            if let Some(result) = p.confirm().await {
                log::info!("{}: {}", result.operation, result.message);
            }
        })
    });
    let on_close = Callback::new(move |_: ()| {
        run(panel, move |p| async move {
            match p.close_message().await {
                Ok(()) => refresh_error.try_set(None),
                Err(e) => refresh_error.try_set(Some(e.user_message())),
            };
        })
    });

    let balance_rows = move || {
        state.with(|s: &PanelState| {
            spec.balances
                .iter()
                .map(|field| {
                    let value = format_balance(s.balances.get(*field), unit(*field));
                    view! {
                        <tr>
                            <td class="balance-label">{field.label()}</td>
                            <td class="balance-value">{value}</td>
                        </tr>
                    }
                })
                .collect_view()
        })
    };

    let insurance_board = move || {
        state.with(|s| {
            s.board.as_ref().map(|board| {
                let owner = board
                    .owner
                    .map(|o| truncate_address(&o.to_string()))
                    .unwrap_or_else(|| "-".to_string());
                let rows = board
                    .agreements
                    .iter()
                    .map(|agreement| {
                        view! {
                            <tr>
                                <td>{truncate_address(&agreement.owner.to_string())}</td>
                                <td>{format_town_code(agreement.town_code)}</td>
                                <td>{if agreement.live { "Active" } else { "Cancelled" }}</td>
                            </tr>
                        }
                    })
                    .collect_view();
                view! {
                    <div class="insurance-board">
                        <p class="board-owner">"Contract owner: " {owner}</p>
                        <table class="board-table">
                            <thead>
                                <tr><th>"Insured"</th><th>"Region"</th><th>"Status"</th></tr>
                            </thead>
                            <tbody>{rows}</tbody>
                        </table>
                    </div>
                }
            })
        })
    };

    let primary = spec.primary;
    let secondary_button = move || {
        spec.secondary.map(|op| {
            view! { <button class="btn btn-secondary" on:click=move |_| trigger(op)>{op.label}</button> }
        })
    };
    // Only the contract owner sees the force-cancel action
    let owner_button = move || {
        let op = spec.owner_action?;
        state
            .with(|s| s.is_owner)
            .then(|| view! { <button class="btn btn-danger" on:click=move |_| trigger(op)>{op.label}</button> })
    };

    let ready = move || session.is_connected() && session.account().is_some();

    view! {
        <Show when=ready fallback=|| view! { <Loading/> }>
            <div class="card surface">
                <h1 class="card-title">{spec.title}</h1>
                <table class="balance-table">
                    <tbody>{balance_rows}</tbody>
                </table>
                {move || refresh_error.get().map(|e| view! { <p class="refresh-error">{e}</p> })}
                <div class="actions">
                    <button class="btn btn-outline" on:click=move |_| refresh(panel, refresh_error)>"Refresh"</button>
                    <button class="btn" on:click=move |_| trigger(primary)>{primary.label}</button>
                    {secondary_button}
                    {owner_button}
                </div>
                {move || state.with(|s| s.submitting).then(|| view! { <p class="pending">"Waiting for confirmation..."</p> })}
                {insurance_board}
            </div>
        </Show>
        <AmountDialog
            open=Signal::derive(move || state.with(|s| s.pending.is_some()))
            title=primary.label
            prompt=spec.amount_prompt
            needs_region=primary.needs_region
            amount=Signal::derive(move || state.with(|s| s.amount.clone()))
            on_amount=on_amount
            on_region=on_region
            on_cancel=on_cancel
            on_confirm=on_confirm
        />
        <MessageDialog
            message=Signal::derive(move || state.with(|s| s.message.as_ref().map(|m| m.message.clone())))
            success=Signal::derive(move || state.with(|s| s.message.as_ref().is_some_and(|m| m.success)))
            on_close=on_close
        />
    }
}
