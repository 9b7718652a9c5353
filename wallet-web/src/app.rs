//! PIYO dApp - Leptos Frontend
//!
//! Connects the injected wallet once at startup and routes between the product
//! panels.

use leptos::prelude::*;
use leptos_router::{
    components::{A, Route, Router, Routes},
    path,
};
use lib_session::session_config;

use crate::components::{Footer, Navbar};
use crate::pages::{CoinPage, DepositPage, InsurancePage, LoanPage};
use crate::state::session::provide_session_context;

/// A network change invalidates every cached handle; start over.
fn reload_page() {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) = window.location().reload() {
        log::error!("Failed to reload after network change: {:?}", e);
    }
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

#[component]
pub fn App() -> impl IntoView {
    let session = provide_session_context(session_config().clone());
    let controller = session.controller();

    let guard = match controller.register_session_listeners(reload_page) {
        Ok(guard) => Some(guard),
        Err(e) => {
            log::warn!("Wallet events unavailable: {}", e);
            None
        }
    };
    let guard = StoredValue::new_local(guard);
    on_cleanup(move || {
        guard.update_value(|guard| {
            guard.take();
        })
    });

    leptos::task::spawn_local(async move {
        match controller.connect().await {
            Ok(()) => log::info!("Wallet connected on network {:?}", controller.network_id()),
            Err(e) => {
                log::error!("Wallet connection failed: {}", e);
                if e.is_fatal() {
                    alert(&e.to_string());
                }
                session.set_error(e.user_message());
            }
        }
    });

    view! {
        <Router>
            <div class="app-container">
                <Navbar/>
                <main class="content">
                    {move || session.error.get().map(|e| view! { <div class="card error-banner">{e}</div> })}
                    <Routes fallback=|| view! { <NotFound/> }>
                        <Route path=path!("/") view=DepositPage/>
                        <Route path=path!("/loan") view=LoanPage/>
                        <Route path=path!("/insurance") view=InsurancePage/>
                        <Route path=path!("/coin") view=CoinPage/>
                    </Routes>
                </main>
                <Footer/>
            </div>
        </Router>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="card not-found">
            <h1>"404 - Page Not Found"</h1>
            <p>"The page you're looking for doesn't exist."</p>
            <A href="/">
                <span class="btn">"Back to Deposit"</span>
            </A>
        </div>
    }
}
