//! Loading indicator shown until the wallet session is ready.

use leptos::prelude::*;

#[component]
pub fn Loading() -> impl IntoView {
    view! {
        <div class="loading">
            <div class="spinner"></div>
            <p>"Loading Web3, accounts, and contracts..."</p>
        </div>
    }
}
