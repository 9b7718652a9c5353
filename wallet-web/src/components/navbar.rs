//! Navigation Bar Component

use leptos::prelude::*;
use leptos_router::components::A;

use crate::utils::constants::APP_TITLE;

#[component]
pub fn Navbar() -> impl IntoView {
    view! {
        <nav>
            <div class="nav-inner">
                <A href="/" attr:class="nav-link-clean">
                    <span class="nav-title">{APP_TITLE}</span>
                </A>
                <div class="nav-links">
                    <A href="/">"Deposit"</A>
                    <A href="/loan">"Loan"</A>
                    <A href="/insurance">"Insurance"</A>
                    <A href="/coin">"PIYO Coin"</A>
                </div>
            </div>
        </nav>
    }
}
