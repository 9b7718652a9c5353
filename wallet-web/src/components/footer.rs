//! Footer Component

use leptos::prelude::*;

use crate::state::session::use_session_context;
use crate::utils::format::truncate_address;

#[component]
pub fn Footer() -> impl IntoView {
    let session = use_session_context();

    let network = move || {
        session.state.with(|state| match state {
            lib_session::SessionState::Connected { network_id, .. } => format!("Network {}", network_id),
            lib_session::SessionState::Connecting => "Connecting...".to_string(),
            lib_session::SessionState::Disconnected => "Not connected".to_string(),
        })
    };

    view! {
        <footer class="footer">
            <span>{network}</span>
            <span class="footer-account">
                {move || session.account().map(|a| truncate_address(&a)).unwrap_or_default()}
            </span>
        </footer>
    }
}
