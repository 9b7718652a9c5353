//! Deposit & Withdraw Page

use leptos::prelude::*;
use lib_session::SurfaceKind;

use crate::pages::surface::SurfacePanel;

#[component]
pub fn DepositPage() -> impl IntoView {
    view! { <SurfacePanel surface=SurfaceKind::Deposit/> }
}
