//! Loan & Repay Page
//!
//! Repaying grants the bank a PIYO allowance first, so the wallet asks for two
//! confirmations.

use leptos::prelude::*;
use lib_session::SurfaceKind;

use crate::pages::surface::SurfacePanel;

#[component]
pub fn LoanPage() -> impl IntoView {
    view! { <SurfacePanel surface=SurfaceKind::Loan/> }
}
