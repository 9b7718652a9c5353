//! Earthquake Insurance Page

use leptos::prelude::*;
use lib_session::SurfaceKind;

use crate::pages::surface::SurfacePanel;

#[component]
pub fn InsurancePage() -> impl IntoView {
    view! { <SurfacePanel surface=SurfaceKind::Insurance/> }
}
