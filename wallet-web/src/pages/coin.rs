//! PIYO Coin Purchase Page

use leptos::prelude::*;
use lib_session::SurfaceKind;

use crate::pages::surface::SurfacePanel;

#[component]
pub fn CoinPage() -> impl IntoView {
    view! { <SurfacePanel surface=SurfaceKind::CoinPurchase/> }
}
