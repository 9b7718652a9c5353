//! Cascading prefecture / municipality selector.
//!
//! The final selection is reported as a civic code, or `None` while incomplete.

use leptos::prelude::*;
use lib_session::reference::CityDirectory;

use crate::services::city_codes::load_city_directory;
use crate::state::session::use_session_context;
use crate::utils::constants::SELECT_PLACEHOLDER;

#[component]
pub fn CitySelector(on_select: Callback<Option<String>>) -> impl IntoView {
    let session = use_session_context();
    let directory = RwSignal::new(CityDirectory::default());
    let prefecture = RwSignal::new(String::new());
    let civic_code = RwSignal::new(String::new());

    // A fresh selector starts with nothing selected
    on_select.run(None);

    let url = session.controller().config().city_code_url.clone();
    leptos::task::spawn_local(async move {
        match load_city_directory(&url).await {
            Ok(loaded) => {
                directory.try_set(loaded);
            }
            Err(e) => log::error!("{}", e),
        }
    });

    let prefecture_options = move || {
        directory.with(|d| {
            d.prefectures()
                .into_iter()
                .map(|name| {
                    let name = name.to_string();
                    let value = name.clone();
                    view! { <option value=value>{name}</option> }
                })
                .collect_view()
        })
    };

    let municipality_options = move || {
        let selected = prefecture.get();
        directory.with(|d| {
            d.municipalities(&selected)
                .map(|city| {
                    view! { <option value=city.civic_code.clone()>{city.municipality.clone()}</option> }
                })
                .collect_view()
        })
    };

    view! {
        <div class="city-selector">
            <select
                prop:value=move || prefecture.get()
                on:change=move |ev| {
                    prefecture.set(event_target_value(&ev));
                    civic_code.set(String::new());
                    on_select.run(None);
                }
            >
                <option value="">{SELECT_PLACEHOLDER}</option>
                {prefecture_options}
            </select>
            <select
                prop:value=move || civic_code.get()
                on:change=move |ev| {
                    let code = event_target_value(&ev);
                    civic_code.set(code.clone());
                    on_select.run((!code.is_empty()).then_some(code));
                }
            >
                <option value="">{SELECT_PLACEHOLDER}</option>
                {municipality_options}
            </select>
        </div>
    }
}
