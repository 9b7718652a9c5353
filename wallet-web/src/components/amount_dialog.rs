//! Confirmation dialog with an ether amount field.

use leptos::prelude::*;

use crate::components::CitySelector;

#[component]
pub fn AmountDialog(
    #[prop(into)] open: Signal<bool>,
    title: &'static str,
    prompt: &'static str,
    /// Show the prefecture / municipality selector.
    needs_region: bool,
    #[prop(into)] amount: Signal<String>,
    on_amount: Callback<String>,
    on_region: Callback<Option<String>>,
    on_cancel: Callback<()>,
    on_confirm: Callback<()>,
) -> impl IntoView {
    view! {
        <Show when=move || open.get()>
            <div class="dialog-backdrop">
                <div class="dialog" role="dialog">
                    <h2 class="dialog-title">{title}</h2>
                    <p class="dialog-prompt">{prompt}</p>
                    {needs_region.then(|| view! { <CitySelector on_select=on_region/> })}
                    <label class="field">
                        "Amount (ETH)"
                        <input
                            type="text"
                            inputmode="decimal"
                            prop:value=move || amount.get()
                            on:input=move |ev| on_amount.run(event_target_value(&ev))
                        />
                    </label>
                    <div class="dialog-actions">
                        <button class="btn btn-secondary" on:click=move |_| on_cancel.run(())>"Cancel"</button>
                        <button class="btn" on:click=move |_| on_confirm.run(())>"OK"</button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
