//! Outcome dialog for the most recent operation.

use leptos::prelude::*;

#[component]
pub fn MessageDialog(
    #[prop(into)] message: Signal<Option<String>>,
    #[prop(into)] success: Signal<bool>,
    on_close: Callback<()>,
) -> impl IntoView {
    view! {
        <Show when=move || message.with(Option::is_some)>
            <div class="dialog-backdrop">
                <div class="dialog" role="dialog">
                    <p class=move || if success.get() { "dialog-message" } else { "dialog-message error" }>
                        {move || message.get().unwrap_or_default()}
                    </p>
                    <div class="dialog-actions">
                        <button class="btn" on:click=move |_| on_close.run(())>"Close"</button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
