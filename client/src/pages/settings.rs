//! Settings page: appearance preferences.

use leptos::prelude::*;

use crate::state::ui::UiState;
use crate::util::dark_mode;

#[component]
pub fn SettingsPage() -> impl IntoView {
    let ui = expect_context::<RwSignal<UiState>>();

    let on_toggle = move |_| {
        let next = dark_mode::toggle(ui.get_untracked().dark_mode);
        ui.update(|u| u.dark_mode = next);
    };

    view! {
        <div class="settings-page">
            <section class="panel">
                <h2>"Appearance"</h2>
                <label class="settings-page__row">
                    <span>"Dark mode"</span>
                    <input type="checkbox" role="switch" prop:checked=move || ui.get().dark_mode on:change=on_toggle/>
                </label>
                <p class="settings-page__hint">"Saved on this device."</p>
            </section>
        </div>
    }
}
