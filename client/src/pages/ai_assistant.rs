//! AI assistant page for asking questions about CRM data.
//!
//! SYSTEM CONTEXT
//! ==============
//! Posts `{message, history}` to the configured assistant endpoint with the
//! user's access token and renders replies as sanitized markdown. When no
//! endpoint is configured the page explains that instead of a form.

#[cfg(test)]
#[path = "ai_assistant_test.rs"]
mod ai_assistant_test;

use leptos::prelude::*;
use pulldown_cmark::{Event, Options, Parser, html};

use crate::app::use_services;
use crate::net::api::ask_assistant;
use crate::pages::spawn_with;
use crate::state::assistant::{AssistantRole, AssistantState};

#[component]
pub fn AiAssistantPage() -> impl IntoView {
    let services = use_services();
    let assistant_url = services.with_value(|s| s.as_ref().and_then(|s| s.config.ai_assistant_url.clone()));
    let state = RwSignal::new(AssistantState::default());
    let input = RwSignal::new(String::new());
    let messages_ref = NodeRef::<leptos::html::Div>::new();

    Effect::new(move || {
        let _ = state.with(|s| s.messages.len());

        #[cfg(feature = "hydrate")]
        {
            if let Some(el) = messages_ref.get() {
                el.set_scroll_top(el.scroll_height());
            }
        }
    });

    let url = StoredValue::new(assistant_url.clone());
    let do_send = move || {
        let Some(url) = url.get_value() else {
            return;
        };
        let Some((prompt, history)) = state.try_update(|s| s.begin_prompt(&input.get_untracked())).flatten() else {
            return;
        };
        input.set(String::new());
        spawn_with(services, move |services| async move {
            let reply = services
                .session
                .authorized(|token| async move { ask_assistant(&url, &token, &prompt, &history).await })
                .await
                .map_err(|err| format!("Assistant request failed: {err}"));
            let _ = state.try_update(|s| s.finish(reply));
        });
    };

    let on_keydown = move |ev: leptos::ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            do_send();
        }
    };
    let can_send = move || !input.get().trim().is_empty() && !state.with(|s| s.loading);

    if assistant_url.is_none() {
        return view! {
            <div class="ai-page">
                <p class="empty-state">"The AI assistant is not configured for this workspace."</p>
            </div>
        }
        .into_any();
    }

    view! {
        <div class="ai-page">
            <div class="ai-page__messages" node_ref=messages_ref>
                {move || {
                    let messages = state.with(|s| s.messages.clone());
                    if messages.is_empty() {
                        return view! {
                            <div class="ai-page__empty">"Ask about your contacts, deals, or tasks."</div>
                        }
                            .into_any();
                    }
                    messages
                        .into_iter()
                        .map(|msg| {
                            let is_assistant = msg.role == AssistantRole::Assistant;
                            let is_error = msg.role == AssistantRole::Error;
                            view! {
                                <div
                                    class="ai-page__message"
                                    class:ai-page__message--assistant=is_assistant
                                    class:ai-page__message--error=is_error
                                >
                                    {if is_assistant {
                                        let rendered = render_markdown_html(&msg.content);
                                        view! { <div class="ai-page__markdown" inner_html=rendered></div> }.into_any()
                                    } else {
                                        view! { <span>{msg.content}</span> }.into_any()
                                    }}
                                </div>
                            }
                        })
                        .collect::<Vec<_>>()
                        .into_any()
                }}
                {move || state.with(|s| s.loading).then(|| view! { <div class="ai-page__loading">"Thinking..."</div> })}
            </div>

            <div class="ai-page__input-row">
                <textarea
                    class="ai-page__input"
                    rows="2"
                    placeholder="Ask the assistant..."
                    disabled=move || state.with(|s| s.loading)
                    prop:value=move || input.get()
                    on:input=move |ev| input.set(event_target_value(&ev))
                    on:keydown=on_keydown
                ></textarea>
                <button class="btn btn--primary" on:click=move |_| do_send() disabled=move || !can_send()>
                    "Send"
                </button>
            </div>
        </div>
    }
    .into_any()
}

/// Markdown to HTML with raw HTML dropped.
pub(crate) fn render_markdown_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).filter_map(|event| match event {
        Event::Html(_) | Event::InlineHtml(_) => None,
        other => Some(other),
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}
