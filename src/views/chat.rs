use crate::ai::{GeminiBackend, InferenceClient};
use crate::config::AppConfig;
use crate::session::{Draft, Session};
use crate::types::{Attachment, Message, VOICE_MESSAGE_LABEL};
use crate::views::bubble::{MessageBubble, PendingBubble};
use crate::views::shared::scroll_chat_to_end;
use dioxus::events::Key;
use dioxus::html::HasFileData;
use dioxus::prelude::*;

#[component]
pub fn ChatView(credential: String) -> Element {
    let config = use_context::<AppConfig>();
    let session = use_signal(move || {
        Session::new(
            credential,
            InferenceClient::new(GeminiBackend::from_config(&config)),
        )
    });
    let mut messages = use_signal(Vec::<Message>::new);
    let mut pending = use_signal(|| false);
    let mut draft = use_signal(Draft::default);

    // Mirror the transcript into signals on every append.
    use_future(move || async move {
        let session = session.peek().clone();
        let mut changes = session.transcript().subscribe();
        loop {
            messages.set(session.transcript().all());
            pending.set(session.is_pending());
            if changes.changed().await.is_err() {
                break;
            }
        }
    });

    // Effects run after the render commits, so the new bubble is measured.
    use_effect(move || {
        let _ = messages.read().len();
        let _ = pending();
        scroll_chat_to_end();
    });

    let mut send_message = move || {
        if pending() || !draft.read().is_sendable() {
            return;
        }
        let outgoing = draft.write().take();
        let session = session.peek().clone();
        spawn(async move {
            let outcome = session.submit_draft(outgoing).await;
            tracing::debug!(?outcome, "submit finished");
            pending.set(session.is_pending());
        });
    };

    let pick_audio = move |ev: FormEvent| async move {
        let Some(engine) = ev.files() else {
            return;
        };
        let Some(name) = engine.files().into_iter().next() else {
            return;
        };
        match engine.read_file(&name).await {
            Some(bytes) if !bytes.is_empty() => {
                let attachment = Attachment::from_named_bytes(&name, bytes);
                tracing::debug!(?attachment, "audio attached");
                draft.write().audio = Some(attachment);
            }
            _ => tracing::warn!(file = %name, "picked audio could not be read"),
        }
    };

    let attached = draft.read().audio.is_some();

    rsx! {
        div { class: "main-container",
            div { id: "chat-list", class: "chat-list",
                for msg in messages().into_iter() {
                    MessageBubble { key: "{msg.id}", message: msg.clone() }
                }
                if pending() {
                    PendingBubble {}
                }
            }

            form { class: "composer",
                if attached {
                    div { class: "attachment-chip",
                        span { "{VOICE_MESSAGE_LABEL}" }
                        button {
                            r#type: "button",
                            disabled: pending(),
                            onclick: move |_| draft.write().audio = None,
                            "×"
                        }
                    }
                }
                div { class: "pill",
                    label { class: "attach-button", title: "Attach audio",
                        input {
                            r#type: "file",
                            accept: "audio/*",
                            hidden: true,
                            disabled: pending(),
                            onchange: pick_audio,
                        }
                        "🎙"
                    }
                    textarea {
                        rows: "1", placeholder: "Ask Gemini",
                        value: "{draft.read().text}",
                        oninput: move |ev| draft.write().text = ev.value(),
                        onkeydown: move |ev| {
                            if ev.key() == Key::Enter && !ev.modifiers().shift() {
                                ev.prevent_default();
                                send_message();
                            }
                        },
                        disabled: pending(), autofocus: true,
                    }
                    button {
                        class: "send-button", r#type: "button",
                        disabled: pending() || !draft.read().is_sendable(),
                        onclick: move |_| send_message(),
                        if pending() { "…" } else { "Send" }
                    }
                }
            }
        }
    }
}
