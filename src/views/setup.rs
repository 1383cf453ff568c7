use crate::store::save_credential;
use crate::ui::StoreHandle;
use dioxus::prelude::*;

/// Shown while no API key is stored. The key is only ever entered here.
#[component]
pub fn ApiKeySetup(on_saved: EventHandler<String>) -> Element {
    let store = use_context::<StoreHandle>();
    let mut key_input = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);

    rsx! {
        div { class: "setup",
            label { "Enter Gemini API Key:" }
            input {
                id: "api-key",
                r#type: "password",
                placeholder: "API Key",
                value: "{key_input}",
                oninput: move |ev| key_input.set(ev.value()),
            }
            if let Some(message) = error() {
                p { class: "setup-error", "{message}" }
            }
            button {
                class: "send-button",
                r#type: "button",
                onclick: move |_| match save_credential(store.0.as_ref(), &key_input()) {
                    Ok(key) => on_saved.call(key),
                    Err(err) => {
                        tracing::error!(error = %err, "failed to save API key");
                        error.set(Some(err.to_string()));
                    }
                },
                "Save Key"
            }
        }
    }
}
