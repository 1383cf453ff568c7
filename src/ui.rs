use crate::config::AppConfig;
use crate::store::{FileStore, SecureStore, load_credential};
use crate::theme::{BASE_CSS, ThemePreference, theme_definition};
use crate::views::{ApiKeySetup, ChatView};
use dioxus::prelude::*;
use std::sync::Arc;

/// Secure store shared through the component tree.
#[derive(Clone)]
pub struct StoreHandle(pub Arc<dyn SecureStore>);

impl StoreHandle {
    fn open(config: &AppConfig) -> Self {
        let store = match &config.store_dir {
            Some(dir) => FileStore::new(dir),
            None => FileStore::in_default_location(),
        };
        tracing::info!(root = %store.root().display(), "using secure store");
        Self(Arc::new(store))
    }
}

/// Root component. Expects the validated `AppConfig` as a root context.
#[component]
pub fn App() -> Element {
    let config = use_context::<AppConfig>();
    let store = use_context_provider(|| StoreHandle::open(&config));
    let credential = use_signal({
        let store = store.clone();
        move || load_credential(store.0.as_ref())
    });
    let theme = use_signal({
        let store = store.clone();
        move || ThemePreference::load(store.0.as_ref())
    });

    rsx! {
        ThemeStyles { preference: theme() }
        AppHeader { theme }
        ScreenBody { credential }
    }
}

#[component]
fn ThemeStyles(preference: ThemePreference) -> Element {
    // No platform appearance hook is available here; `system` resolves to light.
    let definition = theme_definition(preference.resolve(None));
    rsx! {
        style { dangerous_inner_html: "{BASE_CSS}" }
        style { dangerous_inner_html: "{definition.css}" }
    }
}

#[component]
fn AppHeader(theme: Signal<ThemePreference>) -> Element {
    rsx! {
        div { class: "header",
            span { class: "header-title", "ChatBot" }
            ThemeToggle { theme }
        }
    }
}

#[component]
fn ThemeToggle(theme: Signal<ThemePreference>) -> Element {
    let mut theme = theme;
    let store = use_context::<StoreHandle>();
    let label = theme().as_str();
    rsx! {
        button {
            class: "theme-toggle",
            r#type: "button",
            onclick: move |_| {
                let next = theme().next();
                theme.set(next);
                next.save(store.0.as_ref());
            },
            "Theme: {label}"
        }
    }
}

/// Setup screen until a key exists, then the chat.
#[component]
fn ScreenBody(credential: Signal<Option<String>>) -> Element {
    let mut credential = credential;
    match credential() {
        Some(key) => rsx! {
            ChatView { key: "{key}", credential: key.clone() }
        },
        None => rsx! {
            ApiKeySetup { on_saved: move |key: String| credential.set(Some(key)) }
        },
    }
}
