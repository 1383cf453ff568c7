use crate::store::SecureStore;
use std::fmt;

/// Store key for the user's theme choice.
pub const THEME_KEY: &str = "user-theme-preference";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemePreference::Light),
            "dark" => Some(ThemePreference::Dark),
            "system" => Some(ThemePreference::System),
            _ => None,
        }
    }

    /// Toggle order: system, light, dark.
    pub fn next(self) -> Self {
        match self {
            ThemePreference::System => ThemePreference::Light,
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::System,
        }
    }

    /// `system` follows the platform scheme, light when the platform has none.
    pub fn resolve(self, system: Option<ColorScheme>) -> ColorScheme {
        match self {
            ThemePreference::Light => ColorScheme::Light,
            ThemePreference::Dark => ColorScheme::Dark,
            ThemePreference::System => system.unwrap_or(ColorScheme::Light),
        }
    }

    /// Stored preference; anything unrecognised or unreadable is `System`.
    pub fn load(store: &dyn SecureStore) -> Self {
        match store.get_item(THEME_KEY) {
            Ok(Some(value)) => Self::parse(&value).unwrap_or_default(),
            Ok(None) => Self::default(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read theme preference");
                Self::default()
            }
        }
    }

    /// Persist the preference. Failures are logged, not surfaced.
    pub fn save(self, store: &dyn SecureStore) {
        if let Err(err) = store.set_item(THEME_KEY, self.as_str()) {
            tracing::warn!(error = %err, "failed to persist theme preference");
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ThemeDefinition {
    pub css: &'static str,
}

pub fn theme_definition(scheme: ColorScheme) -> ThemeDefinition {
    match scheme {
        ColorScheme::Dark => ThemeDefinition { css: DARK_THEME },
        ColorScheme::Light => ThemeDefinition { css: LIGHT_THEME },
    }
}

/// Layout shared by both schemes.
pub const BASE_CSS: &str = r#"
body { margin: 0; font-family: -apple-system, system-ui, sans-serif; background: var(--color-bg-primary); color: var(--color-text-primary); }
.header { height: 56px; padding: 0 16px; display: flex; align-items: center; justify-content: space-between; }
.header-title { font-size: 18px; font-weight: 600; }
.theme-toggle { background: none; border: none; color: var(--color-text-muted); font-size: 14px; padding: 8px; }
.chat-list { flex: 1; overflow-y: auto; padding: 24px 8px; }
.message-row { display: flex; align-items: flex-end; margin: 8px 0; padding: 0 12px; }
.message-row.user { justify-content: flex-end; }
.message-row.assistant { justify-content: center; }
.diamond { width: 14px; height: 14px; background: var(--color-accent); transform: rotate(45deg); margin: 0 12px 0 6px; align-self: center; border-radius: 2px; }
.message-stack { max-width: 82%; display: flex; flex-direction: column; }
.message-row.user .message-stack { align-items: flex-end; }
.message-row.assistant .message-stack { align-items: flex-start; }
.bubble { padding: 12px 14px; border-radius: 20px; font-size: 15px; line-height: 20px; }
.bubble.user { background: var(--color-chat-user-bg); color: var(--color-chat-user-text); }
.bubble.assistant { background: transparent; border: 1px solid var(--color-chat-assistant-border); color: var(--color-chat-assistant-text); }
.message-timestamp { font-size: 11px; color: var(--color-timestamp); margin-top: 6px; }
.loading { margin-top: 6px; color: var(--color-timestamp); font-size: 12px; }
.composer { padding: 12px; }
.pill { display: flex; align-items: center; background: var(--color-input-bg); border: 1px solid var(--color-input-border); border-radius: 28px; padding: 8px 10px; }
.pill textarea { flex: 1; background: transparent; border: none; color: var(--color-text-primary); font-size: 16px; padding: 0 12px; resize: none; }
.attach-button { cursor: pointer; font-size: 18px; padding: 0 6px; }
.attachment-chip { display: inline-flex; align-items: center; gap: 6px; margin: 0 0 8px 12px; padding: 4px 10px; border-radius: 14px; background: var(--color-surface-muted); font-size: 13px; }
.attachment-chip button { background: none; border: none; color: var(--color-text-muted); }
.send-button { background: var(--color-surface-muted); color: var(--color-text-primary); border: none; border-radius: 18px; padding: 8px 12px; margin-left: 8px; }
.setup { padding: 16px; display: flex; flex-direction: column; gap: 12px; }
.setup input { height: 44px; background: var(--color-input-bg); color: var(--color-text-primary); border: 1px solid var(--color-input-border); border-radius: 12px; padding: 8px 12px; font-size: 16px; }
.setup-error { color: var(--color-error); font-size: 13px; }
"#;

const DARK_THEME: &str = r#"
:root {
    --color-bg-primary: #0b0b0d;
    --color-text-primary: #ffffff;
    --color-text-muted: #cfcfcf;
    --color-surface-muted: #1f1f1f;
    --color-input-border: #242526;
    --color-input-bg: #0f1113;
    --color-chat-user-bg: #2b2b2b;
    --color-chat-user-text: #ffffff;
    --color-chat-assistant-border: #222222;
    --color-chat-assistant-text: #dddddd;
    --color-timestamp: #888888;
    --color-accent: #2ea5ff;
    --color-error: #ff6b6b;
}
"#;

const LIGHT_THEME: &str = r#"
:root {
    --color-bg-primary: #ffffff;
    --color-text-primary: #000000;
    --color-text-muted: #4a4a4a;
    --color-surface-muted: #e6e6e6;
    --color-input-border: #c2c2c2;
    --color-input-bg: #f5f5f5;
    --color-chat-user-bg: #111111;
    --color-chat-user-text: #ffffff;
    --color-chat-assistant-border: #d0d0d0;
    --color-chat-assistant-text: #121212;
    --color-timestamp: #606060;
    --color-accent: #2ea5ff;
    --color-error: #c62828;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn cycles_through_all_preferences() {
        let start = ThemePreference::System;
        assert_eq!(start.next(), ThemePreference::Light);
        assert_eq!(start.next().next(), ThemePreference::Dark);
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn system_falls_back_to_light() {
        assert_eq!(ThemePreference::System.resolve(None), ColorScheme::Light);
        assert_eq!(
            ThemePreference::System.resolve(Some(ColorScheme::Dark)),
            ColorScheme::Dark
        );
        assert_eq!(
            ThemePreference::Light.resolve(Some(ColorScheme::Dark)),
            ColorScheme::Light
        );
    }

    #[test]
    fn persists_through_store() {
        let store = MemoryStore::new();
        assert_eq!(ThemePreference::load(&store), ThemePreference::System);

        ThemePreference::Dark.save(&store);
        assert_eq!(ThemePreference::load(&store), ThemePreference::Dark);
    }

    #[test]
    fn unknown_value_loads_as_system() {
        let store = MemoryStore::new();
        store.set_item(THEME_KEY, "octane").unwrap();
        assert_eq!(ThemePreference::load(&store), ThemePreference::System);
    }

    #[test]
    fn definitions_differ_per_scheme() {
        let dark = theme_definition(ColorScheme::Dark);
        let light = theme_definition(ColorScheme::Light);
        assert!(dark.css.contains("#0b0b0d"));
        assert_ne!(dark.css, light.css);
    }
}
