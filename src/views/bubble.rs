use crate::types::Message;
use crate::views::shared::markdown_to_html;
use dioxus::prelude::*;

#[component]
pub fn MessageBubble(message: Message) -> Element {
    let role = message.role.as_str();
    let time = message.display_time();
    let content_html = if message.is_user() {
        String::new()
    } else {
        markdown_to_html(&message.content)
    };

    rsx! {
        div { class: "message-row {role}",
            if !message.is_user() { div { class: "diamond" } }
            div { class: "message-stack",
                div { class: "bubble {role}",
                    if message.is_user() {
                        "{message.content}"
                    } else {
                        div { class: "md", dangerous_inner_html: "{content_html}" }
                    }
                }
                if let Some(time) = time {
                    span { class: "message-timestamp", "{time}" }
                }
            }
        }
    }
}

/// Placeholder row shown while a reply is outstanding.
#[component]
pub fn PendingBubble() -> Element {
    rsx! {
        div { class: "message-row assistant",
            div { class: "diamond" }
            div { class: "message-stack",
                div { class: "bubble assistant",
                    span { class: "loading", "• • •" }
                }
            }
        }
    }
}
