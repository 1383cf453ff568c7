use comrak::plugins::syntect::SyntectAdapter;
use comrak::{ComrakOptions, ComrakPlugins, markdown_to_html_with_plugins};
use once_cell::sync::Lazy;

static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.footnotes = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    // Replies come from a remote model; raw HTML stays escaped.
    options.render.unsafe_ = false;
    options
});

pub fn markdown_to_html(md: &str) -> String {
    let adapter = SyntectAdapter::new(Some("base16-ocean.dark"));
    let mut plugins = ComrakPlugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&adapter);
    markdown_to_html_with_plugins(md, &MARKDOWN_OPTIONS, &plugins)
}

/// Scrolls on the next frame, after layout has the latest bubble.
const SCROLL_TO_END_JS: &str = "requestAnimationFrame(() => { const list = document.getElementById('chat-list'); if (list) { list.scrollTop = list.scrollHeight; } });";

/// Keep the newest message in view. Call after the list has rendered.
pub fn scroll_chat_to_end() {
    let _ = dioxus::document::eval(SCROLL_TO_END_JS);
}
