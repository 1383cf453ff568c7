use anyhow::Context;
use gemini_chat::config::{AppConfig, load_environment};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    load_environment();
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(model = %config.model, "starting gemini-chat");

    dioxus::LaunchBuilder::new()
        .with_context(config)
        .launch(gemini_chat::ui::App);
    Ok(())
}
