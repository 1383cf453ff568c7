pub mod bubble;
pub mod chat;
pub mod setup;
pub mod shared;

pub use bubble::MessageBubble;
pub use chat::ChatView;
pub use setup::ApiKeySetup;
