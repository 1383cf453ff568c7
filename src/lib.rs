pub mod ai;
pub mod config;
pub mod session;
pub mod store;
pub mod theme;
pub mod transcript;
pub mod types;

#[cfg(feature = "ui")]
pub mod ui;
#[cfg(feature = "ui")]
pub mod views;

pub use session::{Draft, RejectReason, Session, SubmitOutcome};
