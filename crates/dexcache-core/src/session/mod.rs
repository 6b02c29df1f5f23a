//! Browse session state and its background task coordination.
//!
//! `BrowseSession` is the single owner of browse state. Network work runs in
//! spawned tokio tasks that report back over a channel; results are applied
//! only when the owner drains them, so state is never shared across tasks.

pub mod controller;
pub mod events;

pub use controller::BrowseSession;
pub use events::{FetchOperation, ImageSource, SessionEvent};
