//! Background photo module
//!
//! This module handles:
//! - Deciding when to replace the background (policy.rs)
//! - Building photo service URLs (uri.rs)
//! - Downloading, caching and decoding photos (fetch.rs)
//! - Cross-fading between photos (transition.rs)

pub mod fetch;
pub mod policy;
pub mod transition;
pub mod uri;

pub use fetch::BackgroundImage;
pub use policy::{Completion, FetchSource, FetchTicket, RefreshDecision, RefreshState};
pub use transition::{Step, Transition};
