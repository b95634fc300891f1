//! Session domain module.
//!
//! # Module Structure
//!
//! - `message`: Conversation turn types (`TurnRole`, `ConversationTurn`)
//! - `state`: Per-conversation state (`ConversationStatus`, `ConversationState`)
//! - `client`: Seam to the generative backend (`GenerativeSession`)
//!
//! # Usage
//!
//! ```ignore
//! use medassist_core::session::{ConversationTurn, TurnRole};
//! use medassist_core::session::{ConversationState, ConversationStatus};
//! use medassist_core::session::GenerativeSession;
//! ```

mod client;
mod message;
mod state;

// Re-export public API
pub use client::GenerativeSession;
pub use message::{ConversationTurn, TurnRole};
pub use state::{ConversationState, ConversationStatus};
