//! Seam between a conversation and the generative backend.

use crate::error::Result;
use async_trait::async_trait;

/// One ongoing dialogue with a text-completion model.
///
/// Implementations keep the dialogue context themselves, so a follow-up turn
/// is answered with the earlier turns in view. `submit` never panics on the
/// normal failure paths: transport and backend problems come back as
/// [`SessionError`](crate::error::SessionError) values.
///
/// Each conversation owns its own session; sessions are never shared between
/// surfaces.
#[async_trait]
pub trait GenerativeSession: Send + Sync {
    /// Sends one user turn and waits for the complete reply.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: the model's reply, verbatim
    /// - `Err(SessionError)`: `NoCredentials`, `EmptyInput`, `NetworkFailure` or `BackendError`
    async fn submit(&self, text: &str) -> Result<String>;

    /// Forgets the dialogue context so the next turn starts a new dialogue.
    ///
    /// A reply already in flight is still returned to its caller but must not
    /// re-enter the context.
    async fn reset(&self) {}
}
