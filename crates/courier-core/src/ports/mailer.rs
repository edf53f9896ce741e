//! Mailer port - the external mail-delivery collaborator.

use async_trait::async_trait;

use crate::domain::MailError;

/// A plain-text message ready to hand to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub subject: String,
    pub recipient: String,
    pub content: String,
}

/// Sends email.
///
/// Fails with [`MailError::Delivery`] when the relay rejects authentication or
/// cannot be reached. The worker records that as a task failure.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}
