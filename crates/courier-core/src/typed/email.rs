//! The `email` task: compose a message and hand it to the mail relay.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::handler::Handler;
use super::task::{Task, fields};
use crate::domain::{AdmissionError, Payload, TaskError, TaskKind};
use crate::ports::{Mailer, OutgoingEmail};

/// Payload of an `email` task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTask {
    pub recipient: String,
    pub content: String,
    #[serde(default)]
    pub subject: Option<String>,
}

impl EmailTask {
    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or_default()
    }
}

impl Task for EmailTask {
    const KIND: TaskKind = TaskKind::Email;

    fn validate(payload: &Payload) -> Result<(), AdmissionError> {
        fields::require_string(payload, "recipient")?;
        fields::require_string(payload, "content")?;
        fields::optional_string(payload, "subject")?;
        Ok(())
    }
}

/// Delivers [`EmailTask`]s through a [`Mailer`].
pub struct EmailHandler {
    mailer: Arc<dyn Mailer>,
}

impl EmailHandler {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl Handler<EmailTask> for EmailHandler {
    async fn handle(&self, task: EmailTask) -> Result<String, TaskError> {
        let email = OutgoingEmail {
            subject: task.subject().to_string(),
            recipient: task.recipient,
            content: task.content,
        };
        self.mailer.send(&email).await?;
        Ok(format!("Email sent to {}", email.recipient))
    }
}
