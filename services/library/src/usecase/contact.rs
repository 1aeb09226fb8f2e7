use tracing::info;

use crate::domain::repository::ContactMessageRepository;
use crate::domain::types::{ContactMessage, NewContactMessage, require};
use crate::error::LibraryServiceError;

pub struct ListMessagesUseCase<R: ContactMessageRepository> {
    pub repo: R,
}

impl<R: ContactMessageRepository> ListMessagesUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<ContactMessage>, LibraryServiceError> {
        self.repo.list_messages().await
    }
}

#[derive(Debug, Default)]
pub struct SendMessageInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

pub struct SendMessageUseCase<R: ContactMessageRepository> {
    pub repo: R,
}

impl<R: ContactMessageRepository> SendMessageUseCase<R> {
    pub async fn execute(
        &self,
        input: SendMessageInput,
    ) -> Result<ContactMessage, LibraryServiceError> {
        let message = self
            .repo
            .create_message(NewContactMessage {
                name: require(input.name, "name")?,
                email: require(input.email, "email")?,
                subject: require(input.subject, "subject")?,
                message: require(input.message, "message")?,
            })
            .await?;
        info!(message_id = %message.id, "contact message received");
        Ok(message)
    }
}

pub struct MarkMessageSeenUseCase<R: ContactMessageRepository> {
    pub repo: R,
}

impl<R: ContactMessageRepository> MarkMessageSeenUseCase<R> {
    pub async fn execute(&self, id: &str, seen: bool) -> Result<ContactMessage, LibraryServiceError> {
        self.repo
            .set_message_seen(id, seen)
            .await?
            .ok_or(LibraryServiceError::MessageNotFound)
    }
}

pub struct DeleteMessageUseCase<R: ContactMessageRepository> {
    pub repo: R,
}

impl<R: ContactMessageRepository> DeleteMessageUseCase<R> {
    pub async fn execute(&self, id: &str) -> Result<(), LibraryServiceError> {
        self.repo.delete_message(id).await
    }
}
