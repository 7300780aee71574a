//! Outbound messaging behind a trait so the pipeline and workers can be
//! tested without a live Telegram connection.

use std::path::Path;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use thiserror::Error;

use crate::UserId;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, user: UserId, text: &str) -> Result<(), TransportError>;

    async fn send_document(
        &self,
        user: UserId,
        path: &Path,
        caption: &str,
    ) -> Result<(), TransportError>;

    /// Cheap round trip to the backing service, used by the liveness worker.
    async fn self_check(&self) -> Result<(), TransportError>;
}

pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, user: UserId, text: &str) -> Result<(), TransportError> {
        self.bot.send_message(ChatId(user), text).await?;
        Ok(())
    }

    async fn send_document(
        &self,
        user: UserId,
        path: &Path,
        caption: &str,
    ) -> Result<(), TransportError> {
        self.bot
            .send_document(ChatId(user), InputFile::file(path.to_path_buf()))
            .caption(caption.to_string())
            .await?;
        Ok(())
    }

    async fn self_check(&self) -> Result<(), TransportError> {
        self.bot.get_me().await?;
        Ok(())
    }
}
