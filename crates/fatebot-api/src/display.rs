//! `DisplaySurface` over the chat gateway's REST API.

use std::time::Duration;

use async_trait::async_trait;
use fatebot_core::channel::{ChannelId, MessageId};
use fatebot_core::display::{DisplayError, DisplaySurface};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct MessageBody<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct CreatedMessage {
    id: String,
}

/// Sends, edits, and pins scene messages through the chat gateway.
#[derive(Debug, Clone)]
pub struct HttpDisplaySurface {
    client: reqwest::Client,
    base_url: String,
    authorization: Option<String>,
}

impl HttpDisplaySurface {
    /// Creates a client for the gateway at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        authorization: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            authorization,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        match &self.authorization {
            Some(value) => builder.header(AUTHORIZATION, value),
            None => builder,
        }
    }

    /// Sends the request. A 404 becomes `NotFound(message_id)` when the call
    /// targets an existing message.
    async fn execute(
        &self,
        builder: RequestBuilder,
        target: Option<MessageId>,
    ) -> Result<Response, DisplayError> {
        let response = builder
            .send()
            .await
            .map_err(|e| DisplayError::Transport(e.to_string()))?;
        let status = response.status();

        match (status, target) {
            (StatusCode::NOT_FOUND, Some(message_id)) => Err(DisplayError::NotFound(message_id)),
            (status, _) if status.is_success() => Ok(response),
            (status, _) => Err(DisplayError::Transport(format!(
                "gateway responded with {status}"
            ))),
        }
    }
}

#[async_trait]
impl DisplaySurface for HttpDisplaySurface {
    async fn edit_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: &str,
    ) -> Result<(), DisplayError> {
        let builder = self
            .request(
                Method::PATCH,
                &format!("/channels/{channel_id}/messages/{message_id}"),
            )
            .json(&MessageBody { content });
        self.execute(builder, Some(message_id)).await?;
        debug!(%channel_id, %message_id, "display message edited");
        Ok(())
    }

    async fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> Result<MessageId, DisplayError> {
        let builder = self
            .request(Method::POST, &format!("/channels/{channel_id}/messages"))
            .json(&MessageBody { content });
        let created: CreatedMessage = self
            .execute(builder, None)
            .await?
            .json()
            .await
            .map_err(|e| DisplayError::Transport(format!("unreadable message response: {e}")))?;
        let message_id = created.id.parse().map(MessageId).map_err(|_| {
            DisplayError::Transport(format!("gateway returned invalid message id {:?}", created.id))
        })?;
        debug!(%channel_id, %message_id, "display message sent");
        Ok(message_id)
    }

    async fn pin_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), DisplayError> {
        let builder = self.request(
            Method::PUT,
            &format!("/channels/{channel_id}/pins/{message_id}"),
        );
        self.execute(builder, Some(message_id)).await?;
        Ok(())
    }

    async fn unpin_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), DisplayError> {
        let builder = self.request(
            Method::DELETE,
            &format!("/channels/{channel_id}/pins/{message_id}"),
        );
        self.execute(builder, Some(message_id)).await?;
        Ok(())
    }
}
