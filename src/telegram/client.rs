use crate::error::TransportError;
use crate::transport::{ChatId, ChatTransport, Reply};
use async_trait::async_trait;
use dompet_schema::{
    AnswerCallbackQueryRequest, DeleteWebhookRequest, GetUpdatesRequest, Message,
    SendMessageRequest, SetWebhookRequest, TelegramResponse, Update,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Update kinds the bot subscribes to.
pub const ALLOWED_UPDATES: [&str; 2] = ["message", "callback_query"];

/// Slack on top of the long-poll timeout before the HTTP call gives up.
const POLL_SLACK: Duration = Duration::from_secs(10);

/// Bot API client. Outbound messages share one rate limiter.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_url: Url,
    bot_path: Arc<str>,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl TelegramClient {
    pub fn new(http: reqwest::Client, api_url: Url, bot_token: &str, send_rate_per_sec: u32) -> Self {
        let rate = NonZeroU32::new(send_rate_per_sec).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rate)));
        Self {
            http,
            api_url,
            bot_path: Arc::from(format!("bot{bot_token}")),
            limiter,
        }
    }

    fn method_url(&self, method: &str) -> Result<Url, TransportError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(&self.bot_path)
            .push(method);
        Ok(url)
    }

    async fn call<B, T>(
        &self,
        method: &'static str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http.post(self.method_url(method)?).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        // The URL carries the bot token; strip it from errors before they are logged.
        let resp = request.send().await.map_err(reqwest::Error::without_url)?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(reqwest::Error::without_url)?;

        let envelope: TelegramResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(TransportError::Api {
                    code: i64::from(status.as_u16()),
                    description: format!("{:.100}", String::from_utf8_lossy(&bytes)),
                });
            }
        };

        if !envelope.ok {
            let err = TransportError::Api {
                code: envelope
                    .error_code
                    .unwrap_or_else(|| i64::from(status.as_u16())),
                description: envelope.description.unwrap_or_default(),
            };
            warn!(method, error = %err, "Telegram call rejected");
            return Err(err);
        }
        envelope.result.ok_or_else(|| TransportError::Api {
            code: i64::from(status.as_u16()),
            description: format!("{method} returned no result"),
        })
    }

    pub async fn send_message(&self, chat_id: ChatId, reply: &Reply) -> Result<(), TransportError> {
        self.limiter.until_ready().await;
        let body = SendMessageRequest {
            chat_id,
            text: reply.text.clone(),
            reply_markup: reply.keyboard.clone(),
        };
        let sent: Message = self.call("sendMessage", &body, None).await?;
        debug!(chat_id, message_id = sent.message_id, "Message sent");
        Ok(())
    }

    /// Long-polls for updates after `offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        let body = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: allowed_updates(),
        };
        let timeout = Duration::from_secs(timeout_secs) + POLL_SLACK;
        self.call("getUpdates", &body, Some(timeout)).await
    }

    pub async fn set_webhook(&self, url: &Url, secret: Option<&str>) -> Result<(), TransportError> {
        let body = SetWebhookRequest {
            url: url.to_string(),
            secret_token: secret.map(str::to_string),
            allowed_updates: allowed_updates(),
        };
        let _: bool = self.call("setWebhook", &body, None).await?;
        Ok(())
    }

    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<(), TransportError> {
        let body = DeleteWebhookRequest {
            drop_pending_updates,
        };
        let _: bool = self.call("deleteWebhook", &body, None).await?;
        Ok(())
    }

    /// Stops the client's button spinner.
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TransportError> {
        let body = AnswerCallbackQueryRequest {
            callback_query_id: callback_query_id.to_string(),
            text: None,
        };
        let _: bool = self.call("answerCallbackQuery", &body, None).await?;
        Ok(())
    }
}

fn allowed_updates() -> Vec<String> {
    ALLOWED_UPDATES.iter().map(ToString::to_string).collect()
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send(&self, chat_id: ChatId, reply: &Reply) -> Result<(), TransportError> {
        self.send_message(chat_id, reply).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_urls_keep_the_token_as_one_segment() {
        let client = TelegramClient::new(
            reqwest::Client::new(),
            Url::parse("https://api.telegram.org/").unwrap(),
            "123456:ABC-def",
            25,
        );
        assert_eq!(
            client.method_url("sendMessage").unwrap().as_str(),
            "https://api.telegram.org/bot123456:ABC-def/sendMessage"
        );
    }

    #[test]
    fn zero_rate_is_clamped() {
        let client = TelegramClient::new(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:1/tg").unwrap(),
            "t",
            0,
        );
        assert_eq!(
            client.method_url("getUpdates").unwrap().path(),
            "/tg/bott/getUpdates"
        );
    }
}
