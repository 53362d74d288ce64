use crate::error::{BotError, Result};
use crate::offer::Offer;
use serde::Deserialize;
use tracing::{info, warn};

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Link advertised in the message footer.
const GROUP_INVITE_URL: &str = "https://t.me/seugrupo";

/// Thin client over the Telegram Bot API. No bot framework: the bot only
/// ever calls sendPhoto/sendMessage against one chat.
pub struct TelegramClient {
    client: reqwest::Client,
    token: String,
    chat_id: i64,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Escapes the three characters Telegram's HTML parse mode reserves.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders the offer caption. Layout kept stable so subscribers' clients
/// show a consistent card: bold title, store line, price, call-to-action
/// link, share footer.
pub fn format_caption(offer: &Offer, final_url: &str) -> String {
    format!(
        "<b>{}</b>\n\
         🏬 Loja: {}\n\
         💰 <b>{}</b>\n\
         🔗 <a href='{}'>Clique para aproveitar</a>\n\n\
         👥 Compartilhe com amigos: <a href='{}'>Grupo de Ofertas</a>",
        escape_html(&offer.title),
        offer.store,
        escape_html(&offer.price),
        final_url,
        GROUP_INVITE_URL,
    )
}

impl TelegramClient {
    pub fn new(client: reqwest::Client, token: impl Into<String>, chat_id: i64) -> Self {
        Self {
            client,
            token: token.into(),
            chat_id,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Overrides the API host. Tests point this at a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Posts one offer to the group. Offers with an image go out as a photo
    /// with caption; a failed sendPhoto (dead image URL, usually) falls back
    /// to a plain message once.
    pub async fn send_offer(&self, offer: &Offer, final_url: &str) -> Result<()> {
        let caption = format_caption(offer, final_url);

        if let Some(image_url) = &offer.image_url {
            match self.send_photo(image_url, &caption).await {
                Ok(()) => {
                    info!(title = %offer.title, "offer sent as photo");
                    return Ok(());
                }
                Err(e) => {
                    warn!(title = %offer.title, error = %e, "sendPhoto failed, falling back to sendMessage");
                }
            }
        }

        self.send_message(&caption).await?;
        info!(title = %offer.title, "offer sent as message");
        Ok(())
    }

    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "photo": photo_url,
            "caption": caption,
            "parse_mode": "HTML",
        });
        self.call("sendPhoto", &body).await
    }

    async fn send_message(&self, text: &str) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        self.call("sendMessage", &body).await
    }

    async fn call(&self, method: &str, body: &serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            let description = serde_json::from_str::<ApiResponse>(&text)
                .ok()
                .and_then(|r| r.description)
                .unwrap_or(text);
            return Err(BotError::Telegram {
                message: format!("{method} failed with HTTP {status}: {description}"),
            });
        }

        // Telegram can answer 200 with ok=false on some client errors.
        if let Ok(parsed) = serde_json::from_str::<ApiResponse>(&text) {
            if !parsed.ok {
                return Err(BotError::Telegram {
                    message: format!(
                        "{method} rejected: {}",
                        parsed.description.unwrap_or_default()
                    ),
                });
            }
        }

        Ok(())
    }
}
