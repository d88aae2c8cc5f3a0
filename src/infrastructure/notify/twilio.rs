//! Twilio SMS approval channel: send the trade alert, then poll the inbox
//! for a YES/NO reply within the approval window.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::domain::error::DomainError;
use crate::domain::ports::approval::{ApprovalGateway, ApprovalRequest};

const REPLY_POLL_SECS: u64 = 15;

pub struct TwilioApproval {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_phone: String,
    user_phone: String,
    base_url: String,
}

impl TwilioApproval {
    pub fn new(account_sid: String, auth_token: String, from_phone: String, user_phone: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            account_sid,
            auth_token,
            from_phone,
            user_phone,
            base_url: "https://api.twilio.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn send_sms(&self, body: &str) -> Result<(), DomainError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("Body", body),
                ("From", &self.from_phone),
                ("To", &self.user_phone),
            ])
            .send()
            .await
            .map_err(|e| DomainError::Notification(format!("SMS send failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(DomainError::Notification(format!(
                "Twilio returned {}",
                resp.status()
            )));
        }
        let preview: String = body.chars().take(60).collect();
        info!("SMS sent: {preview}");
        Ok(())
    }

    /// Inbound replies to the agent's number, newest first.
    async fn inbound_messages(&self) -> Result<Vec<InboundMessage>, DomainError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json?To={}&PageSize=5",
            self.base_url, self.account_sid, self.from_phone
        );
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await
            .map_err(|e| DomainError::Notification(format!("Inbox poll failed: {e}")))?;

        let page: MessagePage = resp
            .json()
            .await
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        Ok(page.messages)
    }
}

#[derive(Debug, serde::Deserialize)]
struct MessagePage {
    #[serde(default)]
    messages: Vec<InboundMessage>,
}

#[derive(Debug, serde::Deserialize)]
struct InboundMessage {
    #[serde(default)]
    body: String,
    #[serde(default)]
    direction: String,
    /// RFC 2822, e.g. "Tue, 04 Mar 2025 15:01:22 +0000".
    #[serde(default)]
    date_sent: Option<String>,
}

impl InboundMessage {
    fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.date_sent
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc2822(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[async_trait]
impl ApprovalGateway for TwilioApproval {
    async fn request_approval(&self, request: &ApprovalRequest) -> Result<DateTime<Utc>, DomainError> {
        let message = format!(
            "TRADE ALERT: Short {}\nEntry: ${:.2} | Stop: ${:.2}\nAI confidence: {}% | Rules met: {}/3\nReply YES to confirm or NO to abort",
            request.ticker, request.entry_price, request.stop_loss, request.confidence, request.rules_met
        );
        self.send_sms(&message).await?;
        Ok(Utc::now())
    }

    async fn await_reply(&self, sent_at: DateTime<Utc>, timeout_secs: u64) -> bool {
        let deadline = sent_at + chrono::Duration::seconds(timeout_secs as i64);

        while Utc::now() < deadline {
            tokio::time::sleep(std::time::Duration::from_secs(REPLY_POLL_SECS)).await;

            let messages = match self.inbound_messages().await {
                Ok(msgs) => msgs,
                Err(e) => {
                    warn!("Polling SMS inbox failed: {e}");
                    continue;
                }
            };

            for msg in messages {
                let fresh = msg.sent_at().map(|ts| ts > sent_at).unwrap_or(false);
                if !fresh || msg.direction != "inbound" {
                    continue;
                }
                let body = msg.body.trim().to_uppercase();
                if body.starts_with("YES") {
                    info!("User approved trade");
                    return true;
                }
                if body.starts_with("NO") {
                    info!("User rejected trade");
                    return false;
                }
            }
        }

        warn!("Approval timeout, aborting trade");
        let _ = self
            .send_sms("Timeout: trade automatically aborted (no reply within window)")
            .await;
        false
    }

    async fn notify(&self, message: &str) -> bool {
        match self.send_sms(message).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Notify failed: {e}");
                false
            }
        }
    }
}
