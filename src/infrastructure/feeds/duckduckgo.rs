//! DuckDuckGo instant-answer news fetch for the earnings-beat classifier.
//! Best-effort: a failed or empty lookup returns a "no news found" sentence
//! so the classifier still runs and fails the gate on weak evidence.

use async_trait::async_trait;
use chrono::{Datelike, Utc};

use crate::domain::ports::news::NewsGateway;

pub struct DuckDuckGoNews {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoNews {
    pub fn new() -> Self {
        Self::with_base_url("https://api.duckduckgo.com".to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0")
                .build()
                .unwrap_or_default(),
            base_url,
        }
    }
}

impl Default for DuckDuckGoNews {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, serde::Deserialize)]
struct InstantAnswer {
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, serde::Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text", default)]
    text: String,
}

#[async_trait]
impl NewsGateway for DuckDuckGoNews {
    async fn earnings_news(&self, ticker: &str) -> String {
        let now = Utc::now();
        let quarter = (now.month() - 1) / 3 + 1;
        let year = now.year();
        let query = format!("{ticker} earnings Q{quarter} {year} EPS beat miss");
        let fallback = format!("No news found for {ticker} Q{quarter} {year}");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("q", query.as_str()), ("format", "json"), ("no_html", "1")])
            .send()
            .await;

        let answer: InstantAnswer = match resp {
            Ok(r) => match r.json().await {
                Ok(a) => a,
                Err(e) => {
                    log::warn!("News parse failed for {ticker}: {e}");
                    return fallback;
                }
            },
            Err(e) => {
                log::warn!("News fetch failed for {ticker}: {e}");
                return fallback;
            }
        };

        if !answer.abstract_text.is_empty() {
            return answer.abstract_text;
        }
        answer
            .related_topics
            .into_iter()
            .map(|t| t.text)
            .find(|t| !t.is_empty())
            .unwrap_or(fallback)
    }
}
