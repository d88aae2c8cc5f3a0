use async_trait::async_trait;

/// Earnings-news evidence port. Returns raw text for the beat classifier;
/// on failure the adapter returns a "no news found" sentence rather than an
/// error, so the classifier still runs (and, with weak evidence, fails the
/// gate on its own).
#[async_trait]
pub trait NewsGateway: Send + Sync {
    async fn earnings_news(&self, ticker: &str) -> String;
}
