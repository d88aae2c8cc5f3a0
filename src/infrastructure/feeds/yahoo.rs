//! Yahoo Finance market data using the v8 chart and v10 quoteSummary APIs
//! (no auth required). Implements both the market-data and earnings-calendar
//! ports: the same upstream serves bars, daily closes, and calendar events.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::error::DomainError;
use crate::domain::ports::earnings::EarningsCalendarGateway;
use crate::domain::ports::market_data::{IntradaySnapshot, MarketDataGateway};

const MIN_INTRADAY_BARS: usize = 6;

pub struct YahooFeed {
    client: reqwest::Client,
    base_url: String,
}

impl YahooFeed {
    pub fn new() -> Self {
        Self::with_base_url("https://query1.finance.yahoo.com".to_string())
    }

    /// Test seam: point the feed at a local stub server.
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(
                    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                     AppleWebKit/537.36 (KHTML, like Gecko) \
                     Chrome/120.0.0.0 Safari/537.36",
                )
                .build()
                .unwrap_or_default(),
            base_url,
        }
    }

    async fn chart(&self, ticker: &str, range: &str, interval: &str) -> Result<ChartData, DomainError> {
        let url = format!(
            "{}/v8/finance/chart/{ticker}?range={range}&interval={interval}",
            self.base_url
        );
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::DataUnavailable(format!("Yahoo request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(DomainError::DataUnavailable(format!(
                "Yahoo API returned {} for {ticker}",
                resp.status()
            )));
        }

        let data: ChartResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Parse(e.to_string()))?;

        if let Some(err) = data.chart.error {
            return Err(DomainError::DataUnavailable(format!("Yahoo error: {err}")));
        }

        data.chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| DomainError::DataUnavailable(format!("No chart results for {ticker}")))
    }

    /// Close series with nulls (halted bars) dropped.
    fn closes(data: &ChartData) -> Vec<f64> {
        data.indicators
            .quote
            .first()
            .map(|q| q.close.iter().flatten().copied().collect())
            .unwrap_or_default()
    }
}

impl Default for YahooFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, serde::Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, serde::Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
struct ChartData {
    meta: ChartMeta,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
    #[serde(default)]
    regular_market_day_high: Option<f64>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, serde::Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, serde::Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryResult,
}

#[derive(Debug, serde::Deserialize)]
struct QuoteSummaryResult {
    result: Option<Vec<QuoteSummaryData>>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryData {
    calendar_events: Option<CalendarEvents>,
}

#[derive(Debug, serde::Deserialize)]
struct CalendarEvents {
    earnings: Option<EarningsBlock>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct EarningsBlock {
    #[serde(default)]
    earnings_date: Vec<RawTimestamp>,
}

#[derive(Debug, serde::Deserialize)]
struct RawTimestamp {
    raw: Option<i64>,
}

#[async_trait]
impl MarketDataGateway for YahooFeed {
    async fn intraday_snapshot(&self, ticker: &str) -> Result<Option<IntradaySnapshot>, DomainError> {
        let data = self.chart(ticker, "1d", "5m").await?;
        let prices = Self::closes(&data);
        if prices.len() < MIN_INTRADAY_BARS {
            log::warn!("Insufficient intraday bars for {ticker} (got {})", prices.len());
            return Ok(None);
        }
        let volumes: Vec<f64> = data
            .indicators
            .quote
            .first()
            .map(|q| q.volume.iter().map(|v| v.unwrap_or(0.0)).collect())
            .unwrap_or_default();

        let current_price = *prices.last().unwrap_or(&0.0);
        let today_high = data
            .meta
            .regular_market_day_high
            .unwrap_or_else(|| prices.iter().copied().fold(0.0, f64::max));

        Ok(Some(IntradaySnapshot {
            prices,
            volumes,
            today_high,
            current_price,
        }))
    }

    async fn current_price(&self, ticker: &str) -> Result<f64, DomainError> {
        let data = self.chart(ticker, "1d", "5m").await?;
        data.meta
            .regular_market_price
            .or_else(|| Self::closes(&data).last().copied())
            .filter(|p| *p > 0.0)
            .ok_or_else(|| DomainError::DataUnavailable(format!("No price for {ticker}")))
    }

    async fn latest_close(&self, ticker: &str) -> Result<f64, DomainError> {
        let data = self.chart(ticker, "5d", "1d").await?;
        Self::closes(&data)
            .last()
            .copied()
            .filter(|p| *p > 0.0)
            .ok_or_else(|| DomainError::DataUnavailable(format!("No daily close for {ticker}")))
    }

    async fn daily_closes(&self, ticker: &str, days: u32) -> Result<Vec<f64>, DomainError> {
        let data = self.chart(ticker, &format!("{days}d"), "1d").await?;
        Ok(Self::closes(&data))
    }

    async fn index_change(&self, symbol: &str) -> Result<f64, DomainError> {
        let data = self.chart(symbol, "2d", "1d").await?;
        let price = data
            .meta
            .regular_market_price
            .or_else(|| Self::closes(&data).last().copied());
        let prev = data.meta.chart_previous_close.or_else(|| {
            let closes = Self::closes(&data);
            (closes.len() >= 2).then(|| closes[closes.len() - 2])
        });

        match (price, prev) {
            (Some(p), Some(pc)) if pc > 0.0 => Ok((p - pc) / pc * 100.0),
            _ => Err(DomainError::DataUnavailable(format!(
                "No previous close for {symbol}"
            ))),
        }
    }
}

#[async_trait]
impl EarningsCalendarGateway for YahooFeed {
    async fn next_earnings_date(&self, ticker: &str) -> Result<Option<NaiveDate>, DomainError> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{ticker}?modules=calendarEvents",
            self.base_url
        );
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::DataUnavailable(format!("Yahoo request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(DomainError::DataUnavailable(format!(
                "Yahoo API returned {} for {ticker}",
                resp.status()
            )));
        }

        let data: QuoteSummaryResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Parse(e.to_string()))?;

        let ts = data
            .quote_summary
            .result
            .and_then(|r| r.into_iter().next())
            .and_then(|d| d.calendar_events)
            .and_then(|c| c.earnings)
            .and_then(|e| e.earnings_date.into_iter().next())
            .and_then(|t| t.raw);

        Ok(ts
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.date_naive()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_parse_drops_null_bars() {
        let body = r#"{
            "chart": {"result": [{
                "meta": {"regularMarketPrice": 216.0, "chartPreviousClose": 200.0},
                "indicators": {"quote": [{
                    "close": [210.0, null, 214.0, 216.0],
                    "volume": [1000, null, 900, 400]
                }]}
            }], "error": null}
        }"#;
        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        let data = parsed.chart.result.unwrap().remove(0);
        assert_eq!(YahooFeed::closes(&data), vec![210.0, 214.0, 216.0]);
    }

    #[test]
    fn test_quote_summary_parse() {
        let body = r#"{
            "quoteSummary": {"result": [{
                "calendarEvents": {"earnings": {"earningsDate": [{"raw": 1747166400}]}}
            }], "error": null}
        }"#;
        let parsed: QuoteSummaryResponse = serde_json::from_str(body).unwrap();
        let raw = parsed.quote_summary.result.unwrap()[0]
            .calendar_events
            .as_ref()
            .unwrap()
            .earnings
            .as_ref()
            .unwrap()
            .earnings_date[0]
            .raw;
        assert_eq!(raw, Some(1747166400));
    }
}
