use crate::errors::{EngineError, EngineResult};
use reqwest::Client;

/// Alpha Vantage client for the 10-year US Treasury yield.
/// One request per call: no polling, no retry, no caching.
#[derive(Clone)]
pub struct TreasuryClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Latest yield as a decimal fraction (4.10% -> 0.041).
#[derive(Debug, Clone, serde::Serialize)]
pub struct RateQuote {
    pub rate: f64,
    /// Observation date reported by the feed (YYYY-MM-DD)
    pub date: String,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
}

// Actual TREASURY_YIELD response format (newest first):
// {
//   "name": "Daily Treasury Yield on 10 Year Maturity",
//   "interval": "daily",
//   "unit": "percent",
//   "data": [
//     { "date": "2024-05-10", "value": "4.50" },
//     { "date": "2024-05-09", "value": "." },
//     ...
//   ]
// }
//
// Rate limiting and bad keys come back as HTTP 200 with a single
// "Note", "Information" or "Error Message" field instead of data.

#[derive(Debug, serde::Deserialize)]
pub struct TreasuryYieldResponse {
    #[allow(dead_code)]
    name: Option<String>,
    unit: Option<String>,
    data: Option<Vec<YieldObservation>>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct YieldObservation {
    date: String,
    value: String,
}

impl TreasuryClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub async fn fetch_ten_year_yield(&self) -> EngineResult<RateQuote> {
        let url = format!("{}/query", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("function", "TREASURY_YIELD"),
                ("interval", "daily"),
                ("maturity", "10year"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EngineError::RateFeed(format!("HTTP {status}: {body}")));
        }

        let body: TreasuryYieldResponse = resp
            .json()
            .await
            .map_err(|e| EngineError::RateFeed(format!("parse: {e}")))?;

        let quote = latest_rate(body)?;
        tracing::info!(rate = quote.rate, date = %quote.date, "10-year treasury yield fetched");
        Ok(quote)
    }
}

/// Newest observation with a numeric value, converted from percent.
pub fn latest_rate(body: TreasuryYieldResponse) -> EngineResult<RateQuote> {
    if let Some(msg) = body.error_message.or(body.note).or(body.information) {
        return Err(EngineError::RateFeed(format!("API notice: {msg}")));
    }

    if let Some(unit) = body.unit.as_deref() {
        if unit != "percent" {
            return Err(EngineError::RateFeed(format!("unexpected unit: {unit}")));
        }
    }

    let data = body
        .data
        .ok_or_else(|| EngineError::RateFeed("no data in response".into()))?;

    // Holidays are reported as "." and skipped
    let (date, percent) = data
        .into_iter()
        .find_map(|obs| {
            obs.value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| (obs.date, v))
        })
        .ok_or_else(|| EngineError::RateFeed("no numeric yield observation".into()))?;

    Ok(RateQuote {
        rate: percent / 100.0,
        date,
        fetched_at: chrono::Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> EngineResult<RateQuote> {
        latest_rate(serde_json::from_str(json)?)
    }

    #[test]
    fn test_percent_to_decimal() {
        let quote = parse(
            r#"{"name":"Daily Treasury Yield on 10 Year Maturity","interval":"daily","unit":"percent",
                "data":[{"date":"2024-05-10","value":"4.10"},{"date":"2024-05-09","value":"4.46"}]}"#,
        )
        .unwrap();
        assert!((quote.rate - 0.041).abs() < 1e-12, "rate={}", quote.rate);
        assert_eq!(quote.date, "2024-05-10");
    }

    #[test]
    fn test_skips_missing_day_marker() {
        let quote = parse(
            r#"{"unit":"percent","data":[{"date":"2024-05-27","value":"."},{"date":"2024-05-24","value":"4.47"}]}"#,
        )
        .unwrap();
        assert_eq!(quote.date, "2024-05-24");
        assert!((quote.rate - 0.0447).abs() < 1e-12);
    }

    #[test]
    fn test_negative_yield_passed_through() {
        let quote = parse(r#"{"data":[{"date":"2020-08-04","value":"-0.25"}]}"#).unwrap();
        assert!((quote.rate + 0.0025).abs() < 1e-12);
    }

    #[test]
    fn test_rate_limit_note_surfaced() {
        let err = parse(r#"{"Note":"Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."}"#)
            .unwrap_err();
        match err {
            EngineError::RateFeed(msg) => assert!(msg.contains("rate limit"), "msg={msg}"),
            other => panic!("expected RateFeed, got {other:?}"),
        }
    }

    #[test]
    fn test_error_message_surfaced() {
        let err = parse(r#"{"Error Message":"Invalid API call."}"#).unwrap_err();
        assert!(matches!(err, EngineError::RateFeed(_)));
    }

    #[test]
    fn test_empty_data_rejected() {
        assert!(matches!(parse(r#"{"data":[]}"#), Err(EngineError::RateFeed(_))));
        assert!(matches!(parse(r#"{}"#), Err(EngineError::RateFeed(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        // Unparseable URL fails inside reqwest before any I/O
        let client = TreasuryClient::new("not a url", "demo");
        match client.fetch_ten_year_yield().await {
            Err(EngineError::Network(_)) => {}
            other => panic!("expected Network error, got {other:?}"),
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = TreasuryClient::new("https://www.alphavantage.co/", "demo");
        assert_eq!(client.base_url, "https://www.alphavantage.co");
    }
}
