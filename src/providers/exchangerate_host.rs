use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};

use super::util::with_retry;
use crate::core::config::ProviderConfig;
use crate::core::error::FetchError;
use crate::core::pair::{CurrencyCode, CurrencyPair};
use crate::core::rates::{LatestRates, RateFetcher};
use crate::core::series::RatePoint;

const RETRY_DELAY_MS: u64 = 500;

/// Client for exchangerate.host style APIs: `GET /{date}?base=..&symbols=..`
/// for a historical day and `GET /latest?base=..` for current rates.
pub struct ExchangeRateHostProvider {
    base_url: String,
    access_key: Option<String>,
    retries: usize,
    client: reqwest::Client,
}

/// Payload shared by the historical and latest endpoints. Every field is
/// optional so that absence is reported as missing data, not a parse error.
#[derive(Debug, Deserialize)]
struct RatesResponse {
    success: Option<bool>,
    date: Option<NaiveDate>,
    rates: Option<BTreeMap<String, f64>>,
    error: Option<serde_json::Value>,
}

impl ExchangeRateHostProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent("fxtrend/0.1")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_key: config.access_key.clone(),
            retries: config.retries,
            client,
        })
    }

    /// Request URL without credentials, safe to log.
    fn url(&self, endpoint: &str, query: &str) -> String {
        format!("{}/{endpoint}?{query}", self.base_url)
    }

    fn authorized(&self, url: &str) -> String {
        match &self.access_key {
            Some(key) => format!("{url}&access_key={key}"),
            None => url.to_string(),
        }
    }

    async fn get_rates(&self, url: &str, what: &str) -> Result<RatesResponse, FetchError> {
        debug!("Requesting rates from {}", url);
        let request_url = self.authorized(url);
        let response = with_retry(
            || self.client.get(&request_url).send(),
            self.retries,
            RETRY_DELAY_MS,
        )
            .await
            .map_err(|source| FetchError::Transport {
                what: what.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status(),
                what: what.to_string(),
            });
        }

        let text = response.text().await.map_err(|source| FetchError::Transport {
            what: what.to_string(),
            source,
        })?;

        let data: RatesResponse =
            serde_json::from_str(&text).map_err(|e| FetchError::Malformed {
                what: what.to_string(),
                reason: e.to_string(),
            })?;

        if data.success == Some(false) {
            let reason = data
                .error
                .as_ref()
                .map_or_else(|| "unspecified error".to_string(), |e| e.to_string());
            return Err(FetchError::Rejected {
                what: what.to_string(),
                reason,
            });
        }
        Ok(data)
    }
}

fn validate_rate(rate: f64, what: &str) -> Result<f64, FetchError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(FetchError::Malformed {
            what: what.to_string(),
            reason: format!("rate {rate} is not a positive number"),
        })
    }
}

#[async_trait]
impl RateFetcher for ExchangeRateHostProvider {
    #[instrument(name = "RateFetch", skip(self), fields(pair = %pair, date = %date))]
    async fn fetch(&self, pair: &CurrencyPair, date: NaiveDate) -> Result<RatePoint, FetchError> {
        let what = format!("{pair} on {date}");
        let url = self.url(
            &date.format("%Y-%m-%d").to_string(),
            &format!("base={}&symbols={}", pair.base(), pair.quote()),
        );

        let data = self.get_rates(&url, &what).await?;
        let rate = data
            .rates
            .as_ref()
            .and_then(|rates| rates.get(pair.quote().as_str()))
            .copied()
            .ok_or_else(|| FetchError::MissingData {
                pair: pair.clone(),
                date,
            })?;

        Ok(RatePoint::new(date, validate_rate(rate, &what)?))
    }

    #[instrument(name = "LatestRates", skip(self), fields(base = %base))]
    async fn latest(&self, base: &CurrencyCode) -> Result<LatestRates, FetchError> {
        let what = format!("latest {base} rates");
        let url = self.url("latest", &format!("base={base}"));

        let data = self.get_rates(&url, &what).await?;
        let rates = data.rates.ok_or_else(|| FetchError::Malformed {
            what: what.clone(),
            reason: "response has no rates".to_string(),
        })?;
        for (quote, rate) in &rates {
            validate_rate(*rate, &format!("{what} ({quote})"))?;
        }

        Ok(LatestRates {
            base: base.clone(),
            date: data.date,
            rates,
        })
    }
}
