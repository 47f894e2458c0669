//! Etherscan gas oracle: the source of [`FeeSample`]s.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::error::FetchError;
use crate::sample::FeeSample;

pub const ETHERSCAN_API: &str = "https://api.etherscan.io/api";

#[async_trait::async_trait]
pub trait FeeOracle: Send + Sync {
    async fn fetch(&self) -> Result<FeeSample, FetchError>;
}

pub struct EtherscanOracle {
    api_key: String,
    endpoint: String,
    client: Client,
    timeout: Duration,
}

impl EtherscanOracle {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: ETHERSCAN_API.to_string(),
            client: Client::new(),
            timeout,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait::async_trait]
impl FeeOracle for EtherscanOracle {
    async fn fetch(&self) -> Result<FeeSample, FetchError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("module", "gastracker"),
                ("action", "gasoracle"),
                ("apikey", self.api_key.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        parse_gas_oracle(&body, Utc::now())
    }
}

#[derive(Debug, Deserialize)]
struct OracleEnvelope {
    status: String,
    #[serde(default)]
    message: String,
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OracleResult {
    last_block: String,
    safe_gas_price: String,
    propose_gas_price: String,
    fast_gas_price: String,
    #[serde(rename = "suggestBaseFee")]
    suggest_base_fee: String,
}

/// Parse a `gastracker/gasoracle` response body.
///
/// Etherscan reports failures with `status != "1"` and a string `result`.
pub fn parse_gas_oracle(body: &str, observed_at: DateTime<Utc>) -> Result<FeeSample, FetchError> {
    let env: OracleEnvelope =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    if env.status != "1" {
        let detail = env.result.as_str().unwrap_or_default();
        return Err(FetchError::Upstream {
            message: format!("{} {}", env.message, detail).trim().to_string(),
        });
    }
    let r: OracleResult =
        serde_json::from_value(env.result).map_err(|e| FetchError::Parse(e.to_string()))?;

    Ok(FeeSample {
        base_fee: gwei("suggestBaseFee", &r.suggest_base_fee)?,
        safe_fee: gwei("SafeGasPrice", &r.safe_gas_price)?,
        propose_fee: gwei("ProposeGasPrice", &r.propose_gas_price)?,
        fast_fee: gwei("FastGasPrice", &r.fast_gas_price)?,
        block: r.last_block,
        observed_at,
    })
}

fn gwei(field: &str, raw: &str) -> Result<f64, FetchError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| FetchError::Parse(format!("{field}: {raw:?} is not a number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK: &str = r#"{"status":"1","message":"OK","result":{
        "LastBlock":"22513301","SafeGasPrice":"0.512","ProposeGasPrice":"0.513",
        "FastGasPrice":"0.6","suggestBaseFee":"0.511753164","gasUsedRatio":"0.4,0.5"}}"#;

    #[test]
    fn parses_successful_response() {
        let now = Utc::now();
        let s = parse_gas_oracle(OK, now).unwrap();
        assert_eq!(s.block, "22513301");
        assert!((s.base_fee - 0.511753164).abs() < 1e-12);
        assert_eq!(s.safe_fee, 0.512);
        assert_eq!(s.fast_fee, 0.6);
        assert_eq!(s.observed_at, now);
    }

    #[test]
    fn upstream_error_carries_message() {
        let body = r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#;
        match parse_gas_oracle(body, Utc::now()) {
            Err(FetchError::Upstream { message }) => assert_eq!(message, "NOTOK Invalid API Key"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_or_bad_fields_are_parse_errors() {
        let missing = r#"{"status":"1","message":"OK","result":{"LastBlock":"1"}}"#;
        assert!(matches!(parse_gas_oracle(missing, Utc::now()), Err(FetchError::Parse(_))));
        let bad = OK.replace("\"0.6\"", "\"fast\"");
        assert!(matches!(parse_gas_oracle(&bad, Utc::now()), Err(FetchError::Parse(_))));
        assert!(matches!(parse_gas_oracle("<html>", Utc::now()), Err(FetchError::Parse(_))));
    }
}
