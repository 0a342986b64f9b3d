//! Kafka REST proxy client.
//!
//! Requires the `http` feature. Produces through the v2 binary embedded
//! format:
//!
//! - `POST {base_url}/topics/{topic}`
//! - `Content-Type: application/vnd.kafka.binary.v2+json`
//! - body `{"records":[{"key":"<base64>","value":"<base64>"}]}`
//! - reply `{"offsets":[{"partition":0,"offset":12,"error_code":null,"error":null}]}`

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{BrokerClient, SendReceipt};
use crate::error::BrokerError;

pub const BINARY_V2: &str = "application/vnd.kafka.binary.v2+json";
pub const RESPONSE_V2: &str = "application/vnd.kafka.v2+json";

#[derive(Debug, Serialize)]
struct ProduceRequest {
    records: Vec<ProduceRecord>,
}

#[derive(Debug, Serialize)]
struct ProduceRecord {
    key: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ProduceResponse {
    #[serde(default)]
    offsets: Vec<ProduceOffset>,
}

#[derive(Debug, Deserialize)]
struct ProduceOffset {
    partition: Option<i32>,
    offset: Option<i64>,
    error_code: Option<i64>,
    error: Option<String>,
}

/// Broker client speaking the Kafka REST proxy v2 API.
#[derive(Debug, Clone)]
pub struct RestProxyBroker {
    client: reqwest::Client,
    base_url: String,
}

impl RestProxyBroker {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Use a preconfigured client (timeouts, TLS, auth headers).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn topic_url(&self, topic: &str) -> String {
        format!("{}/topics/{}", self.base_url, topic)
    }
}

#[async_trait]
impl BrokerClient for RestProxyBroker {
    async fn send(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<SendReceipt, BrokerError> {
        let body = ProduceRequest {
            records: vec![ProduceRecord {
                key: STANDARD.encode(key.as_bytes()),
                value: STANDARD.encode(&payload),
            }],
        };

        let response = self
            .client
            .post(self.topic_url(topic))
            .header(CONTENT_TYPE, BINARY_V2)
            .header(ACCEPT, RESPONSE_V2)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    BrokerError::Unauthorized(format!("HTTP {}: {}", status.as_u16(), text))
                }
                StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => BrokerError::TimedOut,
                StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                    BrokerError::Unavailable(format!("HTTP {}: {}", status.as_u16(), text))
                }
                _ => BrokerError::Rejected(format!("HTTP {}: {}", status.as_u16(), text)),
            });
        }

        let reply: ProduceResponse = response.json().await.map_err(transport_error)?;
        let first = reply
            .offsets
            .into_iter()
            .next()
            .ok_or_else(|| BrokerError::Rejected("proxy returned no offsets".to_string()))?;

        if first.error.is_some() || first.error_code.is_some() {
            return Err(BrokerError::Rejected(format!(
                "error_code {}: {}",
                first.error_code.unwrap_or_default(),
                first.error.unwrap_or_default()
            )));
        }
        match (first.partition, first.offset) {
            (Some(partition), Some(offset)) => Ok(SendReceipt { partition, offset }),
            _ => Err(BrokerError::Rejected(
                "proxy reply is missing partition or offset".to_string(),
            )),
        }
    }
}

fn transport_error(err: reqwest::Error) -> BrokerError {
    if err.is_timeout() {
        BrokerError::TimedOut
    } else if err.is_connect() {
        BrokerError::Unavailable(err.to_string())
    } else {
        BrokerError::Other(Box::new(err))
    }
}
