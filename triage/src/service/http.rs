//! reqwest-backed service clients.
//!
//! Both clients share one shape: POST a JSON body, then map the outcome.
//! 2xx bodies must parse into the success type; any other status becomes
//! `Rejected` with the service's `error` field; no response at all (refused,
//! DNS, timeout) becomes `Unreachable`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{
    AdviceReply, AdviceRequest, AdviceService, ClassificationRequest, ClassificationResponse,
    ClassificationService, ErrorBody, ServiceFailure,
};
use crate::config::ServiceConfig;

pub const ADVICE_PATH: &str = "/chatbot";
pub const CLASSIFY_PATH: &str = "/classify-complaint";

fn build_client(config: &ServiceConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(config.timeout()).build()
}

/// Map a raw HTTP outcome to the port contract.
pub(crate) fn decode_response<T: DeserializeOwned>(
    status: u16,
    body: &str,
) -> Result<T, ServiceFailure> {
    if (200..300).contains(&status) {
        return serde_json::from_str(body).map_err(|e| ServiceFailure::Malformed(e.to_string()));
    }
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty());
    Err(ServiceFailure::Rejected { status, message })
}

async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    body: &B,
) -> Result<T, ServiceFailure> {
    let start = std::time::Instant::now();
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| ServiceFailure::Unreachable(e.to_string()))?;

    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| ServiceFailure::Unreachable(e.to_string()))?;

    tracing::debug!(
        url,
        status,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Service responded"
    );
    decode_response(status, &text)
}

/// Client for the troubleshooting assistant endpoint.
#[derive(Debug, Clone)]
pub struct HttpAdviceClient {
    url: String,
    client: reqwest::Client,
}

impl HttpAdviceClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            url: config.endpoint(ADVICE_PATH),
            client: build_client(config)?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AdviceService for HttpAdviceClient {
    async fn advise(&self, request: &AdviceRequest) -> Result<AdviceReply, ServiceFailure> {
        post_json(&self.client, &self.url, request).await
    }
}

/// Client for the complaint classification endpoint.
#[derive(Debug, Clone)]
pub struct HttpClassificationClient {
    url: String,
    client: reqwest::Client,
}

impl HttpClassificationClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            url: config.endpoint(CLASSIFY_PATH),
            client: build_client(config)?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ClassificationService for HttpClassificationClient {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResponse, ServiceFailure> {
        post_json(&self.client, &self.url, request).await
    }
}
