use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use url::Url;

use crate::domain::errors::FetchError;
use crate::domain::model::quote::PriceQuote;
use crate::domain::traits::PriceSource;

use super::parsers::CryptoCompareParser;

/// Spot price source backed by CryptoCompare's `pricemulti` endpoint
pub struct CryptoCompareClient {
    client: Client,
    url: Url,
}

impl CryptoCompareClient {
    pub fn new(
        base_url: &str,
        assets: &[String],
        currencies: &[String],
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let url = CryptoCompareParser::build_url(base_url, assets, currencies)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl PriceSource for CryptoCompareClient {
    async fn fetch(&self) -> Result<PriceQuote, FetchError> {
        debug!("Requesting prices from {}", self.url);

        let response = self
            .client
            .get(self.url.clone())
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!("Received data: {}", body);
        CryptoCompareParser::parse_quote(&body)
    }
}
